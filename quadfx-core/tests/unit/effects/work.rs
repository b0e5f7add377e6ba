use super::*;

fn gradient(w: u32, h: u32) -> Frame {
    Frame::from_fn(w, h, |x, y| [(x * 40) as u8, (y * 40) as u8, 128]).unwrap()
}

#[test]
fn round_trip_preserves_frame() {
    let frame = gradient(5, 4);
    assert_eq!(WorkFrame::from_frame(&frame).into_frame(), frame);
}

#[test]
fn map_samples_clamps_both_ends() {
    let frame = Frame::filled(2, 2, [10, 128, 250]).unwrap();
    let up = WorkFrame::from_frame(&frame).map_samples(|v| v * 3.0).into_frame();
    assert_eq!(up.pixel(0, 0), Some([30, 255, 255]));
    let down = WorkFrame::from_frame(&frame).map_samples(|v| v - 100.0).into_frame();
    assert_eq!(down.pixel(1, 1), Some([0, 28, 150]));
}

#[test]
fn into_frame_truncates_toward_zero() {
    let frame = Frame::filled(1, 1, [10, 10, 10]).unwrap();
    let out = WorkFrame::from_frame(&frame)
        .map_samples(|v| v + 0.99)
        .into_frame();
    assert_eq!(out.pixel(0, 0), Some([10, 10, 10]));
}

#[test]
fn map_channel_sees_coordinates() {
    let frame = Frame::filled(3, 2, [0, 0, 0]).unwrap();
    let out = WorkFrame::from_frame(&frame)
        .map_channel(GREEN, |_, x, y| (x * 10 + y) as f32)
        .into_frame();
    assert_eq!(out.pixel(2, 1), Some([0, 21, 0]));
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0]));
}

#[test]
fn map_pixels_rewrites_whole_pixel() {
    let frame = Frame::filled(2, 2, [1, 2, 3]).unwrap();
    let out = WorkFrame::from_frame(&frame)
        .map_pixels(|[r, g, b], _, _| [b, g, r])
        .into_frame();
    assert_eq!(out.pixel(1, 0), Some([3, 2, 1]));
}

#[test]
fn luma_mean_averages_channels() {
    let frame = Frame::filled(1, 2, [30, 60, 90]).unwrap();
    assert_eq!(WorkFrame::from_frame(&frame).luma_mean(), vec![60.0, 60.0]);
}

#[test]
fn source_frame_is_untouched() {
    let frame = gradient(4, 4);
    let before = frame.clone();
    let _ = WorkFrame::from_frame(&frame).map_samples(|v| 255.0 - v).into_frame();
    assert_eq!(frame, before);
}
