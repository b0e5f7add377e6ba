use super::*;

fn work(w: u32, h: u32, f: impl FnMut(u32, u32) -> [u8; 3]) -> WorkFrame {
    WorkFrame::from_frame(&crate::foundation::core::Frame::from_fn(w, h, f).unwrap())
}

#[test]
fn blur_constant_image_is_identity() {
    let src = work(6, 5, |_, _| [10, 20, 30]);
    let out = gaussian_blur(src.clone(), 1.2);
    for (a, b) in out.samples().iter().zip(src.samples()) {
        assert!((a - b).abs() < 1e-3);
    }
}

#[test]
fn blur_non_positive_sigma_is_identity() {
    let src = work(3, 3, |x, y| [(x * 50) as u8, (y * 50) as u8, 0]);
    assert_eq!(gaussian_blur(src.clone(), 0.0), src);
    assert_eq!(gaussian_blur(src.clone(), f32::NAN), src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let src = work(7, 7, |x, y| if (x, y) == (3, 3) { [255, 255, 255] } else { [0, 0, 0] });
    let out = gaussian_blur(src, 1.0);

    let lit = out.samples().iter().step_by(3).filter(|&&v| v > 0.0).count();
    assert!(lit > 1);
    let total: f32 = out.samples().iter().step_by(3).sum();
    assert!((total - 255.0).abs() < 1.0);
    assert!(out.pixel(3, 3)[0] < 255.0);
}

#[test]
fn median_takes_upper_middle_of_window() {
    // Pixel (1, 1) sees (0,0)=10, (1,0)=20, (0,1)=30, (1,1)=40 in the red channel.
    let values = [[10u8, 20], [30, 40]];
    let src = work(2, 2, |x, y| [values[y as usize][x as usize], 0, 0]);
    let out = median_2x2(src);
    assert_eq!(out.pixel(1, 1)[0], 30.0);
    // Corner pixel sees itself four times.
    assert_eq!(out.pixel(0, 0)[0], 10.0);
}

#[test]
fn box_filter_averages_window() {
    let values = [[10u8, 20], [30, 40]];
    let src = work(2, 2, |x, y| [values[y as usize][x as usize], 0, 0]);
    let out = box_2x2(src);
    assert_eq!(out.pixel(1, 1)[0], 25.0);
    assert_eq!(out.pixel(1, 0)[0], 15.0);
}

#[test]
fn sobel_x_is_signed_and_ignores_horizontal_edges() {
    let flat = vec![7.0f32; 16];
    assert!(sobel_x(&flat, 4, 4).iter().all(|&v| v == 0.0));

    let rising: Vec<f32> = (0..16).map(|i| if i % 4 < 2 { 0.0 } else { 100.0 }).collect();
    let gx = sobel_x(&rising, 4, 4);
    assert_eq!(&gx[0..4], &[0.0, 400.0, 400.0, 0.0]);

    let falling: Vec<f32> = rising.iter().map(|v| 100.0 - v).collect();
    assert!(sobel_x(&falling, 4, 4)[1] < 0.0);

    let horizontal: Vec<f32> = (0..16).map(|i| if i < 8 { 0.0 } else { 100.0 }).collect();
    assert!(sobel_x(&horizontal, 4, 4).iter().all(|&v| v == 0.0));
}
