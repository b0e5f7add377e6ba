use super::*;

#[test]
fn frame_rejects_mismatched_buffer() {
    assert!(Frame::new(2, 2, vec![0u8; 11]).is_err());
    assert!(Frame::new(0, 2, Vec::new()).is_err());
    assert!(Frame::new(2, 2, vec![0u8; 12]).is_ok());
}

#[test]
fn frame_from_fn_is_row_major() {
    let f = Frame::from_fn(3, 2, |x, y| [x as u8, y as u8, 7]).unwrap();
    assert_eq!(f.pixel(2, 0), Some([2, 0, 7]));
    assert_eq!(f.pixel(1, 1), Some([1, 1, 7]));
    assert_eq!(f.pixel(3, 0), None);
    assert_eq!(&f.data()[9..12], &[0, 1, 7]);
}

#[test]
fn uniform_detection() {
    assert!(Frame::filled(4, 4, [9, 9, 9]).unwrap().is_uniform());
    let f = Frame::from_fn(4, 4, |x, _| [x as u8, 0, 0]).unwrap();
    assert!(!f.is_uniform());
}

#[test]
fn rational_parses_ffprobe_notation() {
    assert_eq!(Rational::parse("30000/1001"), Some(Rational { num: 30000, den: 1001 }));
    assert_eq!(Rational::parse("25"), Some(Rational { num: 25, den: 1 }));
    assert_eq!(Rational::parse("0/0"), None);
    assert_eq!(Rational::parse("abc"), None);
    assert_eq!(Rational::new(30, 1).unwrap().to_string(), "30/1");
    assert!(Rational::new(1, 0).is_err());
}

#[test]
fn png_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f.png");
    Frame::filled(4, 2, [10, 20, 30]).unwrap().save_png(&path).unwrap();
    assert!(path.is_file());
}
