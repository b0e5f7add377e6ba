use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        QuadfxError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(QuadfxError::demux("x").to_string().contains("demux error:"));
    assert!(
        QuadfxError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(QuadfxError::remux("x").to_string().contains("remux error:"));
    assert!(
        QuadfxError::cancelled("x")
            .to_string()
            .contains("cancelled:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = QuadfxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_errors_convert_with_question_mark() {
    fn open_missing() -> QuadfxResult<()> {
        std::fs::File::open("/definitely/not/here/quadfx")?;
        Ok(())
    }
    assert!(matches!(open_missing(), Err(QuadfxError::Io(_))));
}
