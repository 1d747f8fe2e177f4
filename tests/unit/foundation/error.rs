use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GlimmerError::parameter("x")
            .to_string()
            .contains("parameter error:")
    );
    assert!(GlimmerError::state("x").to_string().contains("state error:"));
    assert!(
        GlimmerError::surface("x")
            .to_string()
            .contains("surface error:")
    );
    assert!(
        GlimmerError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GlimmerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
