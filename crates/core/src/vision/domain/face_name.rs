use std::sync::OnceLock;

use regex::Regex;

use crate::shared::constants::FACE_NAME_PATTERN;
use crate::vision::domain::vision_error::VisionError;

fn face_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FACE_NAME_PATTERN).expect("face name pattern is valid"))
}

/// Checks that `name` is usable as an external image id in a face collection.
pub fn validate_face_name(name: &str) -> Result<String, VisionError> {
    if face_name_regex().is_match(name) {
        Ok(name.to_string())
    } else {
        Err(VisionError::InvalidArgument(format!(
            "face name '{name}' must match {FACE_NAME_PATTERN}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("lee")]
    #[case("Lee_Newfeld")]
    #[case("a.b-c:d_9")]
    fn test_valid_names(#[case] name: &str) {
        assert_eq!(validate_face_name(name).unwrap(), name);
    }

    #[rstest]
    #[case::empty("")]
    #[case::space("lee newfeld")]
    #[case::slash("a/b")]
    #[case::unicode("zoë")]
    #[case::trailing_newline("lee\n")]
    fn test_invalid_names(#[case] name: &str) {
        assert!(matches!(
            validate_face_name(name),
            Err(VisionError::InvalidArgument(_))
        ));
    }
}
