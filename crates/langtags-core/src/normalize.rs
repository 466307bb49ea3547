//! Separator normalization applied before validation on request.

/// Replace `_` and `/` with `-`.
///
/// Only separators are rewritten; case and subtag content are left alone.
pub fn normalize(tag: &str) -> String {
    tag.replace(['_', '/'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_underscore_and_slash() {
        assert_eq!(normalize("pt-BR_abl1943"), "pt-BR-abl1943");
        assert_eq!(normalize("en/Latn_US"), "en-Latn-US");
    }

    #[test]
    fn test_leaves_other_characters_alone() {
        assert_eq!(normalize("EN-us"), "EN-us");
        assert_eq!(normalize("en us"), "en us");
        assert_eq!(normalize(""), "");
    }
}
