//! # langtags-core
//!
//! BCP 47 language tag parsing and validation against the IANA Language
//! Subtag Registry.
//!
//! A tag string is split on `-`, each subtag is classified by shape into
//! its grammar slot, and every language, extlang, script, region and
//! variant subtag is resolved against a [`RegistryIndex`]. A successful
//! validation yields a [`Tag`] whose components carry the registry metadata
//! and render in the registry's canonical case.
//!
//! No canonicalization is performed beyond case: deprecated subtags and
//! redundant scripts are reported as [`advisories`], never rewritten.

pub mod advisories;
pub mod config;
pub mod diagnostics;
pub mod file_utils;
pub mod grammar;
pub mod normalize;
pub mod parsers;
pub mod registry;
pub mod tag;
pub mod validation;

pub use advisories::check_tag;
pub use config::{AdvisoryConfig, LangtagsConfig};
pub use diagnostics::{
    ComponentIndexError, ConfigError, Diagnostic, DiagnosticLevel, InvalidReason,
    InvalidSubtagError, MalformedReason, MalformedTagError, RegistryLoadError,
    RegistryParseError, TagError, TagResult,
};
pub use grammar::{ClassifiedSubtag, Slot, classify, is_well_formed, split_subtags};
pub use normalize::normalize;
pub use parsers::registry_file::{ParsedRegistry, parse_registry};
pub use registry::{RecordType, RegistryDate, RegistryIndex, SubtagRecord};
pub use tag::{Component, Tag};
pub use validation::TagValidator;

/// Validate `tag` against `registry`.
///
/// Shorthand for `TagValidator::new(registry).validate(tag)`.
pub fn validate(registry: &RegistryIndex, tag: &str) -> TagResult<Tag> {
    TagValidator::new(registry).validate(tag)
}

/// Validate `tag` and run the advisories enabled in `config` over it.
pub fn validate_with_advisories(
    registry: &RegistryIndex,
    tag: &str,
    config: &LangtagsConfig,
) -> TagResult<(Tag, Vec<Diagnostic>)> {
    let validator = TagValidator::new(registry);
    let tag = if config.normalize {
        validator.validate_normalized(tag)?
    } else {
        validator.validate(tag)?
    };
    let diagnostics = check_tag(&tag, &config.advisories);
    Ok((tag, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegistryIndex {
        RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Language, "en").with_suppress_script("Latn"),
            SubtagRecord::new(RecordType::Script, "Latn"),
            SubtagRecord::new(RecordType::Region, "US"),
        ])
    }

    #[test]
    fn test_validate_shorthand() {
        let registry = registry();
        assert_eq!(validate(&registry, "EN-us").unwrap().to_string(), "en-US");
        assert!(validate(&registry, "en_US").unwrap_err().is_malformed());
    }

    #[test]
    fn test_validate_with_advisories_honors_normalize() {
        let registry = registry();
        let mut config = LangtagsConfig::default();

        assert!(validate_with_advisories(&registry, "en_Latn", &config).is_err());

        config.normalize = true;
        let (tag, diagnostics) = validate_with_advisories(&registry, "en_Latn", &config).unwrap();
        assert_eq!(tag.to_string(), "en-Latn");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, advisories::SUPPRESSED_SCRIPT);
    }
}
