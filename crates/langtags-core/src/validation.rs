//! Tag validation against the registry.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::diagnostics::{InvalidReason, InvalidSubtagError, TagResult};
use crate::grammar::{ClassifiedSubtag, Slot, classify, split_subtags};
use crate::normalize::normalize;
use crate::registry::{RecordType, RegistryIndex, SubtagRecord};
use crate::tag::{Component, Tag};

/// Validates tag strings against a [`RegistryIndex`].
///
/// Holds only a shared reference to the index, so a validator is cheap to
/// copy and can be used from many threads at once.
///
/// # Example
///
/// ```
/// use langtags_core::{RecordType, RegistryIndex, SubtagRecord, TagValidator};
///
/// let registry = RegistryIndex::build(vec![
///     SubtagRecord::new(RecordType::Language, "cy").with_description("Welsh"),
///     SubtagRecord::new(RecordType::Region, "GB").with_description("United Kingdom"),
/// ]);
/// let validator = TagValidator::new(&registry);
///
/// let tag = validator.validate("cy-gb").unwrap();
/// assert_eq!(tag.to_string(), "cy-GB");
/// assert!(validator.validate("cy_GB").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TagValidator<'r> {
    registry: &'r RegistryIndex,
}

impl<'r> TagValidator<'r> {
    pub fn new(registry: &'r RegistryIndex) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r RegistryIndex {
        self.registry
    }

    /// Parse and validate `tag`.
    ///
    /// Whole-tag grandfathered registrations are recognized before the tag is
    /// split. Otherwise every subtag is classified by shape, then each
    /// registry-backed subtag must resolve to a record of its slot's type.
    pub fn validate(&self, tag: &str) -> TagResult<Tag> {
        let result = self.validate_inner(tag);
        if let Err(err) = &result {
            tracing::trace!(tag, kind = err.kind(), error = %err, "language tag rejected");
        }
        result
    }

    fn validate_inner(&self, tag: &str) -> TagResult<Tag> {
        if let Some(record) = self.registry.primary(RecordType::Grandfathered, tag) {
            return Ok(Tag::from_components(vec![Component::registered(
                Slot::Language,
                Arc::clone(record),
            )]));
        }

        let tokens = split_subtags(tag);
        let classified = classify(&tokens)?;

        let mut components: Vec<Component> = Vec::with_capacity(classified.len());
        for subtag in classified {
            let component = match subtag.slot.record_type() {
                Some(record_type) => {
                    let record = self.resolve(tag, &subtag, record_type, &components)?;
                    Component::registered(subtag.slot, record)
                }
                None => Component::raw(subtag.slot, subtag.text),
            };
            components.push(component);
        }

        Ok(Tag::from_components(components))
    }

    fn resolve(
        &self,
        tag: &str,
        subtag: &ClassifiedSubtag<'_>,
        record_type: RecordType,
        resolved: &[Component],
    ) -> Result<Arc<SubtagRecord>, InvalidSubtagError> {
        let invalid = |reason| InvalidSubtagError {
            tag: tag.to_string(),
            token: subtag.text.to_string(),
            position: subtag.position,
            reason,
        };

        let records = self.registry.lookup(record_type, &subtag.text);
        let Some(first) = records.first() else {
            return Err(invalid(InvalidReason::NotRegistered {
                expected: record_type,
            }));
        };

        if subtag.slot != Slot::Extlang {
            return Ok(Arc::clone(first));
        }

        // The classifier guarantees the language is the preceding component.
        let language = resolved
            .first()
            .map(Component::subtag_text)
            .unwrap_or_default();
        records
            .iter()
            .find(|r| {
                r.prefixes.is_empty() || r.prefixes.iter().any(|p| p.eq_ignore_ascii_case(language))
            })
            .cloned()
            .ok_or_else(|| {
                invalid(InvalidReason::PrefixMismatch {
                    expected: record_type,
                    prefixes: first.prefixes.clone(),
                    found: language.to_string(),
                })
            })
    }

    /// Rewrite `_` and `/` separators to `-`, then validate.
    pub fn validate_normalized(&self, tag: &str) -> TagResult<Tag> {
        self.validate(&normalize(tag))
    }

    pub fn is_valid(&self, tag: &str) -> bool {
        self.validate(tag).is_ok()
    }

    /// Validate every tag, returning results in input order.
    #[cfg(feature = "parallel")]
    pub fn validate_all<S: AsRef<str> + Sync>(&self, tags: &[S]) -> Vec<TagResult<Tag>> {
        tags.par_iter().map(|t| self.validate(t.as_ref())).collect()
    }

    /// Validate every tag, returning results in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn validate_all<S: AsRef<str>>(&self, tags: &[S]) -> Vec<TagResult<Tag>> {
        tags.iter().map(|t| self.validate(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MalformedReason, TagError};

    fn registry() -> RegistryIndex {
        RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Language, "en").with_description("English"),
            SubtagRecord::new(RecordType::Language, "cy").with_description("Welsh"),
            SubtagRecord::new(RecordType::Language, "zh").with_description("Chinese"),
            SubtagRecord::new(RecordType::Language, "de").with_description("German"),
            SubtagRecord::new(RecordType::Extlang, "yue")
                .with_description("Yue Chinese")
                .with_prefix("zh"),
            SubtagRecord::new(RecordType::Script, "Latn").with_description("Latin"),
            SubtagRecord::new(RecordType::Region, "US").with_description("United States"),
            SubtagRecord::new(RecordType::Region, "GB").with_description("United Kingdom"),
            SubtagRecord::new(RecordType::Variant, "1996").with_prefix("de"),
            SubtagRecord::new(RecordType::Grandfathered, "i-klingon")
                .with_description("Klingon")
                .with_preferred_value("tlh"),
        ])
    }

    #[test]
    fn test_validate_language_script_region() {
        let registry = registry();
        let tag = TagValidator::new(&registry).validate("en-Latn-US").unwrap();
        assert_eq!(tag.component_count(), 3);
        assert_eq!(tag.language().unwrap().subtag_text(), "en");
        assert_eq!(tag.script().unwrap().subtag_text(), "Latn");
        assert_eq!(tag.region().unwrap().subtag_text(), "US");
        assert_eq!(tag.to_string(), "en-Latn-US");
    }

    #[test]
    fn test_case_is_canonicalized_from_registry() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        assert_eq!(validator.validate("cy-gb").unwrap().to_string(), "cy-GB");
        assert_eq!(
            validator.validate("EN-latn-us").unwrap().to_string(),
            "en-Latn-US"
        );
    }

    #[test]
    fn test_unregistered_language() {
        let registry = registry();
        let err = TagValidator::new(&registry).validate("zz-Latn").unwrap_err();
        match err {
            TagError::InvalidSubtag(e) => {
                assert_eq!(e.token, "zz");
                assert_eq!(e.position, 0);
                assert_eq!(e.expected(), RecordType::Language);
                assert_eq!(e.tag, "zz-Latn");
            }
            other => panic!("expected invalid subtag, got {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_region_reports_position() {
        let registry = registry();
        let err = TagValidator::new(&registry).validate("en-Latn-ZZ").unwrap_err();
        assert!(err.is_invalid_subtag());
        assert_eq!(err.token(), Some("ZZ"));
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_grammar_failures_are_malformed() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        for tag in ["cy-GB-Latn", "gd_GB", "", "en--US", "en-1996-1996"] {
            let err = validator.validate(tag).unwrap_err();
            assert!(err.is_malformed(), "{tag} should be malformed, got {err:?}");
            assert_eq!(err.tag(), tag);
        }
    }

    #[test]
    fn test_extlang_prefix_must_match_language() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        let tag = validator.validate("zh-yue").unwrap();
        assert_eq!(tag.extlang().unwrap().subtag_text(), "yue");

        let err = validator.validate("en-yue").unwrap_err();
        match err {
            TagError::InvalidSubtag(e) => {
                assert_eq!(
                    e.reason,
                    InvalidReason::PrefixMismatch {
                        expected: RecordType::Extlang,
                        prefixes: vec!["zh".into()],
                        found: "en".into(),
                    }
                );
                assert_eq!(e.position, 1);
            }
            other => panic!("expected prefix mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_extensions_and_private_use_skip_registry() {
        let registry = registry();
        let tag = TagValidator::new(&registry)
            .validate("en-US-u-CO-phonebk-x-Whatever")
            .unwrap();
        assert_eq!(tag.to_string(), "en-US-u-co-phonebk-x-whatever");
        assert_eq!(tag.extensions().len(), 1);
        assert_eq!(tag.private_use().unwrap().subtag_text(), "x-whatever");
    }

    #[test]
    fn test_grandfathered_whole_tag() {
        let registry = registry();
        let tag = TagValidator::new(&registry).validate("I-Klingon").unwrap();
        assert_eq!(tag.component_count(), 1);
        assert_eq!(tag.to_string(), "i-klingon");
        assert_eq!(tag.at(0).unwrap().preferred_value(), Some("tlh"));
        assert!(tag.is_grandfathered());
    }

    #[test]
    fn test_private_use_only_tag() {
        let registry = registry();
        let tag = TagValidator::new(&registry)
            .validate("x-private-stuff")
            .unwrap();
        assert!(tag.is_private_use_only());
        assert_eq!(tag.private_use().unwrap().subtag_text(), "x-private-stuff");
    }

    #[test]
    fn test_validate_normalized_rewrites_separators() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        assert!(validator.validate("cy_GB").is_err());
        assert_eq!(
            validator.validate_normalized("cy_gb").unwrap().to_string(),
            "cy-GB"
        );
        assert_eq!(
            validator.validate_normalized("en/Latn/US").unwrap().to_string(),
            "en-Latn-US"
        );
    }

    #[test]
    fn test_validate_all_preserves_order() {
        let registry = registry();
        let results = TagValidator::new(&registry).validate_all(&["en", "zz", "cy-gb", "en-US-Latn"]);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().to_string(), "en");
        assert!(results[1].as_ref().unwrap_err().is_invalid_subtag());
        assert_eq!(results[2].as_ref().unwrap().to_string(), "cy-GB");
        assert!(matches!(
            results[3].as_ref().unwrap_err(),
            TagError::Malformed(e) if matches!(e.reason, MalformedReason::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_is_valid() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        assert!(validator.is_valid("de-1996"));
        assert!(!validator.is_valid("de-1901"));
    }
}
