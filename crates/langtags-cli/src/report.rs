//! Per-tag results collected for output.

use serde::Serialize;

use langtags_core::{
    ClassifiedSubtag, Component, Diagnostic, LangtagsConfig, MalformedTagError, RecordType, Tag,
    TagError, TagResult, TagValidator, check_tag, classify, split_subtags,
};

#[derive(Debug, Serialize)]
pub struct TagReport {
    pub input: String,
    pub valid: bool,
    pub tag: Option<String>,
    pub components: Vec<ComponentReport>,
    pub error: Option<ErrorReport>,
    pub advisories: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct ComponentReport {
    pub slot: String,
    pub subtag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    pub token: Option<String>,
    pub position: Option<usize>,
}

impl From<&Component> for ComponentReport {
    fn from(component: &Component) -> Self {
        Self {
            slot: component.slot().to_string(),
            subtag: component.subtag_text().to_string(),
            record_type: component.record_type(),
            description: component.description().map(str::to_string),
            added: component.added().map(|d| d.to_string()),
            deprecated: component.deprecated().map(|d| d.to_string()),
            preferred_value: component.preferred_value().map(str::to_string),
        }
    }
}

impl From<&ClassifiedSubtag<'_>> for ComponentReport {
    fn from(subtag: &ClassifiedSubtag<'_>) -> Self {
        Self {
            slot: subtag.slot.to_string(),
            subtag: subtag.text.to_string(),
            record_type: None,
            description: None,
            added: None,
            deprecated: None,
            preferred_value: None,
        }
    }
}

impl From<&TagError> for ErrorReport {
    fn from(err: &TagError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            token: err.token().map(str::to_string),
            position: err.position(),
        }
    }
}

impl From<&MalformedTagError> for ErrorReport {
    fn from(err: &MalformedTagError) -> Self {
        Self {
            kind: "malformed",
            message: err.to_string(),
            token: err.token().map(str::to_string),
            position: err.position(),
        }
    }
}

impl TagReport {
    fn invalid(input: &str, error: ErrorReport) -> Self {
        Self {
            input: input.to_string(),
            valid: false,
            tag: None,
            components: Vec::new(),
            error: Some(error),
            advisories: Vec::new(),
        }
    }
}

/// Validate each input against the registry through `TagValidator::validate_all`
/// and run the configured advisories. Reports come back in input order.
pub fn check_registered(
    validator: &TagValidator<'_>,
    inputs: &[String],
    config: &LangtagsConfig,
) -> Vec<TagReport> {
    let results = if config.normalize {
        let normalized: Vec<String> = inputs.iter().map(|t| langtags_core::normalize(t)).collect();
        validator.validate_all(&normalized)
    } else {
        validator.validate_all(inputs)
    };

    inputs
        .iter()
        .zip(results)
        .map(|(input, result)| registered_report(input, result, config))
        .collect()
}

fn registered_report(input: &str, result: TagResult<Tag>, config: &LangtagsConfig) -> TagReport {
    match result {
        Ok(tag) => TagReport {
            input: input.to_string(),
            valid: true,
            tag: Some(tag.to_string()),
            components: tag.components().iter().map(ComponentReport::from).collect(),
            error: None,
            advisories: check_tag(&tag, &config.advisories),
        },
        Err(err) => TagReport::invalid(input, ErrorReport::from(&err)),
    }
}

/// Lexical check only; no registry lookups.
pub fn check_well_formed(input: &str, normalize: bool) -> TagReport {
    let text = if normalize {
        langtags_core::normalize(input)
    } else {
        input.to_string()
    };

    if langtags_core::grammar::is_grandfathered(&text) {
        return TagReport {
            input: input.to_string(),
            valid: true,
            tag: Some(text.clone()),
            components: vec![ComponentReport {
                slot: RecordType::Grandfathered.to_string(),
                subtag: text,
                record_type: None,
                description: None,
                added: None,
                deprecated: None,
                preferred_value: None,
            }],
            error: None,
            advisories: Vec::new(),
        };
    }

    match classify(&split_subtags(&text)) {
        Ok(subtags) => TagReport {
            input: input.to_string(),
            valid: true,
            tag: Some(text.clone()),
            components: subtags.iter().map(ComponentReport::from).collect(),
            error: None,
            advisories: Vec::new(),
        },
        Err(err) => TagReport::invalid(input, ErrorReport::from(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langtags_core::{RegistryIndex, SubtagRecord};

    fn check_one(validator: &TagValidator<'_>, input: &str, config: &LangtagsConfig) -> TagReport {
        check_registered(validator, &[input.to_string()], config).remove(0)
    }

    fn registry() -> RegistryIndex {
        RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Language, "en")
                .with_description("English")
                .with_suppress_script("Latn"),
            SubtagRecord::new(RecordType::Script, "Latn").with_description("Latin"),
            SubtagRecord::new(RecordType::Region, "US").with_description("United States"),
        ])
    }

    #[test]
    fn test_registered_report() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        let report = check_one(&validator, "en-latn-us", &LangtagsConfig::default());
        assert!(report.valid);
        assert_eq!(report.tag.as_deref(), Some("en-Latn-US"));
        assert_eq!(report.components.len(), 3);
        assert_eq!(report.components[0].description.as_deref(), Some("English"));
        assert_eq!(report.advisories.len(), 1);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_invalid_report_carries_error() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        let report = check_one(&validator, "zz-US", &LangtagsConfig::default());
        assert!(!report.valid);
        let error = report.error.unwrap();
        assert_eq!(error.kind, "invalid-subtag");
        assert_eq!(error.token.as_deref(), Some("zz"));
        assert_eq!(error.position, Some(0));
    }

    #[test]
    fn test_normalize_applies_before_validation() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        let config = LangtagsConfig {
            normalize: true,
            ..LangtagsConfig::default()
        };
        let report = check_one(&validator, "en_US", &config);
        assert!(report.valid);
        assert_eq!(report.input, "en_US");
        assert_eq!(report.tag.as_deref(), Some("en-US"));
    }

    #[test]
    fn test_batch_reports_keep_input_order() {
        let registry = registry();
        let validator = TagValidator::new(&registry);
        let inputs: Vec<String> = ["en_US", "zz", "en-Latn", "US"]
            .into_iter()
            .map(String::from)
            .collect();

        for normalize in [false, true] {
            let config = LangtagsConfig {
                normalize,
                ..LangtagsConfig::default()
            };
            let batch = check_registered(&validator, &inputs, &config);
            assert_eq!(batch.len(), inputs.len());
            for (report, input) in batch.iter().zip(&inputs) {
                let single = if normalize {
                    validator.validate_normalized(input)
                } else {
                    validator.validate(input)
                };
                assert_eq!(report.input, *input);
                assert_eq!(report.valid, single.is_ok());
                assert_eq!(report.tag, single.ok().map(|t| t.to_string()));
            }
        }

        let config = LangtagsConfig {
            normalize: true,
            ..LangtagsConfig::default()
        };
        let batch = check_registered(&validator, &inputs, &config);
        assert_eq!(batch[0].tag.as_deref(), Some("en-US"));
        assert!(!batch[1].valid);
        assert_eq!(batch[2].advisories.len(), 1);
        assert!(!batch[3].valid);
    }

    #[test]
    fn test_well_formed_report() {
        let report = check_well_formed("qq-Zzzz-QQ", false);
        assert!(report.valid);
        assert_eq!(report.components.len(), 3);
        assert_eq!(report.components[1].slot, "script");

        let report = check_well_formed("en-US-Latn", false);
        assert!(!report.valid);
        assert_eq!(report.error.unwrap().kind, "malformed");

        let report = check_well_formed("i-klingon", false);
        assert!(report.valid);
        assert_eq!(report.components.len(), 1);
    }
}
