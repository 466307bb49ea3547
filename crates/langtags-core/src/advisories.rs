//! Advisory checks over valid tags.
//!
//! These never reject a tag and never rewrite it; they surface registry
//! annotations a caller may want to act on.

use std::collections::HashSet;

use crate::config::AdvisoryConfig;
use crate::diagnostics::Diagnostic;
use crate::grammar::Slot;
use crate::tag::{Component, Tag};

/// A subtag (or grandfathered tag) is marked `Deprecated` in the registry.
pub const DEPRECATED_SUBTAG: &str = "LT-001";
/// The script equals the language's `Suppress-Script`.
pub const SUPPRESSED_SCRIPT: &str = "LT-002";
/// None of a variant's registered prefixes precede it.
pub const VARIANT_PREFIX: &str = "LT-003";
/// An extlang whose record names a preferred primary language.
pub const EXTLANG_PREFERRED: &str = "LT-004";

pub const ALL_RULES: &[&str] = &[
    DEPRECATED_SUBTAG,
    SUPPRESSED_SCRIPT,
    VARIANT_PREFIX,
    EXTLANG_PREFERRED,
];

/// Run every enabled advisory over `tag`.
pub fn check_tag(tag: &Tag, config: &AdvisoryConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if config.is_rule_enabled(DEPRECATED_SUBTAG) {
        check_deprecated(tag, &mut diagnostics);
    }
    if config.is_rule_enabled(SUPPRESSED_SCRIPT) {
        check_suppressed_script(tag, &mut diagnostics);
    }
    if config.is_rule_enabled(VARIANT_PREFIX) {
        check_variant_prefixes(tag, &mut diagnostics);
    }
    if config.is_rule_enabled(EXTLANG_PREFERRED) {
        check_extlang(tag, &mut diagnostics);
    }

    diagnostics
}

fn check_deprecated(tag: &Tag, diagnostics: &mut Vec<Diagnostic>) {
    for component in tag.components() {
        let Some(record) = component.record() else {
            continue;
        };
        let Some(date) = record.deprecated else {
            continue;
        };
        let mut diag = Diagnostic::warning(
            DEPRECATED_SUBTAG,
            &record.subtag,
            format!(
                "{} '{}' is deprecated since {}",
                record.record_type, record.subtag, date
            ),
        );
        if let Some(preferred) = &record.preferred_value {
            diag = diag.with_suggestion(format!("Use '{}' instead", preferred));
        }
        diagnostics.push(diag);
    }
}

fn check_suppressed_script(tag: &Tag, diagnostics: &mut Vec<Diagnostic>) {
    let (Some(language), Some(script)) = (tag.language(), tag.script()) else {
        return;
    };
    let Some(suppressed) = language.suppress_script() else {
        return;
    };
    if suppressed.eq_ignore_ascii_case(script.subtag_text()) {
        diagnostics.push(
            Diagnostic::info(
                SUPPRESSED_SCRIPT,
                script.subtag_text(),
                format!(
                    "script '{}' is implied by language '{}'",
                    script.subtag_text(),
                    language.subtag_text()
                ),
            )
            .with_suggestion(format!("Omit '{}'", script.subtag_text())),
        );
    }
}

fn check_variant_prefixes(tag: &Tag, diagnostics: &mut Vec<Diagnostic>) {
    let components = tag.components();
    for (idx, component) in components.iter().enumerate() {
        if component.slot() != Slot::Variant {
            continue;
        }
        let Some(record) = component.record() else {
            continue;
        };
        if record.prefixes.is_empty() {
            continue;
        }

        let preceding: HashSet<String> = components[..idx]
            .iter()
            .filter(|c| c.slot().is_registry_checked())
            .map(|c| c.subtag_text().to_ascii_lowercase())
            .collect();
        let satisfied = record.prefixes.iter().any(|prefix| {
            prefix
                .split('-')
                .all(|part| preceding.contains(&part.to_ascii_lowercase()))
        });

        if !satisfied {
            diagnostics.push(Diagnostic::warning(
                VARIANT_PREFIX,
                component.subtag_text(),
                format!(
                    "variant '{}' is registered for use with {}",
                    component.subtag_text(),
                    record.prefixes.join(" or ")
                ),
            ));
        }
    }
}

fn check_extlang(tag: &Tag, diagnostics: &mut Vec<Diagnostic>) {
    let Some(extlang) = tag.extlang() else {
        return;
    };
    let Some(preferred) = extlang.preferred_value() else {
        return;
    };
    let language = tag.language().map(Component::subtag_text).unwrap_or_default();
    diagnostics.push(
        Diagnostic::warning(
            EXTLANG_PREFERRED,
            extlang.subtag_text(),
            format!(
                "extlang '{}' has preferred primary language '{}'",
                extlang.subtag_text(),
                preferred
            ),
        )
        .with_suggestion(format!(
            "Use '{}' in place of '{}-{}'",
            preferred,
            language,
            extlang.subtag_text()
        )),
    );
}
