//! BCP 47 grammar classification.
//!
//! Assigns each hyphen-separated subtag a grammar [`Slot`] using only its
//! shape (length and character class). The registry is never consulted here.
//!
//! Slots are visited in a fixed order:
//!
//! ```text
//! language -> extlang? -> script? -> region? -> variant* -> extension* -> privateuse?
//! ```
//!
//! Once a slot has been passed it cannot recur; only variants and extensions
//! repeat. A subtag whose shape belongs to a slot that has already been
//! passed is reported as out of order rather than reinterpreted.

use std::borrow::Cow;
use std::fmt;

use crate::diagnostics::{MalformedReason, MalformedTagError};
use crate::registry::RecordType;

/// Subtag separator.
pub const SEPARATOR: char = '-';

/// The closed set of grandfathered tags from BCP 47, irregular then regular.
pub const GRANDFATHERED: &[&str] = &[
    "en-GB-oed",
    "i-ami",
    "i-bnn",
    "i-default",
    "i-enochian",
    "i-hak",
    "i-klingon",
    "i-lux",
    "i-mingo",
    "i-navajo",
    "i-pwn",
    "i-tao",
    "i-tay",
    "i-tsu",
    "sgn-BE-FR",
    "sgn-BE-NL",
    "sgn-CH-DE",
    "art-lojban",
    "cel-gaulish",
    "no-bok",
    "no-nyn",
    "zh-guoyu",
    "zh-hakka",
    "zh-min",
    "zh-min-nan",
    "zh-xiang",
];

/// Grammar position of a subtag within a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Language,
    Extlang,
    Script,
    Region,
    Variant,
    /// Extension run keyed by its lowercase singleton.
    Extension(char),
    PrivateUse,
}

impl Slot {
    /// Registry record type backing this slot; `None` for extension and
    /// private-use runs, which are only checked for shape.
    pub fn record_type(self) -> Option<RecordType> {
        match self {
            Slot::Language => Some(RecordType::Language),
            Slot::Extlang => Some(RecordType::Extlang),
            Slot::Script => Some(RecordType::Script),
            Slot::Region => Some(RecordType::Region),
            Slot::Variant => Some(RecordType::Variant),
            Slot::Extension(_) | Slot::PrivateUse => None,
        }
    }

    pub fn is_registry_checked(self) -> bool {
        self.record_type().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::Language => "language",
            Slot::Extlang => "extlang",
            Slot::Script => "script",
            Slot::Region => "region",
            Slot::Variant => "variant",
            Slot::Extension(_) => "extension",
            Slot::PrivateUse => "private-use",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A subtag (or an extension/private-use run) with its assigned slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSubtag<'a> {
    pub slot: Slot,
    /// Input text for single subtags; the lowercased, hyphen-joined run
    /// (singleton included) for extension and private-use slots.
    pub text: Cow<'a, str>,
    /// Index of the (first) subtag in the token list.
    pub position: usize,
}

/// Progress through the ordered slots after the primary language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    Extlang,
    Script,
    Region,
    Variant,
    Extension,
}

fn is_alpha(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_alphanumeric(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// 2-3 or 5-8 letters. Four-letter primary languages are reserved.
pub fn is_language_shape(s: &str) -> bool {
    matches!(s.len(), 2..=3 | 5..=8) && is_alpha(s)
}

pub fn is_extlang_shape(s: &str) -> bool {
    s.len() == 3 && is_alpha(s)
}

pub fn is_script_shape(s: &str) -> bool {
    s.len() == 4 && is_alpha(s)
}

/// Two letters or three digits.
pub fn is_region_shape(s: &str) -> bool {
    match s.len() {
        2 => is_alpha(s),
        3 => s.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// 5-8 alphanumerics, or four starting with a digit.
pub fn is_variant_shape(s: &str) -> bool {
    match s.len() {
        5..=8 => is_alphanumeric(s),
        4 => s.as_bytes()[0].is_ascii_digit() && is_alphanumeric(s),
        _ => false,
    }
}

/// Single alphanumeric other than `x`.
pub fn is_extension_singleton(s: &str) -> bool {
    s.len() == 1 && is_alphanumeric(s) && !s.eq_ignore_ascii_case("x")
}

pub fn is_private_use_singleton(s: &str) -> bool {
    s.eq_ignore_ascii_case("x")
}

pub fn is_extension_subtag_shape(s: &str) -> bool {
    (2..=8).contains(&s.len()) && is_alphanumeric(s)
}

pub fn is_private_use_subtag_shape(s: &str) -> bool {
    (1..=8).contains(&s.len()) && is_alphanumeric(s)
}

/// Which registry-checked slot a subtag's shape fits first, ignoring position.
fn shape_slot(s: &str) -> Option<Slot> {
    if is_extlang_shape(s) {
        Some(Slot::Extlang)
    } else if is_script_shape(s) {
        Some(Slot::Script)
    } else if is_region_shape(s) {
        Some(Slot::Region)
    } else if is_variant_shape(s) {
        Some(Slot::Variant)
    } else {
        None
    }
}

/// Split a tag on the separator. The empty string yields no subtags; empty
/// subtags between separators are kept so the classifier can report them.
pub fn split_subtags(tag: &str) -> Vec<&str> {
    if tag.is_empty() {
        Vec::new()
    } else {
        tag.split(SEPARATOR).collect()
    }
}

/// Whether `tag` is one of the grandfathered tags, compared case-insensitively.
pub fn is_grandfathered(tag: &str) -> bool {
    GRANDFATHERED.iter().any(|g| g.eq_ignore_ascii_case(tag))
}

/// Lexical well-formedness check; does not consult the registry.
pub fn is_well_formed(tag: &str) -> bool {
    is_grandfathered(tag) || classify(&split_subtags(tag)).is_ok()
}

/// Assign a grammar slot to every subtag in `tokens`.
///
/// Extension and private-use runs are returned as one entry each. A tag
/// starting with the `x` singleton is a private-use tag and yields a single
/// [`Slot::PrivateUse`] entry.
pub fn classify<'a>(tokens: &[&'a str]) -> Result<Vec<ClassifiedSubtag<'a>>, MalformedTagError> {
    let malformed = |reason| MalformedTagError::new(tokens.join("-"), reason);

    let Some(&first) = tokens.first() else {
        return Err(malformed(MalformedReason::Empty));
    };

    let mut classified = Vec::with_capacity(tokens.len());

    if is_private_use_singleton(first) {
        classified.push(private_use_run(tokens, 0).map_err(malformed)?);
        return Ok(classified);
    }
    if first.is_empty() {
        return Err(malformed(MalformedReason::EmptySubtag { position: 0 }));
    }
    if !is_language_shape(first) {
        return Err(malformed(MalformedReason::InvalidLanguage {
            token: first.to_string(),
        }));
    }
    classified.push(ClassifiedSubtag {
        slot: Slot::Language,
        text: Cow::Borrowed(first),
        position: 0,
    });

    // Extended language subtags only follow a 2-3 letter primary language.
    let mut position = if first.len() <= 3 {
        Position::Extlang
    } else {
        Position::Script
    };
    let mut singletons: Vec<char> = Vec::new();
    let mut index = 1;

    while index < tokens.len() {
        let token = tokens[index];

        if token.is_empty() {
            return Err(malformed(MalformedReason::EmptySubtag { position: index }));
        }

        if token.len() == 1 {
            if is_private_use_singleton(token) {
                classified.push(private_use_run(tokens, index).map_err(malformed)?);
                return Ok(classified);
            }
            if !is_extension_singleton(token) {
                return Err(malformed(MalformedReason::Unrecognized {
                    token: token.to_string(),
                    position: index,
                }));
            }
            let key = token.to_ascii_lowercase().chars().next().unwrap_or_default();
            if singletons.contains(&key) {
                return Err(malformed(MalformedReason::DuplicateExtension {
                    token: token.to_string(),
                    position: index,
                }));
            }
            singletons.push(key);

            let (run, next) = extension_run(tokens, index, key).map_err(malformed)?;
            classified.push(run);
            position = Position::Extension;
            index = next;
            continue;
        }

        let slot = if position <= Position::Extlang && is_extlang_shape(token) {
            position = Position::Script;
            Slot::Extlang
        } else if position <= Position::Script && is_script_shape(token) {
            position = Position::Region;
            Slot::Script
        } else if position <= Position::Region && is_region_shape(token) {
            position = Position::Variant;
            Slot::Region
        } else if position <= Position::Variant && is_variant_shape(token) {
            position = Position::Variant;
            let repeated = classified
                .iter()
                .any(|c| c.slot == Slot::Variant && c.text.eq_ignore_ascii_case(token));
            if repeated {
                return Err(malformed(MalformedReason::DuplicateVariant {
                    token: token.to_string(),
                    position: index,
                }));
            }
            Slot::Variant
        } else {
            let reason = match shape_slot(token) {
                Some(slot) => MalformedReason::OutOfOrder {
                    token: token.to_string(),
                    position: index,
                    slot,
                },
                None => MalformedReason::Unrecognized {
                    token: token.to_string(),
                    position: index,
                },
            };
            return Err(malformed(reason));
        };

        classified.push(ClassifiedSubtag {
            slot,
            text: Cow::Borrowed(token),
            position: index,
        });
        index += 1;
    }

    Ok(classified)
}

/// Consume the singleton at `start` and its 2-8 character subtags, stopping at
/// the next singleton or the end. Returns the run and the index after it.
fn extension_run<'a>(
    tokens: &[&'a str],
    start: usize,
    key: char,
) -> Result<(ClassifiedSubtag<'a>, usize), MalformedReason> {
    let mut end = start + 1;
    while end < tokens.len() && tokens[end].len() != 1 {
        let token = tokens[end];
        if token.is_empty() {
            return Err(MalformedReason::EmptySubtag { position: end });
        }
        if !is_extension_subtag_shape(token) {
            return Err(MalformedReason::InvalidExtensionSubtag {
                token: token.to_string(),
                position: end,
            });
        }
        end += 1;
    }

    if end == start + 1 {
        return Err(MalformedReason::EmptyExtension {
            token: tokens[start].to_string(),
            position: start,
        });
    }

    let run = ClassifiedSubtag {
        slot: Slot::Extension(key),
        text: Cow::Owned(tokens[start..end].join("-").to_ascii_lowercase()),
        position: start,
    };
    Ok((run, end))
}

/// Consume the `x` singleton at `start` and every remaining subtag.
fn private_use_run<'a>(
    tokens: &[&'a str],
    start: usize,
) -> Result<ClassifiedSubtag<'a>, MalformedReason> {
    let rest = &tokens[start + 1..];
    if rest.is_empty() {
        return Err(MalformedReason::EmptyPrivateUse { position: start });
    }
    for (offset, token) in rest.iter().enumerate() {
        let position = start + 1 + offset;
        if token.is_empty() {
            return Err(MalformedReason::EmptySubtag { position });
        }
        if !is_private_use_subtag_shape(token) {
            return Err(MalformedReason::InvalidPrivateUseSubtag {
                token: token.to_string(),
                position,
            });
        }
    }

    Ok(ClassifiedSubtag {
        slot: Slot::PrivateUse,
        text: Cow::Owned(tokens[start..].join("-").to_ascii_lowercase()),
        position: start,
    })
}
