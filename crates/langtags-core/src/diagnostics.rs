//! Error types and advisory diagnostics

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::grammar::Slot;
use crate::registry::RecordType;

pub type TagResult<T> = Result<T, TagError>;

/// Why a tag failed the BCP 47 grammar.
///
/// Positions are zero-based indexes into the hyphen-separated subtag list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("tag is empty")]
    Empty,

    #[error("empty subtag at position {position}")]
    EmptySubtag { position: usize },

    #[error("'{token}' is not a valid primary language subtag")]
    InvalidLanguage { token: String },

    #[error("'{token}' at position {position} does not match any subtag form")]
    Unrecognized { token: String, position: usize },

    #[error("{slot} subtag '{token}' at position {position} is out of order")]
    OutOfOrder {
        token: String,
        position: usize,
        slot: Slot,
    },

    #[error("variant '{token}' at position {position} is repeated")]
    DuplicateVariant { token: String, position: usize },

    #[error("extension singleton '{token}' at position {position} is repeated")]
    DuplicateExtension { token: String, position: usize },

    #[error("extension singleton '{token}' at position {position} has no subtags")]
    EmptyExtension { token: String, position: usize },

    #[error("'{token}' at position {position} is not a valid extension subtag")]
    InvalidExtensionSubtag { token: String, position: usize },

    #[error("private-use singleton at position {position} has no subtags")]
    EmptyPrivateUse { position: usize },

    #[error("'{token}' at position {position} is not a valid private-use subtag")]
    InvalidPrivateUseSubtag { token: String, position: usize },
}

impl MalformedReason {
    /// Offending subtag, when the failure is tied to one.
    pub fn token(&self) -> Option<&str> {
        match self {
            MalformedReason::Empty
            | MalformedReason::EmptySubtag { .. }
            | MalformedReason::EmptyPrivateUse { .. } => None,
            MalformedReason::InvalidLanguage { token }
            | MalformedReason::Unrecognized { token, .. }
            | MalformedReason::OutOfOrder { token, .. }
            | MalformedReason::DuplicateVariant { token, .. }
            | MalformedReason::DuplicateExtension { token, .. }
            | MalformedReason::EmptyExtension { token, .. }
            | MalformedReason::InvalidExtensionSubtag { token, .. }
            | MalformedReason::InvalidPrivateUseSubtag { token, .. } => Some(token),
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            MalformedReason::Empty => None,
            MalformedReason::InvalidLanguage { .. } => Some(0),
            MalformedReason::EmptySubtag { position }
            | MalformedReason::EmptyPrivateUse { position }
            | MalformedReason::Unrecognized { position, .. }
            | MalformedReason::OutOfOrder { position, .. }
            | MalformedReason::DuplicateVariant { position, .. }
            | MalformedReason::DuplicateExtension { position, .. }
            | MalformedReason::EmptyExtension { position, .. }
            | MalformedReason::InvalidExtensionSubtag { position, .. }
            | MalformedReason::InvalidPrivateUseSubtag { position, .. } => Some(*position),
        }
    }
}

/// The tag does not satisfy the BCP 47 shape, ordering or cardinality rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed language tag '{tag}': {reason}")]
pub struct MalformedTagError {
    pub tag: String,
    pub reason: MalformedReason,
}

impl MalformedTagError {
    pub fn new(tag: impl Into<String>, reason: MalformedReason) -> Self {
        Self {
            tag: tag.into(),
            reason,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.reason.token()
    }

    pub fn position(&self) -> Option<usize> {
        self.reason.position()
    }
}

/// Why a well-formed subtag was rejected by the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("not a registered {expected} subtag")]
    NotRegistered { expected: RecordType },

    #[error("{expected} subtag requires prefix {} but follows '{found}'", .prefixes.join(" or "))]
    PrefixMismatch {
        expected: RecordType,
        prefixes: Vec<String>,
        found: String,
    },
}

impl InvalidReason {
    pub fn expected(&self) -> RecordType {
        match self {
            InvalidReason::NotRegistered { expected }
            | InvalidReason::PrefixMismatch { expected, .. } => *expected,
        }
    }
}

/// The tag is well-formed but a subtag is absent from the registry, or
/// violates a registry prefix constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid subtag '{token}' at position {position} in language tag '{tag}': {reason}")]
pub struct InvalidSubtagError {
    pub tag: String,
    pub token: String,
    pub position: usize,
    pub reason: InvalidReason,
}

impl InvalidSubtagError {
    pub fn expected(&self) -> RecordType {
        self.reason.expected()
    }
}

/// Failure of a single `validate` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error(transparent)]
    Malformed(#[from] MalformedTagError),

    #[error(transparent)]
    InvalidSubtag(#[from] InvalidSubtagError),
}

impl TagError {
    /// The input string that was being validated.
    pub fn tag(&self) -> &str {
        match self {
            TagError::Malformed(e) => &e.tag,
            TagError::InvalidSubtag(e) => &e.tag,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            TagError::Malformed(e) => e.token(),
            TagError::InvalidSubtag(e) => Some(&e.token),
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            TagError::Malformed(e) => e.position(),
            TagError::InvalidSubtag(e) => Some(e.position),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, TagError::Malformed(_))
    }

    pub fn is_invalid_subtag(&self) -> bool {
        matches!(self, TagError::InvalidSubtag(_))
    }

    /// Short machine-readable kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TagError::Malformed(_) => "malformed",
            TagError::InvalidSubtag(_) => "invalid-subtag",
        }
    }
}

/// Out-of-range index passed to [`Tag::at`](crate::Tag::at).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("component index {index} out of range for tag with {len} components")]
pub struct ComponentIndexError {
    pub index: isize,
    pub len: usize,
}

/// A `YYYY-MM-DD` value that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid registry date '{value}'")]
pub struct InvalidDateError {
    pub value: String,
}

/// Registry text that does not follow the record-jar layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryParseError {
    #[error("line {line}: expected 'Field: value', found '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: continuation line without a preceding field")]
    OrphanContinuation { line: usize },

    #[error("line {line}: unknown record type '{value}'")]
    UnknownRecordType { line: usize, value: String },

    #[error("line {line}: record is missing the '{field}' field")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: invalid date in '{field}': '{value}'")]
    InvalidDate {
        line: usize,
        field: String,
        value: String,
    },
}

/// Bounded file read failures.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File too large: {path} ({size} bytes, limit {limit} bytes)")]
    TooBig { path: PathBuf, size: u64, limit: u64 },

    #[error("Not a regular file: {path}")]
    NotRegular { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum RegistryLoadError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("Failed to parse registry file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: RegistryParseError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("Failed to parse config file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Warning,
    Info,
}

/// A non-fatal note about a valid tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub rule: String,
    pub message: String,
    /// Canonical text of the component the note is about.
    pub subtag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn warning(rule: &str, subtag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            rule: rule.to_string(),
            message: message.into(),
            subtag: subtag.into(),
            suggestion: None,
        }
    }

    pub fn info(rule: &str, subtag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            rule: rule.to_string(),
            message: message.into(),
            subtag: subtag.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
