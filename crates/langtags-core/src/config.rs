//! Validator configuration
//!
//! Loaded from a `.langtags.toml` file:
//!
//! ```toml
//! registry = "/usr/share/langtags/language-subtag-registry"
//! normalize = true
//!
//! [advisories]
//! suppress_script = false
//! disabled_rules = ["LT-003"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::advisories::{
    DEPRECATED_SUBTAG, EXTLANG_PREFERRED, SUPPRESSED_SCRIPT, VARIANT_PREFIX,
};
use crate::diagnostics::ConfigError;
use crate::file_utils::{DEFAULT_MAX_CONFIG_SIZE, read_bounded};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".langtags.toml";

/// Toggles for the advisory checks run over valid tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Report deprecated subtags (LT-001)
    pub deprecated: bool,

    /// Report scripts that match the language's Suppress-Script (LT-002)
    pub suppress_script: bool,

    /// Report variants whose registry prefixes are unmet (LT-003)
    pub variant_prefix: bool,

    /// Report extlang subtags that have a preferred primary language (LT-004)
    pub extlang: bool,

    /// Individual rule IDs to turn off, e.g. `["LT-002"]`
    pub disabled_rules: Vec<String>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            deprecated: true,
            suppress_script: true,
            variant_prefix: true,
            extlang: true,
            disabled_rules: Vec::new(),
        }
    }
}

impl AdvisoryConfig {
    /// Check if an advisory rule is enabled by both its category flag and the
    /// `disabled_rules` list.
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self
            .disabled_rules
            .iter()
            .any(|r| r.eq_ignore_ascii_case(rule_id))
        {
            return false;
        }

        match rule_id {
            DEPRECATED_SUBTAG => self.deprecated,
            SUPPRESSED_SCRIPT => self.suppress_script,
            VARIANT_PREFIX => self.variant_prefix,
            EXTLANG_PREFERRED => self.extlang,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LangtagsConfig {
    /// Path to the IANA `language-subtag-registry` file.
    pub registry: Option<PathBuf>,

    /// Rewrite `_` and `/` separators to `-` before validating.
    pub normalize: bool,

    pub advisories: AdvisoryConfig,
}

impl LangtagsConfig {
    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_bounded(path, DEFAULT_MAX_CONFIG_SIZE)?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        // Relative registry paths are relative to the config file.
        if let (Some(registry), Some(dir)) = (config.registry.as_mut(), path.parent())
            && registry.is_relative()
        {
            *registry = dir.join(&*registry);
        }

        Ok(config)
    }

    /// Load config or use default, returning any load warning.
    ///
    /// A path that cannot be read or parsed falls back to the default config
    /// with a warning describing the error.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<String>) {
        match path {
            Some(p) => match Self::load(p) {
                Ok(config) => (config, None),
                Err(e) => {
                    let warning = format!(
                        "Failed to load config from {}: {}; using defaults",
                        p.display(),
                        error_chain(&e)
                    );
                    (Self::default(), Some(warning))
                }
            },
            None => (Self::default(), None),
        }
    }

    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.advisories.is_rule_enabled(rule_id)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
