//! Validated language tags.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::diagnostics::ComponentIndexError;
use crate::grammar::Slot;
use crate::registry::{RecordType, RegistryDate, SubtagRecord};

/// One resolved element of a [`Tag`].
///
/// Language, extlang, script, region and variant subtags resolve to a
/// registry record and render in the registry's case. Extension and
/// private-use runs are only shape-checked and render lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Registered {
        slot: Slot,
        record: Arc<SubtagRecord>,
    },
    Raw {
        slot: Slot,
        text: String,
    },
}

impl Component {
    pub(crate) fn registered(slot: Slot, record: Arc<SubtagRecord>) -> Self {
        Component::Registered { slot, record }
    }

    pub(crate) fn raw(slot: Slot, text: impl Into<String>) -> Self {
        Component::Raw {
            slot,
            text: text.into().to_ascii_lowercase(),
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            Component::Registered { slot, .. } | Component::Raw { slot, .. } => *slot,
        }
    }

    /// Canonical text of this component.
    pub fn subtag_text(&self) -> &str {
        match self {
            Component::Registered { record, .. } => &record.subtag,
            Component::Raw { text, .. } => text,
        }
    }

    pub fn record(&self) -> Option<&SubtagRecord> {
        match self {
            Component::Registered { record, .. } => Some(record),
            Component::Raw { .. } => None,
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        self.record().map(|r| r.record_type)
    }

    pub fn description(&self) -> Option<&str> {
        self.record().map(SubtagRecord::description)
    }

    pub fn added(&self) -> Option<RegistryDate> {
        self.record().and_then(|r| r.added)
    }

    pub fn comments(&self) -> Option<&str> {
        self.record().and_then(|r| r.comments.as_deref())
    }

    pub fn deprecated(&self) -> Option<RegistryDate> {
        self.record().and_then(|r| r.deprecated)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated().is_some()
    }

    pub fn preferred_value(&self) -> Option<&str> {
        self.record().and_then(|r| r.preferred_value.as_deref())
    }

    pub fn suppress_script(&self) -> Option<&str> {
        self.record().and_then(|r| r.suppress_script.as_deref())
    }

    /// Singleton of an extension run.
    pub fn extension_key(&self) -> Option<char> {
        match self.slot() {
            Slot::Extension(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtag_text())
    }
}

/// A validated BCP 47 language tag.
///
/// Only produced by [`TagValidator`](crate::TagValidator). Components are in
/// canonical order: language, extlang, script, region, variants, extensions,
/// private use. Two tags are equal when their canonical strings are equal.
#[derive(Debug, Clone)]
pub struct Tag {
    components: Vec<Component>,
    rendered: String,
}

impl Tag {
    pub(crate) fn from_components(components: Vec<Component>) -> Self {
        debug_assert!(!components.is_empty());
        let rendered = components
            .iter()
            .map(Component::subtag_text)
            .collect::<Vec<_>>()
            .join("-");
        Self {
            components,
            rendered,
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always `false`; a tag has at least one component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component at `index`; negative indexes count from the end.
    pub fn at(&self, index: isize) -> Result<&Component, ComponentIndexError> {
        self.get(index).ok_or(ComponentIndexError {
            index,
            len: self.components.len(),
        })
    }

    pub fn get(&self, index: isize) -> Option<&Component> {
        let resolved = if index < 0 {
            self.components.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.components.get(resolved)
    }

    fn single(&self, slot: Slot) -> Option<&Component> {
        self.components.iter().find(|c| c.slot() == slot)
    }

    /// Primary language; for a grandfathered tag, the whole-tag component.
    pub fn language(&self) -> Option<&Component> {
        self.single(Slot::Language)
    }

    pub fn extlang(&self) -> Option<&Component> {
        self.single(Slot::Extlang)
    }

    pub fn script(&self) -> Option<&Component> {
        self.single(Slot::Script)
    }

    pub fn region(&self) -> Option<&Component> {
        self.single(Slot::Region)
    }

    pub fn private_use(&self) -> Option<&Component> {
        self.single(Slot::PrivateUse)
    }

    pub fn variants(&self) -> Vec<&Component> {
        self.components
            .iter()
            .filter(|c| c.slot() == Slot::Variant)
            .collect()
    }

    pub fn extensions(&self) -> Vec<&Component> {
        self.components
            .iter()
            .filter(|c| matches!(c.slot(), Slot::Extension(_)))
            .collect()
    }

    /// Extension run for `singleton`, matched case-insensitively.
    pub fn extension(&self, singleton: char) -> Option<&Component> {
        self.single(Slot::Extension(singleton.to_ascii_lowercase()))
    }

    /// The whole-tag record when this is a grandfathered registration.
    pub fn grandfathered(&self) -> Option<&Component> {
        self.language()
            .filter(|c| c.record_type() == Some(RecordType::Grandfathered))
    }

    pub fn is_grandfathered(&self) -> bool {
        self.grandfathered().is_some()
    }

    /// A tag made of a single private-use run (`x-...`).
    pub fn is_private_use_only(&self) -> bool {
        self.components.len() == 1 && self.components[0].slot() == Slot::PrivateUse
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.rendered)
    }
}
