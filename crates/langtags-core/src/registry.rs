//! In-memory index over IANA Language Subtag Registry records.
//!
//! The index is built once from an ordered sequence of [`SubtagRecord`]s and
//! is read-only afterwards. Lookups are keyed by record type plus the
//! ASCII-lowercased subtag text; the original registry casing is kept on the
//! record itself and is what tags render with.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::diagnostics::InvalidDateError;

/// Registry dates are always zero-padded `YYYY-MM-DD`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record type as named by the registry's `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Language,
    Extlang,
    Script,
    Region,
    Variant,
    Grandfathered,
    Redundant,
}

impl RecordType {
    pub const ALL: [RecordType; 7] = [
        RecordType::Language,
        RecordType::Extlang,
        RecordType::Script,
        RecordType::Region,
        RecordType::Variant,
        RecordType::Grandfathered,
        RecordType::Redundant,
    ];

    /// Registry spelling of the type (`"language"`, `"extlang"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Language => "language",
            RecordType::Extlang => "extlang",
            RecordType::Script => "script",
            RecordType::Region => "region",
            RecordType::Variant => "variant",
            RecordType::Grandfathered => "grandfathered",
            RecordType::Redundant => "redundant",
        }
    }

    /// Whole-tag records use a `Tag` field instead of `Subtag`.
    pub fn is_whole_tag(self) -> bool {
        matches!(self, RecordType::Grandfathered | RecordType::Redundant)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Calendar date as written in the registry (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RegistryDate(NaiveDate);

impl RegistryDate {
    /// Returns `None` when the date does not exist on the calendar.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for RegistryDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for RegistryDate {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        // chrono accepts unpadded fields; the registry never writes them.
        if text.len() != 10 || !text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            return Err(InvalidDateError {
                value: s.to_string(),
            });
        }
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Self)
            .map_err(|_| InvalidDateError {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for RegistryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtagRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Subtag (or whole tag) in registry case.
    pub subtag: String,
    /// All `Description` lines in source order; the first is primary.
    pub descriptions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<RegistryDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<RegistryDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_script: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macrolanguage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl SubtagRecord {
    pub fn new(record_type: RecordType, subtag: impl Into<String>) -> Self {
        Self {
            record_type,
            subtag: subtag.into(),
            descriptions: Vec::new(),
            added: None,
            deprecated: None,
            preferred_value: None,
            suppress_script: None,
            prefixes: Vec::new(),
            comments: None,
            macrolanguage: None,
            scope: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }

    pub fn with_added(mut self, added: RegistryDate) -> Self {
        self.added = Some(added);
        self
    }

    pub fn with_deprecated(mut self, deprecated: RegistryDate) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    pub fn with_preferred_value(mut self, value: impl Into<String>) -> Self {
        self.preferred_value = Some(value.into());
        self
    }

    pub fn with_suppress_script(mut self, script: impl Into<String>) -> Self {
        self.suppress_script = Some(script.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Primary description, or `""` when the record has none.
    pub fn description(&self) -> &str {
        self.descriptions.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    /// Lookup key for this record.
    pub fn key(&self) -> String {
        fold_key(&self.subtag)
    }
}

fn fold_key(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// Every subtag in an alphabetic `start..end` range, in order, with the
/// letter case of `start`. `None` when `subtag` is not such a range.
fn expand_range(subtag: &str) -> Option<Vec<String>> {
    let (start, end) = subtag.split_once("..")?;
    if start.is_empty()
        || start.len() != end.len()
        || !start.bytes().chain(end.bytes()).all(|b| b.is_ascii_alphabetic())
    {
        return None;
    }

    let end = fold_key(end);
    let mut current = start.as_bytes().to_vec();
    let mut subtags = Vec::new();
    loop {
        let text: String = current.iter().copied().map(char::from).collect();
        let key = fold_key(&text);
        if key > end {
            break;
        }
        subtags.push(text);
        if key == end || !next_letters(&mut current) {
            break;
        }
    }

    if subtags.is_empty() { None } else { Some(subtags) }
}

/// Advance a run of ASCII letters by one, carrying leftwards. Returns
/// `false` on overflow past `z`.
fn next_letters(letters: &mut [u8]) -> bool {
    for b in letters.iter_mut().rev() {
        match *b {
            b'z' => *b = b'a',
            b'Z' => *b = b'A',
            _ => {
                *b += 1;
                return true;
            }
        }
    }
    false
}

/// Read-only index of registry records keyed by `(RecordType, lowercase subtag)`.
///
/// Build it once and share it by reference (or `Arc`) between validations;
/// nothing in the index changes after construction.
#[derive(Debug, Default)]
pub struct RegistryIndex {
    entries: HashMap<RecordType, HashMap<String, Vec<Arc<SubtagRecord>>>>,
    file_date: Option<RegistryDate>,
    record_count: usize,
}

impl RegistryIndex {
    /// Index `records`, keeping source order among records that share a key.
    ///
    /// A range subtag such as `qaa..qtz` is indexed under every subtag it
    /// covers, each rendered in the case of the range start. The range still
    /// counts as a single record.
    pub fn build(records: impl IntoIterator<Item = SubtagRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.record_count += 1;
            let expanded = if record.record_type.is_whole_tag() {
                None
            } else {
                expand_range(&record.subtag)
            };
            match expanded {
                Some(subtags) => {
                    for subtag in subtags {
                        index.insert(SubtagRecord {
                            subtag,
                            ..record.clone()
                        });
                    }
                }
                None => index.insert(record),
            }
        }
        index
    }

    fn insert(&mut self, record: SubtagRecord) {
        self.entries
            .entry(record.record_type)
            .or_default()
            .entry(record.key())
            .or_default()
            .push(Arc::new(record));
    }

    pub(crate) fn with_file_date(mut self, file_date: Option<RegistryDate>) -> Self {
        self.file_date = file_date;
        self
    }

    /// `File-Date` of the registry this index was loaded from, if known.
    pub fn file_date(&self) -> Option<RegistryDate> {
        self.file_date
    }

    /// Number of records indexed.
    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// All records of `record_type` whose subtag matches `text` case-insensitively.
    pub fn lookup(&self, record_type: RecordType, text: &str) -> &[Arc<SubtagRecord>] {
        self.entries
            .get(&record_type)
            .and_then(|by_key| by_key.get(&fold_key(text)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First matching record, the one used for descriptions and rendering.
    pub fn primary(&self, record_type: RecordType, text: &str) -> Option<&Arc<SubtagRecord>> {
        self.lookup(record_type, text).first()
    }

    pub fn contains(&self, record_type: RecordType, text: &str) -> bool {
        !self.lookup(record_type, text).is_empty()
    }

    /// Number of distinct keys indexed for `record_type`.
    pub fn count_of(&self, record_type: RecordType) -> usize {
        self.entries.get(&record_type).map_or(0, HashMap::len)
    }

    pub fn lookup_language(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Language, text)
    }

    pub fn lookup_extlang(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Extlang, text)
    }

    pub fn lookup_script(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Script, text)
    }

    pub fn lookup_region(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Region, text)
    }

    pub fn lookup_variant(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Variant, text)
    }

    pub fn lookup_grandfathered(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Grandfathered, text)
    }

    pub fn lookup_redundant(&self, text: &str) -> &[Arc<SubtagRecord>] {
        self.lookup(RecordType::Redundant, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> RegistryDate {
        s.parse().unwrap()
    }

    fn sample_index() -> RegistryIndex {
        RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Language, "en")
                .with_description("English")
                .with_added(date("2005-10-16"))
                .with_suppress_script("Latn"),
            SubtagRecord::new(RecordType::Script, "Latn").with_description("Latin"),
            SubtagRecord::new(RecordType::Region, "US").with_description("United States"),
            SubtagRecord::new(RecordType::Language, "EN").with_description("Second English"),
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = sample_index();
        assert_eq!(index.lookup_script("latn").len(), 1);
        assert_eq!(index.lookup_script("LATN").len(), 1);
        assert_eq!(index.lookup_script("Latn")[0].subtag, "Latn");
    }

    #[test]
    fn test_lookup_respects_record_type() {
        let index = sample_index();
        assert!(index.lookup_region("en").is_empty());
        assert!(index.lookup(RecordType::Variant, "us").is_empty());
        assert!(index.contains(RecordType::Region, "us"));
    }

    #[test]
    fn test_records_sharing_a_key_keep_source_order() {
        let index = sample_index();
        let records = index.lookup_language("en");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description(), "English");
        assert_eq!(records[1].description(), "Second English");
        assert_eq!(
            index.primary(RecordType::Language, "En").unwrap().subtag,
            "en"
        );
    }

    #[test]
    fn test_missing_lookup_returns_empty_slice() {
        let index = sample_index();
        assert!(index.lookup_language("zz").is_empty());
        assert!(index.primary(RecordType::Language, "zz").is_none());
    }

    #[test]
    fn test_len_and_counts() {
        let index = sample_index();
        assert_eq!(index.len(), 4);
        assert!(!index.is_empty());
        assert_eq!(index.count_of(RecordType::Language), 1);
        assert_eq!(index.count_of(RecordType::Variant), 0);
        assert!(RegistryIndex::build(Vec::new()).is_empty());
    }

    #[test]
    fn test_range_records_cover_each_subtag() {
        let index = RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Language, "qaa..qtz").with_description("Private use"),
            SubtagRecord::new(RecordType::Script, "Qaaa..Qabx").with_description("Private use"),
            SubtagRecord::new(RecordType::Region, "QM..QZ").with_description("Private use"),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.count_of(RecordType::Language), 20 * 26);
        assert_eq!(index.count_of(RecordType::Script), 26 + 24);
        assert_eq!(index.count_of(RecordType::Region), 14);

        let qab = index.primary(RecordType::Language, "QAB").unwrap();
        assert_eq!(qab.subtag, "qab");
        assert_eq!(qab.description(), "Private use");
        assert!(index.contains(RecordType::Language, "qtz"));
        assert!(!index.contains(RecordType::Language, "qua"));

        assert_eq!(index.lookup_script("qaaz")[0].subtag, "Qaaz");
        assert_eq!(index.lookup_script("qaba")[0].subtag, "Qaba");
        assert!(index.lookup_script("qaby").is_empty());

        assert_eq!(index.lookup_region("qn")[0].subtag, "QN");
        assert!(index.lookup_region("ql").is_empty());
        assert!(index.lookup_region("qm..qz").is_empty());
    }

    #[test]
    fn test_non_range_subtags_are_indexed_verbatim() {
        assert_eq!(expand_range("en"), None);
        assert_eq!(expand_range("qtz..qaa"), None);
        assert_eq!(expand_range("qa..qtz"), None);
        assert_eq!(expand_range("1994..1996"), None);
        assert_eq!(
            expand_range("XY..XZ"),
            Some(vec!["XY".to_string(), "XZ".to_string()])
        );

        let index = RegistryIndex::build(vec![
            SubtagRecord::new(RecordType::Redundant, "a..b").with_description("Whole tag"),
        ]);
        assert_eq!(index.lookup_redundant("a..b").len(), 1);
    }

    #[test]
    fn test_record_type_from_str() {
        assert_eq!("Language".parse(), Ok(RecordType::Language));
        assert_eq!("extlang".parse(), Ok(RecordType::Extlang));
        assert_eq!(" grandfathered ".parse(), Ok(RecordType::Grandfathered));
        assert_eq!("private".parse::<RecordType>(), Err(()));
        assert!(RecordType::Redundant.is_whole_tag());
        assert!(!RecordType::Variant.is_whole_tag());
    }

    #[test]
    fn test_registry_date_parse_and_display() {
        let d = date("2005-10-16");
        assert_eq!((d.year(), d.month(), d.day()), (2005, 10, 16));
        assert_eq!(d.to_string(), "2005-10-16");
        assert!(date("1989-01-01") < d);
    }

    #[test]
    fn test_registry_date_rejects_malformed() {
        assert!("2005-13-01".parse::<RegistryDate>().is_err());
        assert!("2005-1-01".parse::<RegistryDate>().is_err());
        assert!("yesterday".parse::<RegistryDate>().is_err());
        assert!("2005-10-00".parse::<RegistryDate>().is_err());
    }

    #[test]
    fn test_registry_date_rejects_impossible_days() {
        for text in ["2005-02-31", "2023-02-29", "2005-04-31", "1900-02-29"] {
            let err = text.parse::<RegistryDate>().unwrap_err();
            assert_eq!(err.value, text);
        }
        assert!(RegistryDate::new(2005, 2, 31).is_none());
    }

    #[test]
    fn test_registry_date_accepts_leap_day() {
        let d = date("2024-02-29");
        assert_eq!((d.month(), d.day()), (2, 29));
        assert_eq!(d.to_string(), "2024-02-29");
        assert_eq!(RegistryDate::new(2000, 2, 29), Some(date("2000-02-29")));
    }

    #[test]
    fn test_record_serializes_without_empty_fields() {
        let record = SubtagRecord::new(RecordType::Region, "GB")
            .with_description("United Kingdom")
            .with_added(date("2005-10-16"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "region");
        assert_eq!(json["subtag"], "GB");
        assert_eq!(json["added"], "2005-10-16");
        assert!(json.get("deprecated").is_none());
        assert!(json.get("prefixes").is_none());
    }
}
