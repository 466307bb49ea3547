//! IANA Language Subtag Registry file parser
//!
//! The registry is a record-jar file: records separated by `%%` lines, each
//! record a list of `Field-Name: value` lines. Lines beginning with
//! whitespace continue the previous field. The first record is a header
//! holding the `File-Date`.

use std::path::Path;

use crate::diagnostics::{RegistryLoadError, RegistryParseError};
use crate::file_utils::{DEFAULT_MAX_REGISTRY_SIZE, read_bounded};
use crate::registry::{RecordType, RegistryDate, RegistryIndex, SubtagRecord};

/// Registry contents in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRegistry {
    pub file_date: Option<RegistryDate>,
    pub records: Vec<SubtagRecord>,
}

impl ParsedRegistry {
    pub fn into_index(self) -> RegistryIndex {
        RegistryIndex::build(self.records).with_file_date(self.file_date)
    }
}

#[derive(Debug)]
struct Field<'a> {
    name: &'a str,
    value: String,
    line: usize,
}

#[derive(Debug)]
struct Block<'a> {
    start: usize,
    fields: Vec<Field<'a>>,
}

fn split_blocks(text: &str) -> Result<Vec<Block<'_>>, RegistryParseError> {
    let mut blocks = Vec::new();
    let mut current = Block {
        start: 1,
        fields: Vec::new(),
    };

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if line.trim() == "%%" {
            let next = Block {
                start: line_no + 1,
                fields: Vec::new(),
            };
            blocks.push(std::mem::replace(&mut current, next));
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let Some(last) = current.fields.last_mut() else {
                return Err(RegistryParseError::OrphanContinuation { line: line_no });
            };
            last.value.push(' ');
            last.value.push_str(line.trim());
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(RegistryParseError::MalformedLine {
                line: line_no,
                content: line.to_string(),
            });
        };
        current.fields.push(Field {
            name: name.trim(),
            value: value.trim().to_string(),
            line: line_no,
        });
    }
    blocks.push(current);

    Ok(blocks)
}

fn parse_date(field: &Field<'_>) -> Result<RegistryDate, RegistryParseError> {
    field
        .value
        .parse()
        .map_err(|_| RegistryParseError::InvalidDate {
            line: field.line,
            field: field.name.to_string(),
            value: field.value.clone(),
        })
}

fn find_field<'b, 'a>(block: &'b Block<'a>, names: &[&str]) -> Option<&'b Field<'a>> {
    block
        .fields
        .iter()
        .find(|f| names.iter().any(|n| f.name.eq_ignore_ascii_case(n)))
}

fn build_record(block: &Block<'_>) -> Result<SubtagRecord, RegistryParseError> {
    let type_field = find_field(block, &["Type"]).ok_or(RegistryParseError::MissingField {
        line: block.start,
        field: "Type",
    })?;
    let record_type: RecordType =
        type_field
            .value
            .parse()
            .map_err(|_| RegistryParseError::UnknownRecordType {
                line: type_field.line,
                value: type_field.value.clone(),
            })?;

    let subtag_field = find_field(block, &["Subtag", "Tag"]).ok_or({
        RegistryParseError::MissingField {
            line: block.start,
            field: if record_type.is_whole_tag() {
                "Tag"
            } else {
                "Subtag"
            },
        }
    })?;

    let mut record = SubtagRecord::new(record_type, subtag_field.value.clone());
    for field in &block.fields {
        match field.name.to_ascii_lowercase().as_str() {
            "description" => record.descriptions.push(field.value.clone()),
            "added" => record.added = Some(parse_date(field)?),
            "deprecated" => record.deprecated = Some(parse_date(field)?),
            "preferred-value" => record.preferred_value = Some(field.value.clone()),
            "suppress-script" => record.suppress_script = Some(field.value.clone()),
            "prefix" => record.prefixes.push(field.value.clone()),
            "comments" => match &mut record.comments {
                Some(comments) => {
                    comments.push('\n');
                    comments.push_str(&field.value);
                }
                None => record.comments = Some(field.value.clone()),
            },
            "macrolanguage" => record.macrolanguage = Some(field.value.clone()),
            "scope" => record.scope = Some(field.value.clone()),
            _ => {}
        }
    }

    Ok(record)
}

/// Parse registry text into its header date and records.
pub fn parse_registry(text: &str) -> Result<ParsedRegistry, RegistryParseError> {
    let blocks = split_blocks(text)?;
    let mut blocks = blocks.into_iter();

    let file_date = match blocks.next() {
        Some(header) => find_field(&header, &["File-Date"])
            .map(parse_date)
            .transpose()?,
        None => None,
    };

    let records = blocks
        .filter(|block| !block.fields.is_empty())
        .map(|block| build_record(&block))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedRegistry { file_date, records })
}

impl RegistryIndex {
    /// Parse registry text and index it.
    pub fn from_registry_text(text: &str) -> Result<Self, RegistryParseError> {
        Ok(parse_registry(text)?.into_index())
    }

    /// Read, parse and index a registry file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryLoadError> {
        let path = path.as_ref();
        let text = read_bounded(path, DEFAULT_MAX_REGISTRY_SIZE)?;
        let index = Self::from_registry_text(&text).map_err(|source| RegistryLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            records = index.len(),
            file_date = ?index.file_date().map(|d| d.to_string()),
            "loaded language subtag registry"
        );
        Ok(index)
    }
}
