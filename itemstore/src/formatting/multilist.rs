use super::{type_is_one_of, FieldFormatter};
use crate::record::Field;
use uuid::Uuid;

const SUPPORTED_TYPES: &[&str] = &[
    "Checklist",
    "Multilist",
    "Multilist with Search",
    "Treelist",
    "Treelist with Search",
    "TreelistEx",
    "tree list",
];

/// Writes `{A}|{B}|{C}` reference lists one id per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultilistFormatter;

impl FieldFormatter for MultilistFormatter {
    fn can_format(&self, field: &Field) -> bool {
        type_is_one_of(field, SUPPORTED_TYPES)
    }

    fn format(&self, field: &Field) -> String {
        // Empty segments cannot survive the line form, so those lists are kept verbatim
        let ids: Vec<&str> = field.value.split('|').collect();
        if !ids.iter().all(|s| is_id(s)) {
            return field.value.clone();
        }
        ids.join("\n")
    }

    fn unformat(&self, value: &str) -> Option<String> {
        let lines: Vec<&str> = value
            .trim()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() || !lines.iter().all(|l| is_id(l)) {
            return Some(value.to_string());
        }
        Some(lines.join("|"))
    }
}

fn is_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
