use super::{type_is_one_of, FieldFormatter};
use crate::record::Field;

/// Normalizes checkbox values to `1` / `0` on disk. An unchecked box is
/// stored as the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxFormatter;

impl FieldFormatter for CheckboxFormatter {
    fn can_format(&self, field: &Field) -> bool {
        type_is_one_of(field, &["Checkbox"])
    }

    fn format(&self, field: &Field) -> String {
        if field.value == "1" || field.value.eq_ignore_ascii_case("true") {
            "1".to_string()
        } else {
            "0".to_string()
        }
    }

    fn unformat(&self, value: &str) -> Option<String> {
        if value == "0" {
            Some(String::new())
        } else {
            Some(value.to_string())
        }
    }
}
