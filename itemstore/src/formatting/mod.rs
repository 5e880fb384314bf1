// Field formatters - per-type text transforms applied when values are written
// to storage (`format`) and reversed when they are read back (`unformat`).

mod checkbox;
mod multilist;
mod xml;

pub use checkbox::CheckboxFormatter;
pub use multilist::MultilistFormatter;
pub use xml::XmlFormatter;

use crate::record::Field;

/// A reversible transform for one family of field types.
pub trait FieldFormatter: Send + Sync {
    fn can_format(&self, field: &Field) -> bool;

    /// Convert the stored value into its on-disk text.
    fn format(&self, field: &Field) -> String;

    /// Convert on-disk text back into the stored value. `None` means the
    /// field has no value, which is different from an empty value.
    fn unformat(&self, value: &str) -> Option<String>;
}

/// Ordered list of formatters; the first one that accepts a field handles it.
pub struct FormatterChain {
    formatters: Vec<Box<dyn FieldFormatter>>,
}

impl FormatterChain {
    pub fn new(formatters: Vec<Box<dyn FieldFormatter>>) -> Self {
        FormatterChain { formatters }
    }

    pub fn empty() -> Self {
        FormatterChain::new(Vec::new())
    }

    pub fn find(&self, field: &Field) -> Option<&dyn FieldFormatter> {
        self.formatters
            .iter()
            .find(|f| f.can_format(field))
            .map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl Default for FormatterChain {
    fn default() -> Self {
        FormatterChain::new(vec![
            Box::new(MultilistFormatter),
            Box::new(XmlFormatter),
            Box::new(CheckboxFormatter),
        ])
    }
}

/// Whether the field's type is one of `names`, ignoring ASCII case.
fn type_is_one_of(field: &Field, names: &[&str]) -> bool {
    match field.field_type.as_deref() {
        Some(t) => names.iter().any(|n| n.eq_ignore_ascii_case(t)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_default_chain_picks_by_type() {
        let chain = FormatterChain::default();
        assert_eq!(chain.len(), 3);

        let checkbox = Field::new(Uuid::nil(), "true").with_type("CHECKBOX");
        let formatter = chain.find(&checkbox).unwrap();
        assert_eq!(formatter.format(&checkbox), "1");

        let layout = Field::new(Uuid::nil(), "<r/>").with_type("Layout");
        assert!(chain.find(&layout).is_some());
    }

    #[test]
    fn test_untyped_field_has_no_formatter() {
        let chain = FormatterChain::default();
        assert!(chain.find(&Field::new(Uuid::nil(), "1")).is_none());
        let text = Field::new(Uuid::nil(), "1").with_type("Single-Line Text");
        assert!(chain.find(&text).is_none());
    }

    #[test]
    fn test_empty_chain() {
        let chain = FormatterChain::empty();
        assert!(chain.is_empty());
        let checkbox = Field::new(Uuid::nil(), "1").with_type("Checkbox");
        assert!(chain.find(&checkbox).is_none());
    }
}
