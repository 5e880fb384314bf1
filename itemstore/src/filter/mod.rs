use std::collections::BTreeSet;
use uuid::Uuid;

/// Decides whether a field takes part in serialization.
pub trait FieldFilter: Send + Sync {
    fn includes(&self, field_id: Uuid) -> bool;
}

/// Includes every field except the ones explicitly excluded in configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationFieldFilter {
    excluded: BTreeSet<Uuid>,
}

impl ConfigurationFieldFilter {
    pub fn new<I: IntoIterator<Item = Uuid>>(excluded: I) -> Self {
        ConfigurationFieldFilter {
            excluded: excluded.into_iter().collect(),
        }
    }

    /// The full exclusion set, in id order.
    pub fn excluded_fields(&self) -> impl Iterator<Item = &Uuid> + '_ {
        self.excluded.iter()
    }
}

impl FieldFilter for ConfigurationFieldFilter {
    fn includes(&self, field_id: Uuid) -> bool {
        !self.excluded.contains(&field_id)
    }
}

/// A filter that lets everything through.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl FieldFilter for IncludeAll {
    fn includes(&self, _field_id: Uuid) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_field_is_filtered() {
        let revision = Uuid::from_u128(0x8cdc337e);
        let filter = ConfigurationFieldFilter::new([revision]);

        assert!(!filter.includes(revision));
        assert!(filter.includes(Uuid::from_u128(1)));
    }

    #[test]
    fn test_excluded_fields_listed_in_order() {
        let filter =
            ConfigurationFieldFilter::new([Uuid::from_u128(3), Uuid::from_u128(1), Uuid::from_u128(3)]);
        let listed: Vec<_> = filter.excluded_fields().copied().collect();
        assert_eq!(listed, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
    }

    #[test]
    fn test_include_all() {
        assert!(IncludeAll.includes(Uuid::nil()));
    }
}
