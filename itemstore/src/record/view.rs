// Decorators over records: they borrow the inner record and override only
// what they change.

use super::{Field, Record, VersionData};
use crate::filter::FieldFilter;
use uuid::Uuid;

/// Presents a record with excluded fields removed from the shared set and
/// from every version.
pub struct FilteredRecord<'a> {
    inner: &'a dyn Record,
    filter: &'a dyn FieldFilter,
}

impl<'a> FilteredRecord<'a> {
    pub fn new(inner: &'a dyn Record, filter: &'a dyn FieldFilter) -> Self {
        FilteredRecord { inner, filter }
    }
}

impl Record for FilteredRecord<'_> {
    fn id(&self) -> Uuid {
        self.inner.id()
    }

    fn database_name(&self) -> &str {
        self.inner.database_name()
    }

    fn parent_id(&self) -> Uuid {
        self.inner.parent_id()
    }

    fn path(&self) -> &str {
        self.inner.path()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn branch_id(&self) -> Option<Uuid> {
        self.inner.branch_id()
    }

    fn template_id(&self) -> Uuid {
        self.inner.template_id()
    }

    fn shared_fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        let filter = self.filter;
        Box::new(self.inner.shared_fields().filter(move |f| filter.includes(f.id)))
    }

    fn versions(&self) -> Box<dyn Iterator<Item = Box<dyn VersionData + '_>> + '_> {
        let filter = self.filter;
        Box::new(self.inner.versions().map(move |inner| {
            Box::new(FilteredVersion { inner, filter }) as Box<dyn VersionData + '_>
        }))
    }

    fn serialized_item_id(&self) -> &str {
        self.inner.serialized_item_id()
    }
}

/// A version with excluded fields removed.
pub struct FilteredVersion<'a> {
    inner: Box<dyn VersionData + 'a>,
    filter: &'a dyn FieldFilter,
}

impl VersionData for FilteredVersion<'_> {
    fn language(&self) -> &str {
        self.inner.language()
    }

    fn version_number(&self) -> u32 {
        self.inner.version_number()
    }

    fn fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        let filter = self.filter;
        Box::new(self.inner.fields().filter(move |f| filter.includes(f.id)))
    }
}

/// Presents a record as if it lived under a different parent.
pub struct RebasedRecord<'a> {
    inner: &'a dyn Record,
    parent_id: Uuid,
    path: String,
}

impl<'a> RebasedRecord<'a> {
    pub fn new(inner: &'a dyn Record, new_parent_id: Uuid, new_parent_path: &str) -> Self {
        let path = format!("{}/{}", new_parent_path.trim_end_matches('/'), inner.name());
        RebasedRecord {
            inner,
            parent_id: new_parent_id,
            path,
        }
    }
}

impl Record for RebasedRecord<'_> {
    fn id(&self) -> Uuid {
        self.inner.id()
    }

    fn database_name(&self) -> &str {
        self.inner.database_name()
    }

    fn parent_id(&self) -> Uuid {
        self.parent_id
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn branch_id(&self) -> Option<Uuid> {
        self.inner.branch_id()
    }

    fn template_id(&self) -> Uuid {
        self.inner.template_id()
    }

    fn shared_fields(&self) -> Box<dyn Iterator<Item = &Field> + '_> {
        self.inner.shared_fields()
    }

    fn versions(&self) -> Box<dyn Iterator<Item = Box<dyn VersionData + '_>> + '_> {
        self.inner.versions()
    }

    fn serialized_item_id(&self) -> &str {
        self.inner.serialized_item_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ConfigurationFieldFilter;
    use crate::record::{ItemRecord, Version};

    fn sample_record() -> ItemRecord {
        let mut record = ItemRecord::new(Uuid::from_u128(10), "master", "home");
        record.path = "/sitecore/content/home".into();
        record.parent_id = Uuid::from_u128(11);
        record.shared_fields = vec![
            Field::new(Uuid::from_u128(1), "kept"),
            Field::new(Uuid::from_u128(2), "dropped"),
        ];
        record.versions = vec![Version::new("en", 1)
            .with_field(Field::new(Uuid::from_u128(2), "dropped"))
            .with_field(Field::new(Uuid::from_u128(3), "title"))];
        record
    }

    #[test]
    fn test_filtered_record_hides_excluded_fields() {
        let record = sample_record();
        let filter = ConfigurationFieldFilter::new([Uuid::from_u128(2)]);
        let view = FilteredRecord::new(&record, &filter);

        let shared: Vec<_> = view.shared_fields().map(|f| f.value.as_str()).collect();
        assert_eq!(shared, vec!["kept"]);

        let versions: Vec<_> = view.versions().collect();
        assert_eq!(versions.len(), 1);
        let fields: Vec<_> = versions[0].fields().map(|f| f.value.as_str()).collect();
        assert_eq!(fields, vec!["title"]);
    }

    #[test]
    fn test_filtered_record_passes_metadata_through() {
        let record = sample_record();
        let filter = ConfigurationFieldFilter::default();
        let view = FilteredRecord::new(&record, &filter);

        assert_eq!(view.id(), record.id);
        assert_eq!(view.path(), "/sitecore/content/home");
        assert_eq!(view.parent_id(), Uuid::from_u128(11));
        assert_eq!(view.shared_fields().count(), 2);
    }

    #[test]
    fn test_rebased_record() {
        let record = sample_record();
        let rebased = RebasedRecord::new(&record, Uuid::from_u128(99), "/sitecore/archive/");

        assert_eq!(rebased.path(), "/sitecore/archive/home");
        assert_eq!(rebased.parent_id(), Uuid::from_u128(99));
        assert_eq!(rebased.id(), record.id);
        assert_eq!(rebased.versions().count(), 1);
    }
}
