//! Read-only view of a termbase's schema
//!
//! Thin pass-through over the record store; reflects the store at call
//! time, no caching. Consumers re-fetch after a schema change
//! notification.

use std::sync::Arc;

use crate::domain::records::{
    InputDescriptor, Language, LanguageId, Property, PropertyId, TermbaseId,
};
use crate::domain::repository::{RecordStore, SchemaRepository, ValueRepository};
use crate::CoreError;

/// Resolves property definitions, input descriptors, and languages
#[derive(Clone)]
pub struct SchemaCatalog {
    store: Arc<dyn RecordStore>,
}

impl SchemaCatalog {
    /// Create a catalog over the given store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Property definitions of a termbase
    pub async fn properties_of(&self, termbase: TermbaseId) -> Result<Vec<Property>, CoreError> {
        self.store.properties_of(termbase).await
    }

    /// Input descriptors of a termbase
    pub async fn input_descriptors_of(
        &self,
        termbase: TermbaseId,
    ) -> Result<Vec<InputDescriptor>, CoreError> {
        self.store.descriptors_of(termbase).await
    }

    /// Languages of a termbase
    pub async fn languages_of(&self, termbase: TermbaseId) -> Result<Vec<Language>, CoreError> {
        self.store.languages_of(termbase).await
    }

    /// Resolve one property; `None` for orphaned references
    pub async fn property(&self, id: PropertyId) -> Result<Option<Property>, CoreError> {
        self.store.find_property(id).await
    }

    /// Resolve one language
    pub async fn language(&self, id: LanguageId) -> Result<Option<Language>, CoreError> {
        self.store.find_language(id).await
    }

    /// Whether any value row references the property
    ///
    /// Editors use this to refuse level or kind changes once a property
    /// carries data; the behavior of existing values after such a change
    /// is unsupported.
    pub async fn property_in_use(&self, id: PropertyId) -> Result<bool, CoreError> {
        Ok(!self.store.entry_values_for_property(id).await?.is_empty()
            || !self
                .store
                .language_values_for_property(id)
                .await?
                .is_empty()
            || !self.store.term_values_for_property(id).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{
        Entry, PropertyKind, PropertyLevel, Term, TermValue, Termbase, ValueId,
    };
    use crate::domain::repository::memory::MemoryRecordStore;
    use crate::domain::repository::RecordRepository;

    #[tokio::test]
    async fn test_property_in_use_tracks_value_rows() {
        let store = Arc::new(MemoryRecordStore::new());
        let termbase = store
            .create_termbase(&Termbase::new("tb", ""))
            .await
            .unwrap();
        let note = store
            .create_property(&Property::new(
                termbase,
                "note",
                PropertyLevel::Term,
                PropertyKind::Text,
            ))
            .await
            .unwrap();
        let catalog = SchemaCatalog::new(store.clone());

        assert!(!catalog.property_in_use(note).await.unwrap());

        let entry = store.create_entry(&Entry::new(termbase)).await.unwrap();
        let term = store
            .create_term(&Term::new(entry, "en", "heart"))
            .await
            .unwrap();
        store
            .create_term_value(&TermValue {
                id: ValueId::UNSAVED,
                term_id: term,
                property_id: note,
                value: "organ".to_string(),
            })
            .await
            .unwrap();

        assert!(catalog.property_in_use(note).await.unwrap());
    }
}
