//! Shared test doubles for the Lexibase integration suite

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use lexibase_core::{
    CoreError, DescriptorId, Entry, EntryId, EntryValue, InputDescriptor, Language, LanguageId,
    LanguageValue, Property, PropertyId, RecordRepository, RecordStore, SchemaRepository, Term,
    TermId, TermValue, Termbase, TermbaseId, ValueId, ValueRepository,
};

/// Record store wrapper that injects delete failures on demand
///
/// Everything delegates to the wrapped store; when armed, every `delete_*`
/// call fails before reaching it. Used to verify that a failed commit
/// keeps the edit session's pending-deletion queues for the next save.
pub struct FailingStore {
    inner: Arc<dyn RecordStore>,
    fail_deletes: AtomicBool,
}

impl FailingStore {
    /// Wrap a store; failures start disarmed
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Arm or disarm delete failures
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn check_delete(&self) -> Result<(), CoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            Err(CoreError::StoreError("injected delete failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SchemaRepository for FailingStore {
    async fn create_termbase(&self, row: &Termbase) -> Result<TermbaseId, CoreError> {
        self.inner.create_termbase(row).await
    }

    async fn update_termbase(&self, row: &Termbase) -> Result<(), CoreError> {
        self.inner.update_termbase(row).await
    }

    async fn delete_termbase(&self, id: TermbaseId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_termbase(id).await
    }

    async fn find_termbase(&self, id: TermbaseId) -> Result<Option<Termbase>, CoreError> {
        self.inner.find_termbase(id).await
    }

    async fn list_termbases(&self) -> Result<Vec<Termbase>, CoreError> {
        self.inner.list_termbases().await
    }

    async fn create_language(&self, row: &Language) -> Result<LanguageId, CoreError> {
        self.inner.create_language(row).await
    }

    async fn update_language(&self, row: &Language) -> Result<(), CoreError> {
        self.inner.update_language(row).await
    }

    async fn delete_language(&self, id: LanguageId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_language(id).await
    }

    async fn find_language(&self, id: LanguageId) -> Result<Option<Language>, CoreError> {
        self.inner.find_language(id).await
    }

    async fn languages_of(&self, termbase: TermbaseId) -> Result<Vec<Language>, CoreError> {
        self.inner.languages_of(termbase).await
    }

    async fn create_property(&self, row: &Property) -> Result<PropertyId, CoreError> {
        self.inner.create_property(row).await
    }

    async fn update_property(&self, row: &Property) -> Result<(), CoreError> {
        self.inner.update_property(row).await
    }

    async fn delete_property(&self, id: PropertyId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_property(id).await
    }

    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, CoreError> {
        self.inner.find_property(id).await
    }

    async fn properties_of(&self, termbase: TermbaseId) -> Result<Vec<Property>, CoreError> {
        self.inner.properties_of(termbase).await
    }

    async fn create_descriptor(&self, row: &InputDescriptor) -> Result<DescriptorId, CoreError> {
        self.inner.create_descriptor(row).await
    }

    async fn delete_descriptor(&self, id: DescriptorId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_descriptor(id).await
    }

    async fn descriptors_of(
        &self,
        termbase: TermbaseId,
    ) -> Result<Vec<InputDescriptor>, CoreError> {
        self.inner.descriptors_of(termbase).await
    }
}

#[async_trait]
impl RecordRepository for FailingStore {
    async fn create_entry(&self, row: &Entry) -> Result<EntryId, CoreError> {
        self.inner.create_entry(row).await
    }

    async fn update_entry(&self, row: &Entry) -> Result<(), CoreError> {
        self.inner.update_entry(row).await
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_entry(id).await
    }

    async fn find_entry(&self, id: EntryId) -> Result<Option<Entry>, CoreError> {
        self.inner.find_entry(id).await
    }

    async fn entries_of(&self, termbase: TermbaseId) -> Result<Vec<Entry>, CoreError> {
        self.inner.entries_of(termbase).await
    }

    async fn create_term(&self, row: &Term) -> Result<TermId, CoreError> {
        self.inner.create_term(row).await
    }

    async fn update_term(&self, row: &Term) -> Result<(), CoreError> {
        self.inner.update_term(row).await
    }

    async fn delete_term(&self, id: TermId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_term(id).await
    }

    async fn find_term(&self, id: TermId) -> Result<Option<Term>, CoreError> {
        self.inner.find_term(id).await
    }

    async fn terms_of_entry(&self, entry: EntryId) -> Result<Vec<Term>, CoreError> {
        self.inner.terms_of_entry(entry).await
    }

    async fn terms_of_termbase(
        &self,
        termbase: TermbaseId,
        lang: Option<&str>,
    ) -> Result<Vec<Term>, CoreError> {
        self.inner.terms_of_termbase(termbase, lang).await
    }
}

#[async_trait]
impl ValueRepository for FailingStore {
    async fn create_entry_value(&self, row: &EntryValue) -> Result<ValueId, CoreError> {
        self.inner.create_entry_value(row).await
    }

    async fn update_entry_value(&self, row: &EntryValue) -> Result<(), CoreError> {
        self.inner.update_entry_value(row).await
    }

    async fn delete_entry_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_entry_value(id).await
    }

    async fn find_entry_value(&self, id: ValueId) -> Result<Option<EntryValue>, CoreError> {
        self.inner.find_entry_value(id).await
    }

    async fn entry_values_of(&self, entry: EntryId) -> Result<Vec<EntryValue>, CoreError> {
        self.inner.entry_values_of(entry).await
    }

    async fn entry_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<EntryValue>, CoreError> {
        self.inner.entry_values_for_property(property).await
    }

    async fn create_language_value(&self, row: &LanguageValue) -> Result<ValueId, CoreError> {
        self.inner.create_language_value(row).await
    }

    async fn update_language_value(&self, row: &LanguageValue) -> Result<(), CoreError> {
        self.inner.update_language_value(row).await
    }

    async fn delete_language_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_language_value(id).await
    }

    async fn find_language_value(&self, id: ValueId) -> Result<Option<LanguageValue>, CoreError> {
        self.inner.find_language_value(id).await
    }

    async fn language_values_of(
        &self,
        entry: EntryId,
        language: LanguageId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        self.inner.language_values_of(entry, language).await
    }

    async fn language_values_of_entry(
        &self,
        entry: EntryId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        self.inner.language_values_of_entry(entry).await
    }

    async fn language_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        self.inner.language_values_for_property(property).await
    }

    async fn create_term_value(&self, row: &TermValue) -> Result<ValueId, CoreError> {
        self.inner.create_term_value(row).await
    }

    async fn update_term_value(&self, row: &TermValue) -> Result<(), CoreError> {
        self.inner.update_term_value(row).await
    }

    async fn delete_term_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.check_delete()?;
        self.inner.delete_term_value(id).await
    }

    async fn find_term_value(&self, id: ValueId) -> Result<Option<TermValue>, CoreError> {
        self.inner.find_term_value(id).await
    }

    async fn term_values_of(&self, term: TermId) -> Result<Vec<TermValue>, CoreError> {
        self.inner.term_values_of(term).await
    }

    async fn term_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<TermValue>, CoreError> {
        self.inner.term_values_for_property(property).await
    }
}
