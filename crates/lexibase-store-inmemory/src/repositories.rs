//! DashMap-backed implementation of the record store contract

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use lexibase_core::{
    CoreError, DescriptorId, Entry, EntryId, EntryValue, InputDescriptor, Language, LanguageId,
    LanguageValue, Property, PropertyId, RecordRepository, SchemaRepository, Term, TermId,
    TermValue, Termbase, TermbaseId, ValueId, ValueRepository,
};

/// Concurrent in-memory record store
///
/// One id allocator spans every row kind, so ids are unique across tables
/// and monotonic in creation order; list reads come back sorted by id.
pub struct InMemoryRecordStore {
    next_id: AtomicI64,
    termbases: DashMap<i64, Termbase>,
    languages: DashMap<i64, Language>,
    properties: DashMap<i64, Property>,
    descriptors: DashMap<i64, InputDescriptor>,
    entries: DashMap<i64, Entry>,
    terms: DashMap<i64, Term>,
    entry_values: DashMap<i64, EntryValue>,
    language_values: DashMap<i64, LanguageValue>,
    term_values: DashMap<i64, TermValue>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(0),
            termbases: DashMap::with_capacity(4),
            languages: DashMap::with_capacity(8),
            properties: DashMap::with_capacity(16),
            descriptors: DashMap::with_capacity(16),
            entries: DashMap::with_capacity(64),
            terms: DashMap::with_capacity(128),
            entry_values: DashMap::with_capacity(64),
            language_values: DashMap::with_capacity(64),
            term_values: DashMap::with_capacity(128),
        }
    }

    fn alloc(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn sorted<R: Clone>(table: &DashMap<i64, R>, keep: impl Fn(&R) -> bool) -> Vec<R> {
        let mut rows: Vec<(i64, R)> = table
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    fn remove_entry_cascade(&self, id: i64) {
        let term_ids: Vec<i64> = self
            .terms
            .iter()
            .filter(|t| t.entry_id.0 == id)
            .map(|t| t.id.0)
            .collect();
        self.term_values
            .retain(|_, v| !term_ids.contains(&v.term_id.0));
        self.terms.retain(|_, t| t.entry_id.0 != id);
        self.entry_values.retain(|_, v| v.entry_id.0 != id);
        self.language_values.retain(|_, v| v.entry_id.0 != id);
        self.entries.remove(&id);
        debug!(entry = id, terms = term_ids.len(), "entry removed with cascade");
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaRepository for InMemoryRecordStore {
    async fn create_termbase(&self, row: &Termbase) -> Result<TermbaseId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = TermbaseId(id);
        self.termbases.insert(id, stored);
        debug!(termbase = id, "termbase created");
        Ok(TermbaseId(id))
    }

    async fn update_termbase(&self, row: &Termbase) -> Result<(), CoreError> {
        if self.termbases.contains_key(&row.id.0) {
            self.termbases.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_termbase(&self, id: TermbaseId) -> Result<(), CoreError> {
        let entry_ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.termbase_id == id)
            .map(|e| e.id.0)
            .collect();
        for entry_id in entry_ids {
            self.remove_entry_cascade(entry_id);
        }
        self.languages.retain(|_, l| l.termbase_id != id);
        self.properties.retain(|_, p| p.termbase_id != id);
        self.descriptors.retain(|_, d| d.termbase_id != id);
        self.termbases.remove(&id.0);
        debug!(termbase = id.0, "termbase removed with cascade");
        Ok(())
    }

    async fn find_termbase(&self, id: TermbaseId) -> Result<Option<Termbase>, CoreError> {
        Ok(self.termbases.get(&id.0).map(|r| r.clone()))
    }

    async fn list_termbases(&self) -> Result<Vec<Termbase>, CoreError> {
        Ok(Self::sorted(&self.termbases, |_| true))
    }

    async fn create_language(&self, row: &Language) -> Result<LanguageId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = LanguageId(id);
        self.languages.insert(id, stored);
        debug!(language = id, code = %row.code, "language created");
        Ok(LanguageId(id))
    }

    async fn update_language(&self, row: &Language) -> Result<(), CoreError> {
        if self.languages.contains_key(&row.id.0) {
            self.languages.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_language(&self, id: LanguageId) -> Result<(), CoreError> {
        let language = match self.languages.get(&id.0).map(|l| l.clone()) {
            Some(language) => language,
            None => return Ok(()),
        };

        self.language_values.retain(|_, v| v.language_id != id);

        let entry_ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.termbase_id == language.termbase_id)
            .map(|e| e.id.0)
            .collect();
        let doomed_terms: Vec<i64> = self
            .terms
            .iter()
            .filter(|t| entry_ids.contains(&t.entry_id.0) && t.lang == language.code)
            .map(|t| t.id.0)
            .collect();
        self.term_values
            .retain(|_, v| !doomed_terms.contains(&v.term_id.0));
        self.terms.retain(|_, t| !doomed_terms.contains(&t.id.0));

        // An entry with no terms left in any language is not a valid
        // standalone object.
        for entry_id in entry_ids {
            let has_terms = self.terms.iter().any(|t| t.entry_id.0 == entry_id);
            if !has_terms {
                self.remove_entry_cascade(entry_id);
            }
        }

        self.languages.remove(&id.0);
        debug!(
            language = id.0,
            code = %language.code,
            terms = doomed_terms.len(),
            "language removed with cascade"
        );
        Ok(())
    }

    async fn find_language(&self, id: LanguageId) -> Result<Option<Language>, CoreError> {
        Ok(self.languages.get(&id.0).map(|r| r.clone()))
    }

    async fn languages_of(&self, termbase: TermbaseId) -> Result<Vec<Language>, CoreError> {
        Ok(Self::sorted(&self.languages, |l| l.termbase_id == termbase))
    }

    async fn create_property(&self, row: &Property) -> Result<PropertyId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = PropertyId(id);
        self.properties.insert(id, stored);
        debug!(property = id, name = %row.name, "property created");
        Ok(PropertyId(id))
    }

    async fn update_property(&self, row: &Property) -> Result<(), CoreError> {
        if self.properties.contains_key(&row.id.0) {
            self.properties.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_property(&self, id: PropertyId) -> Result<(), CoreError> {
        // Values referencing the property stay and render as orphaned.
        self.properties.remove(&id.0);
        Ok(())
    }

    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, CoreError> {
        Ok(self.properties.get(&id.0).map(|r| r.clone()))
    }

    async fn properties_of(&self, termbase: TermbaseId) -> Result<Vec<Property>, CoreError> {
        Ok(Self::sorted(&self.properties, |p| p.termbase_id == termbase))
    }

    async fn create_descriptor(&self, row: &InputDescriptor) -> Result<DescriptorId, CoreError> {
        if let Some(existing) = self
            .descriptors
            .iter()
            .find(|d| d.termbase_id == row.termbase_id && d.target == row.target)
        {
            return Ok(existing.id);
        }
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = DescriptorId(id);
        self.descriptors.insert(id, stored);
        Ok(DescriptorId(id))
    }

    async fn delete_descriptor(&self, id: DescriptorId) -> Result<(), CoreError> {
        self.descriptors.remove(&id.0);
        Ok(())
    }

    async fn descriptors_of(
        &self,
        termbase: TermbaseId,
    ) -> Result<Vec<InputDescriptor>, CoreError> {
        Ok(Self::sorted(&self.descriptors, |d| {
            d.termbase_id == termbase
        }))
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordStore {
    async fn create_entry(&self, row: &Entry) -> Result<EntryId, CoreError> {
        if row.id.is_persisted() && self.entries.contains_key(&row.id.0) {
            return Ok(row.id);
        }
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = EntryId(id);
        self.entries.insert(id, stored);
        debug!(entry = id, "entry created");
        Ok(EntryId(id))
    }

    async fn update_entry(&self, row: &Entry) -> Result<(), CoreError> {
        if self.entries.contains_key(&row.id.0) {
            self.entries.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), CoreError> {
        self.remove_entry_cascade(id.0);
        Ok(())
    }

    async fn find_entry(&self, id: EntryId) -> Result<Option<Entry>, CoreError> {
        Ok(self.entries.get(&id.0).map(|r| r.clone()))
    }

    async fn entries_of(&self, termbase: TermbaseId) -> Result<Vec<Entry>, CoreError> {
        Ok(Self::sorted(&self.entries, |e| e.termbase_id == termbase))
    }

    async fn create_term(&self, row: &Term) -> Result<TermId, CoreError> {
        if let Some(existing) = self.terms.iter().find(|t| {
            t.entry_id == row.entry_id && t.lang == row.lang && t.lemma == row.lemma
        }) {
            return Ok(existing.id);
        }
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = TermId(id);
        self.terms.insert(id, stored);
        debug!(term = id, lang = %row.lang, "term created");
        Ok(TermId(id))
    }

    async fn update_term(&self, row: &Term) -> Result<(), CoreError> {
        if self.terms.contains_key(&row.id.0) {
            self.terms.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_term(&self, id: TermId) -> Result<(), CoreError> {
        self.term_values.retain(|_, v| v.term_id != id);
        self.terms.remove(&id.0);
        debug!(term = id.0, "term removed with cascade");
        Ok(())
    }

    async fn find_term(&self, id: TermId) -> Result<Option<Term>, CoreError> {
        Ok(self.terms.get(&id.0).map(|r| r.clone()))
    }

    async fn terms_of_entry(&self, entry: EntryId) -> Result<Vec<Term>, CoreError> {
        Ok(Self::sorted(&self.terms, |t| t.entry_id == entry))
    }

    async fn terms_of_termbase(
        &self,
        termbase: TermbaseId,
        lang: Option<&str>,
    ) -> Result<Vec<Term>, CoreError> {
        let entry_ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|e| e.termbase_id == termbase)
            .map(|e| e.id.0)
            .collect();
        Ok(Self::sorted(&self.terms, |t| {
            entry_ids.contains(&t.entry_id.0) && lang.map(|code| t.lang == code).unwrap_or(true)
        }))
    }
}

#[async_trait]
impl ValueRepository for InMemoryRecordStore {
    async fn create_entry_value(&self, row: &EntryValue) -> Result<ValueId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = ValueId(id);
        self.entry_values.insert(id, stored);
        Ok(ValueId(id))
    }

    async fn update_entry_value(&self, row: &EntryValue) -> Result<(), CoreError> {
        if self.entry_values.contains_key(&row.id.0) {
            self.entry_values.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_entry_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.entry_values.remove(&id.0);
        Ok(())
    }

    async fn find_entry_value(&self, id: ValueId) -> Result<Option<EntryValue>, CoreError> {
        Ok(self.entry_values.get(&id.0).map(|r| r.clone()))
    }

    async fn entry_values_of(&self, entry: EntryId) -> Result<Vec<EntryValue>, CoreError> {
        Ok(Self::sorted(&self.entry_values, |v| v.entry_id == entry))
    }

    async fn entry_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<EntryValue>, CoreError> {
        Ok(Self::sorted(&self.entry_values, |v| {
            v.property_id == property
        }))
    }

    async fn create_language_value(&self, row: &LanguageValue) -> Result<ValueId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = ValueId(id);
        self.language_values.insert(id, stored);
        Ok(ValueId(id))
    }

    async fn update_language_value(&self, row: &LanguageValue) -> Result<(), CoreError> {
        if self.language_values.contains_key(&row.id.0) {
            self.language_values.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_language_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.language_values.remove(&id.0);
        Ok(())
    }

    async fn find_language_value(&self, id: ValueId) -> Result<Option<LanguageValue>, CoreError> {
        Ok(self.language_values.get(&id.0).map(|r| r.clone()))
    }

    async fn language_values_of(
        &self,
        entry: EntryId,
        language: LanguageId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        Ok(Self::sorted(&self.language_values, |v| {
            v.entry_id == entry && v.language_id == language
        }))
    }

    async fn language_values_of_entry(
        &self,
        entry: EntryId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        Ok(Self::sorted(&self.language_values, |v| v.entry_id == entry))
    }

    async fn language_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<LanguageValue>, CoreError> {
        Ok(Self::sorted(&self.language_values, |v| {
            v.property_id == property
        }))
    }

    async fn create_term_value(&self, row: &TermValue) -> Result<ValueId, CoreError> {
        let id = self.alloc();
        let mut stored = row.clone();
        stored.id = ValueId(id);
        self.term_values.insert(id, stored);
        Ok(ValueId(id))
    }

    async fn update_term_value(&self, row: &TermValue) -> Result<(), CoreError> {
        if self.term_values.contains_key(&row.id.0) {
            self.term_values.insert(row.id.0, row.clone());
        }
        Ok(())
    }

    async fn delete_term_value(&self, id: ValueId) -> Result<(), CoreError> {
        self.term_values.remove(&id.0);
        Ok(())
    }

    async fn find_term_value(&self, id: ValueId) -> Result<Option<TermValue>, CoreError> {
        Ok(self.term_values.get(&id.0).map(|r| r.clone()))
    }

    async fn term_values_of(&self, term: TermId) -> Result<Vec<TermValue>, CoreError> {
        Ok(Self::sorted(&self.term_values, |v| v.term_id == term))
    }

    async fn term_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<TermValue>, CoreError> {
        Ok(Self::sorted(&self.term_values, |v| v.property_id == property))
    }
}
