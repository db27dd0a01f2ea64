//! Repository traits for the record store
//!
//! This module defines the persistence contract the engines operate
//! against. External crates implement these traits to provide different
//! storage mechanisms; ids are always store-assigned.
//!
//! Semantics shared by every implementation:
//! - `find_*` returns `Ok(None)` for a missing id, never an error.
//! - `delete_*` and `update_*` on a missing id are no-ops.
//! - Creating an entry, term, or input descriptor whose natural key already
//!   exists is a no-op returning the existing id.
//! - Deleting a termbase, entry, or term cascades to everything beneath it;
//!   deleting a language additionally removes entries left without any
//!   terms. Deleting a property never touches its values.

use async_trait::async_trait;

use super::records::{
    DescriptorId, Entry, EntryId, EntryValue, InputDescriptor, Language, LanguageId,
    LanguageValue, Property, PropertyId, Term, TermId, TermValue, Termbase, TermbaseId, ValueId,
};
use crate::CoreError;

/// Store operations for termbases, languages, properties, and descriptors
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Persist a new termbase, returning its id
    async fn create_termbase(&self, row: &Termbase) -> Result<TermbaseId, CoreError>;

    /// Update a termbase by id
    async fn update_termbase(&self, row: &Termbase) -> Result<(), CoreError>;

    /// Delete a termbase and everything it owns
    async fn delete_termbase(&self, id: TermbaseId) -> Result<(), CoreError>;

    /// Find a termbase by id
    async fn find_termbase(&self, id: TermbaseId) -> Result<Option<Termbase>, CoreError>;

    /// All termbases
    async fn list_termbases(&self) -> Result<Vec<Termbase>, CoreError>;

    /// Persist a new language, returning its id
    async fn create_language(&self, row: &Language) -> Result<LanguageId, CoreError>;

    /// Update a language by id
    async fn update_language(&self, row: &Language) -> Result<(), CoreError>;

    /// Delete a language, its terms, the values attached to those terms,
    /// and any entry left without terms afterwards
    async fn delete_language(&self, id: LanguageId) -> Result<(), CoreError>;

    /// Find a language by id
    async fn find_language(&self, id: LanguageId) -> Result<Option<Language>, CoreError>;

    /// Languages of a termbase
    async fn languages_of(&self, termbase: TermbaseId) -> Result<Vec<Language>, CoreError>;

    /// Persist a new property definition, returning its id
    async fn create_property(&self, row: &Property) -> Result<PropertyId, CoreError>;

    /// Update a property by id
    async fn update_property(&self, row: &Property) -> Result<(), CoreError>;

    /// Delete a property definition; existing values referencing it are
    /// left in place and render as orphaned
    async fn delete_property(&self, id: PropertyId) -> Result<(), CoreError>;

    /// Find a property by id
    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, CoreError>;

    /// Properties of a termbase
    async fn properties_of(&self, termbase: TermbaseId) -> Result<Vec<Property>, CoreError>;

    /// Persist a new input descriptor, returning its id
    async fn create_descriptor(&self, row: &InputDescriptor) -> Result<DescriptorId, CoreError>;

    /// Delete an input descriptor
    async fn delete_descriptor(&self, id: DescriptorId) -> Result<(), CoreError>;

    /// Input descriptors of a termbase
    async fn descriptors_of(&self, termbase: TermbaseId)
        -> Result<Vec<InputDescriptor>, CoreError>;
}

/// Store operations for entries and terms
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persist a new entry, returning its id
    async fn create_entry(&self, row: &Entry) -> Result<EntryId, CoreError>;

    /// Update an entry by id
    async fn update_entry(&self, row: &Entry) -> Result<(), CoreError>;

    /// Delete an entry, its terms, and all values beneath it
    async fn delete_entry(&self, id: EntryId) -> Result<(), CoreError>;

    /// Find an entry by id
    async fn find_entry(&self, id: EntryId) -> Result<Option<Entry>, CoreError>;

    /// Entries of a termbase
    async fn entries_of(&self, termbase: TermbaseId) -> Result<Vec<Entry>, CoreError>;

    /// Persist a new term, returning its id
    async fn create_term(&self, row: &Term) -> Result<TermId, CoreError>;

    /// Update a term by id
    async fn update_term(&self, row: &Term) -> Result<(), CoreError>;

    /// Delete a term and its term-scoped values
    async fn delete_term(&self, id: TermId) -> Result<(), CoreError>;

    /// Find a term by id
    async fn find_term(&self, id: TermId) -> Result<Option<Term>, CoreError>;

    /// Terms of an entry
    async fn terms_of_entry(&self, entry: EntryId) -> Result<Vec<Term>, CoreError>;

    /// Terms of a termbase, optionally restricted to one language code
    async fn terms_of_termbase(
        &self,
        termbase: TermbaseId,
        lang: Option<&str>,
    ) -> Result<Vec<Term>, CoreError>;
}

/// Store operations for the three property value kinds
#[async_trait]
pub trait ValueRepository: Send + Sync {
    /// Persist a new entry-scoped value, returning its id
    async fn create_entry_value(&self, row: &EntryValue) -> Result<ValueId, CoreError>;

    /// Update an entry-scoped value by id
    async fn update_entry_value(&self, row: &EntryValue) -> Result<(), CoreError>;

    /// Delete an entry-scoped value
    async fn delete_entry_value(&self, id: ValueId) -> Result<(), CoreError>;

    /// Find an entry-scoped value by id
    async fn find_entry_value(&self, id: ValueId) -> Result<Option<EntryValue>, CoreError>;

    /// Entry-scoped values of an entry
    async fn entry_values_of(&self, entry: EntryId) -> Result<Vec<EntryValue>, CoreError>;

    /// Entry-scoped values referencing a property, across all entries
    async fn entry_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<EntryValue>, CoreError>;

    /// Persist a new language-scoped value, returning its id
    async fn create_language_value(&self, row: &LanguageValue) -> Result<ValueId, CoreError>;

    /// Update a language-scoped value by id
    async fn update_language_value(&self, row: &LanguageValue) -> Result<(), CoreError>;

    /// Delete a language-scoped value
    async fn delete_language_value(&self, id: ValueId) -> Result<(), CoreError>;

    /// Find a language-scoped value by id
    async fn find_language_value(&self, id: ValueId) -> Result<Option<LanguageValue>, CoreError>;

    /// Language-scoped values of one (entry, language) pair
    async fn language_values_of(
        &self,
        entry: EntryId,
        language: LanguageId,
    ) -> Result<Vec<LanguageValue>, CoreError>;

    /// Language-scoped values of an entry across all languages
    async fn language_values_of_entry(
        &self,
        entry: EntryId,
    ) -> Result<Vec<LanguageValue>, CoreError>;

    /// Language-scoped values referencing a property, across all entries
    async fn language_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<LanguageValue>, CoreError>;

    /// Persist a new term-scoped value, returning its id
    async fn create_term_value(&self, row: &TermValue) -> Result<ValueId, CoreError>;

    /// Update a term-scoped value by id
    async fn update_term_value(&self, row: &TermValue) -> Result<(), CoreError>;

    /// Delete a term-scoped value
    async fn delete_term_value(&self, id: ValueId) -> Result<(), CoreError>;

    /// Find a term-scoped value by id
    async fn find_term_value(&self, id: ValueId) -> Result<Option<TermValue>, CoreError>;

    /// Term-scoped values of a term
    async fn term_values_of(&self, term: TermId) -> Result<Vec<TermValue>, CoreError>;

    /// Term-scoped values referencing a property, across all terms
    async fn term_values_for_property(
        &self,
        property: PropertyId,
    ) -> Result<Vec<TermValue>, CoreError>;
}

/// The full record store contract the engines depend on
pub trait RecordStore: SchemaRepository + RecordRepository + ValueRepository {}

impl<T: SchemaRepository + RecordRepository + ValueRepository> RecordStore for T {}

/// Memory implementation for testing
#[cfg(feature = "testing")]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::RwLock;

    macro_rules! read_table {
        ($table:expr) => {
            $table
                .read()
                .map_err(|e| CoreError::StoreError(format!("Failed to acquire read lock: {}", e)))?
        };
    }

    macro_rules! write_table {
        ($table:expr) => {
            $table
                .write()
                .map_err(|e| CoreError::StoreError(format!("Failed to acquire write lock: {}", e)))?
        };
    }

    /// In-memory record store backed by plain hash maps
    ///
    /// Implements the full contract including the cascade rules; intended
    /// for unit tests and examples.
    #[derive(Default)]
    pub struct MemoryRecordStore {
        next_id: AtomicI64,
        termbases: RwLock<HashMap<i64, Termbase>>,
        languages: RwLock<HashMap<i64, Language>>,
        properties: RwLock<HashMap<i64, Property>>,
        descriptors: RwLock<HashMap<i64, InputDescriptor>>,
        entries: RwLock<HashMap<i64, Entry>>,
        terms: RwLock<HashMap<i64, Term>>,
        entry_values: RwLock<HashMap<i64, EntryValue>>,
        language_values: RwLock<HashMap<i64, LanguageValue>>,
        term_values: RwLock<HashMap<i64, TermValue>>,
    }

    impl MemoryRecordStore {
        /// Create an empty store
        pub fn new() -> Self {
            Self::default()
        }

        fn alloc(&self) -> i64 {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn remove_entry_cascade(&self, id: i64) -> Result<(), CoreError> {
            let term_ids: Vec<i64> = read_table!(self.terms)
                .values()
                .filter(|t| t.entry_id.0 == id)
                .map(|t| t.id.0)
                .collect();
            write_table!(self.term_values).retain(|_, v| !term_ids.contains(&v.term_id.0));
            write_table!(self.terms).retain(|_, t| t.entry_id.0 != id);
            write_table!(self.entry_values).retain(|_, v| v.entry_id.0 != id);
            write_table!(self.language_values).retain(|_, v| v.entry_id.0 != id);
            write_table!(self.entries).remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl SchemaRepository for MemoryRecordStore {
        async fn create_termbase(&self, row: &Termbase) -> Result<TermbaseId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = TermbaseId(id);
            write_table!(self.termbases).insert(id, stored);
            Ok(TermbaseId(id))
        }

        async fn update_termbase(&self, row: &Termbase) -> Result<(), CoreError> {
            let mut termbases = write_table!(self.termbases);
            if termbases.contains_key(&row.id.0) {
                termbases.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_termbase(&self, id: TermbaseId) -> Result<(), CoreError> {
            let entry_ids: Vec<i64> = read_table!(self.entries)
                .values()
                .filter(|e| e.termbase_id == id)
                .map(|e| e.id.0)
                .collect();
            for entry_id in entry_ids {
                self.remove_entry_cascade(entry_id)?;
            }
            write_table!(self.languages).retain(|_, l| l.termbase_id != id);
            write_table!(self.properties).retain(|_, p| p.termbase_id != id);
            write_table!(self.descriptors).retain(|_, d| d.termbase_id != id);
            write_table!(self.termbases).remove(&id.0);
            Ok(())
        }

        async fn find_termbase(&self, id: TermbaseId) -> Result<Option<Termbase>, CoreError> {
            Ok(read_table!(self.termbases).get(&id.0).cloned())
        }

        async fn list_termbases(&self) -> Result<Vec<Termbase>, CoreError> {
            let mut rows: Vec<Termbase> = read_table!(self.termbases).values().cloned().collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_language(&self, row: &Language) -> Result<LanguageId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = LanguageId(id);
            write_table!(self.languages).insert(id, stored);
            Ok(LanguageId(id))
        }

        async fn update_language(&self, row: &Language) -> Result<(), CoreError> {
            let mut languages = write_table!(self.languages);
            if languages.contains_key(&row.id.0) {
                languages.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_language(&self, id: LanguageId) -> Result<(), CoreError> {
            let language = match read_table!(self.languages).get(&id.0).cloned() {
                Some(language) => language,
                None => return Ok(()),
            };

            write_table!(self.language_values).retain(|_, v| v.language_id != id);

            let entry_ids: Vec<i64> = read_table!(self.entries)
                .values()
                .filter(|e| e.termbase_id == language.termbase_id)
                .map(|e| e.id.0)
                .collect();
            let doomed_terms: Vec<i64> = read_table!(self.terms)
                .values()
                .filter(|t| entry_ids.contains(&t.entry_id.0) && t.lang == language.code)
                .map(|t| t.id.0)
                .collect();
            write_table!(self.term_values).retain(|_, v| !doomed_terms.contains(&v.term_id.0));
            write_table!(self.terms).retain(|_, t| !doomed_terms.contains(&t.id.0));

            // An entry with no terms left in any language is not a valid
            // standalone object.
            for entry_id in entry_ids {
                let has_terms = read_table!(self.terms).values().any(|t| t.entry_id.0 == entry_id);
                if !has_terms {
                    self.remove_entry_cascade(entry_id)?;
                }
            }

            write_table!(self.languages).remove(&id.0);
            Ok(())
        }

        async fn find_language(&self, id: LanguageId) -> Result<Option<Language>, CoreError> {
            Ok(read_table!(self.languages).get(&id.0).cloned())
        }

        async fn languages_of(&self, termbase: TermbaseId) -> Result<Vec<Language>, CoreError> {
            let mut rows: Vec<Language> = read_table!(self.languages)
                .values()
                .filter(|l| l.termbase_id == termbase)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_property(&self, row: &Property) -> Result<PropertyId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = PropertyId(id);
            write_table!(self.properties).insert(id, stored);
            Ok(PropertyId(id))
        }

        async fn update_property(&self, row: &Property) -> Result<(), CoreError> {
            let mut properties = write_table!(self.properties);
            if properties.contains_key(&row.id.0) {
                properties.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_property(&self, id: PropertyId) -> Result<(), CoreError> {
            write_table!(self.properties).remove(&id.0);
            Ok(())
        }

        async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, CoreError> {
            Ok(read_table!(self.properties).get(&id.0).cloned())
        }

        async fn properties_of(&self, termbase: TermbaseId) -> Result<Vec<Property>, CoreError> {
            let mut rows: Vec<Property> = read_table!(self.properties)
                .values()
                .filter(|p| p.termbase_id == termbase)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_descriptor(
            &self,
            row: &InputDescriptor,
        ) -> Result<DescriptorId, CoreError> {
            if let Some(existing) = read_table!(self.descriptors)
                .values()
                .find(|d| d.termbase_id == row.termbase_id && d.target == row.target)
            {
                return Ok(existing.id);
            }
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = DescriptorId(id);
            write_table!(self.descriptors).insert(id, stored);
            Ok(DescriptorId(id))
        }

        async fn delete_descriptor(&self, id: DescriptorId) -> Result<(), CoreError> {
            write_table!(self.descriptors).remove(&id.0);
            Ok(())
        }

        async fn descriptors_of(
            &self,
            termbase: TermbaseId,
        ) -> Result<Vec<InputDescriptor>, CoreError> {
            let mut rows: Vec<InputDescriptor> = read_table!(self.descriptors)
                .values()
                .filter(|d| d.termbase_id == termbase)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }
    }

    #[async_trait]
    impl RecordRepository for MemoryRecordStore {
        async fn create_entry(&self, row: &Entry) -> Result<EntryId, CoreError> {
            if row.id.is_persisted() && read_table!(self.entries).contains_key(&row.id.0) {
                return Ok(row.id);
            }
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = EntryId(id);
            write_table!(self.entries).insert(id, stored);
            Ok(EntryId(id))
        }

        async fn update_entry(&self, row: &Entry) -> Result<(), CoreError> {
            let mut entries = write_table!(self.entries);
            if entries.contains_key(&row.id.0) {
                entries.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_entry(&self, id: EntryId) -> Result<(), CoreError> {
            self.remove_entry_cascade(id.0)
        }

        async fn find_entry(&self, id: EntryId) -> Result<Option<Entry>, CoreError> {
            Ok(read_table!(self.entries).get(&id.0).cloned())
        }

        async fn entries_of(&self, termbase: TermbaseId) -> Result<Vec<Entry>, CoreError> {
            let mut rows: Vec<Entry> = read_table!(self.entries)
                .values()
                .filter(|e| e.termbase_id == termbase)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_term(&self, row: &Term) -> Result<TermId, CoreError> {
            if let Some(existing) = read_table!(self.terms).values().find(|t| {
                t.entry_id == row.entry_id && t.lang == row.lang && t.lemma == row.lemma
            }) {
                return Ok(existing.id);
            }
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = TermId(id);
            write_table!(self.terms).insert(id, stored);
            Ok(TermId(id))
        }

        async fn update_term(&self, row: &Term) -> Result<(), CoreError> {
            let mut terms = write_table!(self.terms);
            if terms.contains_key(&row.id.0) {
                terms.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_term(&self, id: TermId) -> Result<(), CoreError> {
            write_table!(self.term_values).retain(|_, v| v.term_id != id);
            write_table!(self.terms).remove(&id.0);
            Ok(())
        }

        async fn find_term(&self, id: TermId) -> Result<Option<Term>, CoreError> {
            Ok(read_table!(self.terms).get(&id.0).cloned())
        }

        async fn terms_of_entry(&self, entry: EntryId) -> Result<Vec<Term>, CoreError> {
            let mut rows: Vec<Term> = read_table!(self.terms)
                .values()
                .filter(|t| t.entry_id == entry)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn terms_of_termbase(
            &self,
            termbase: TermbaseId,
            lang: Option<&str>,
        ) -> Result<Vec<Term>, CoreError> {
            let entry_ids: Vec<i64> = read_table!(self.entries)
                .values()
                .filter(|e| e.termbase_id == termbase)
                .map(|e| e.id.0)
                .collect();
            let mut rows: Vec<Term> = read_table!(self.terms)
                .values()
                .filter(|t| {
                    entry_ids.contains(&t.entry_id.0)
                        && lang.map(|code| t.lang == code).unwrap_or(true)
                })
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }
    }

    #[async_trait]
    impl ValueRepository for MemoryRecordStore {
        async fn create_entry_value(&self, row: &EntryValue) -> Result<ValueId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = ValueId(id);
            write_table!(self.entry_values).insert(id, stored);
            Ok(ValueId(id))
        }

        async fn update_entry_value(&self, row: &EntryValue) -> Result<(), CoreError> {
            let mut values = write_table!(self.entry_values);
            if values.contains_key(&row.id.0) {
                values.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_entry_value(&self, id: ValueId) -> Result<(), CoreError> {
            write_table!(self.entry_values).remove(&id.0);
            Ok(())
        }

        async fn find_entry_value(&self, id: ValueId) -> Result<Option<EntryValue>, CoreError> {
            Ok(read_table!(self.entry_values).get(&id.0).cloned())
        }

        async fn entry_values_of(&self, entry: EntryId) -> Result<Vec<EntryValue>, CoreError> {
            let mut rows: Vec<EntryValue> = read_table!(self.entry_values)
                .values()
                .filter(|v| v.entry_id == entry)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn entry_values_for_property(
            &self,
            property: PropertyId,
        ) -> Result<Vec<EntryValue>, CoreError> {
            let mut rows: Vec<EntryValue> = read_table!(self.entry_values)
                .values()
                .filter(|v| v.property_id == property)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_language_value(&self, row: &LanguageValue) -> Result<ValueId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = ValueId(id);
            write_table!(self.language_values).insert(id, stored);
            Ok(ValueId(id))
        }

        async fn update_language_value(&self, row: &LanguageValue) -> Result<(), CoreError> {
            let mut values = write_table!(self.language_values);
            if values.contains_key(&row.id.0) {
                values.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_language_value(&self, id: ValueId) -> Result<(), CoreError> {
            write_table!(self.language_values).remove(&id.0);
            Ok(())
        }

        async fn find_language_value(
            &self,
            id: ValueId,
        ) -> Result<Option<LanguageValue>, CoreError> {
            Ok(read_table!(self.language_values).get(&id.0).cloned())
        }

        async fn language_values_of(
            &self,
            entry: EntryId,
            language: LanguageId,
        ) -> Result<Vec<LanguageValue>, CoreError> {
            let mut rows: Vec<LanguageValue> = read_table!(self.language_values)
                .values()
                .filter(|v| v.entry_id == entry && v.language_id == language)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn language_values_of_entry(
            &self,
            entry: EntryId,
        ) -> Result<Vec<LanguageValue>, CoreError> {
            let mut rows: Vec<LanguageValue> = read_table!(self.language_values)
                .values()
                .filter(|v| v.entry_id == entry)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn language_values_for_property(
            &self,
            property: PropertyId,
        ) -> Result<Vec<LanguageValue>, CoreError> {
            let mut rows: Vec<LanguageValue> = read_table!(self.language_values)
                .values()
                .filter(|v| v.property_id == property)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn create_term_value(&self, row: &TermValue) -> Result<ValueId, CoreError> {
            let id = self.alloc();
            let mut stored = row.clone();
            stored.id = ValueId(id);
            write_table!(self.term_values).insert(id, stored);
            Ok(ValueId(id))
        }

        async fn update_term_value(&self, row: &TermValue) -> Result<(), CoreError> {
            let mut values = write_table!(self.term_values);
            if values.contains_key(&row.id.0) {
                values.insert(row.id.0, row.clone());
            }
            Ok(())
        }

        async fn delete_term_value(&self, id: ValueId) -> Result<(), CoreError> {
            write_table!(self.term_values).remove(&id.0);
            Ok(())
        }

        async fn find_term_value(&self, id: ValueId) -> Result<Option<TermValue>, CoreError> {
            Ok(read_table!(self.term_values).get(&id.0).cloned())
        }

        async fn term_values_of(&self, term: TermId) -> Result<Vec<TermValue>, CoreError> {
            let mut rows: Vec<TermValue> = read_table!(self.term_values)
                .values()
                .filter(|v| v.term_id == term)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }

        async fn term_values_for_property(
            &self,
            property: PropertyId,
        ) -> Result<Vec<TermValue>, CoreError> {
            let mut rows: Vec<TermValue> = read_table!(self.term_values)
                .values()
                .filter(|v| v.property_id == property)
                .cloned()
                .collect();
            rows.sort_by_key(|r| r.id.0);
            Ok(rows)
        }
    }

}
