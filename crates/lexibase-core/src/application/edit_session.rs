//! Stateful editor for one entry's data graph
//!
//! The session renders an entry as a flat ordered list of line items and
//! reconciles that list with the record store on commit. Property rows are
//! positionally scoped: a row under a not-yet-saved term resolves its
//! parent through the nearest preceding lemma row during the commit walk,
//! which is what lets a new term and its new properties land in one pass.
//!
//! Reload and commit are serialized through the session's mutex; a reload
//! superseded by a newer load request never installs its result.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::application::catalog::SchemaCatalog;
use crate::application::media::MediaStore;
use crate::domain::events::{ChangeEvent, ChangeNotifier};
use crate::domain::line_item::{LemmaRow, LineItem, PropertyParent, PropertyRow};
use crate::domain::records::{
    DescriptorTarget, EntryId, EntryValue, LanguageValue, Property, PropertyId, PropertyKind,
    PropertyLevel, Term, TermId, TermValue, TermbaseId, ValueId,
};
use crate::domain::repository::{RecordRepository, RecordStore, ValueRepository};
use crate::CoreError;

/// Session display/editing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Read-only rendering with display items
    Viewing,

    /// Editable rows, affordances, and pending deletions
    Editing,
}

/// A persisted value queued for deletion on the next successful commit
#[derive(Debug, Clone, PartialEq)]
struct PendingValueDelete {
    property_id: PropertyId,
    value_id: ValueId,
    scope: PropertyLevel,
}

struct SessionState {
    mode: SessionMode,
    entry_id: EntryId,
    main_lang: String,
    items: Vec<LineItem>,
    deleted_terms: Vec<TermId>,
    deleted_values: Vec<PendingValueDelete>,
}

struct UpsertOutcome {
    created: Option<ValueId>,
    /// Stored text when it diverged from the row text (imported image path)
    stored: Option<String>,
    mutated: bool,
}

/// Edit session over one entry of one termbase
pub struct EditSession {
    store: Arc<dyn RecordStore>,
    catalog: SchemaCatalog,
    media: MediaStore,
    notifier: ChangeNotifier,
    termbase_id: TermbaseId,
    state: Mutex<SessionState>,
    load_generation: AtomicU64,
}

impl EditSession {
    /// Create a session for a termbase; no entry is loaded yet
    pub fn new(
        store: Arc<dyn RecordStore>,
        media: MediaStore,
        notifier: ChangeNotifier,
        termbase_id: TermbaseId,
        main_lang: impl Into<String>,
    ) -> Self {
        let catalog = SchemaCatalog::new(store.clone());
        Self {
            store,
            catalog,
            media,
            notifier,
            termbase_id,
            state: Mutex::new(SessionState {
                mode: SessionMode::Viewing,
                entry_id: EntryId::UNSAVED,
                main_lang: main_lang.into(),
                items: Vec::new(),
                deleted_terms: Vec::new(),
                deleted_values: Vec::new(),
            }),
            load_generation: AtomicU64::new(0),
        }
    }

    /// The termbase this session edits
    pub fn termbase(&self) -> TermbaseId {
        self.termbase_id
    }

    /// Current mode
    pub async fn mode(&self) -> SessionMode {
        self.state.lock().await.mode
    }

    /// The entry currently loaded
    pub async fn entry(&self) -> EntryId {
        self.state.lock().await.entry_id
    }

    /// Snapshot of the current line item list
    pub async fn items(&self) -> Vec<LineItem> {
        self.state.lock().await.items.clone()
    }

    /// Load an entry, discarding uncommitted edits of the previous one
    pub async fn open(&self, entry_id: EntryId) -> Result<(), CoreError> {
        let token = self.bump_generation();
        let mut state = self.state.lock().await;
        state.entry_id = entry_id;
        self.reload_locked(&mut state, token).await
    }

    /// Change the main language, reordering the rendered languages
    pub async fn set_main_language(&self, lang: impl Into<String>) -> Result<(), CoreError> {
        let token = self.bump_generation();
        let mut state = self.state.lock().await;
        state.main_lang = lang.into();
        self.reload_locked(&mut state, token).await
    }

    /// Re-read the current entry, e.g. after a languages-changed event
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let token = self.bump_generation();
        let mut state = self.state.lock().await;
        self.reload_locked(&mut state, token).await
    }

    /// Switch to editing mode
    ///
    /// A brand-new entry with no data at all gets mandatory placeholder
    /// rows seeded from the termbase's input descriptors; an entry that
    /// already has any data is rendered as-is.
    pub async fn begin_editing(&self) -> Result<(), CoreError> {
        let token = self.bump_generation();
        let mut state = self.state.lock().await;
        if state.mode == SessionMode::Editing {
            return Ok(());
        }
        state.mode = SessionMode::Editing;
        self.reload_locked(&mut state, token).await
    }

    /// Switch back to viewing mode, discarding uncommitted edits
    pub async fn end_editing(&self) -> Result<(), CoreError> {
        let token = self.bump_generation();
        let mut state = self.state.lock().await;
        if state.mode == SessionMode::Viewing {
            return Ok(());
        }
        state.mode = SessionMode::Viewing;
        self.reload_locked(&mut state, token).await
    }

    /// Splice an empty term row, its add-property marker, and an add-term
    /// marker at `index`
    pub async fn insert_term_row(&self, index: usize, lang: &str) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        if index > state.items.len() {
            return Err(CoreError::ValidationError(format!(
                "index {} out of bounds",
                index
            )));
        }
        state.items.insert(
            index,
            LineItem::AddTerm {
                lang: lang.to_string(),
            },
        );
        state.items.insert(
            index,
            LineItem::AddProperty {
                parent: PropertyParent::Term(TermId::UNSAVED),
            },
        );
        state.items.insert(index, LineItem::Lemma(LemmaRow::blank(lang)));
        Ok(())
    }

    /// Insert a new term row through the add-term affordance at
    /// `affordance_index`; the marker slides below the new row
    pub async fn add_term_at(&self, affordance_index: usize) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        let lang = match state.items.get(affordance_index) {
            Some(LineItem::AddTerm { lang }) => lang.clone(),
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "no add-term marker at index {}",
                    affordance_index
                )))
            }
        };
        state.items.insert(
            affordance_index,
            LineItem::AddProperty {
                parent: PropertyParent::Term(TermId::UNSAVED),
            },
        );
        state
            .items
            .insert(affordance_index, LineItem::Lemma(LemmaRow::blank(&lang)));
        Ok(())
    }

    /// Remove the term row at `index` together with the contiguous run of
    /// term-owned items below it, queueing persisted ids for deletion
    pub async fn remove_term_row(&self, index: usize) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        let row = match state.items.get(index) {
            Some(LineItem::Lemma(row)) => row.clone(),
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "no term row at index {}",
                    index
                )))
            }
        };
        state.items.remove(index);
        if row.term_id.is_persisted() {
            state.deleted_terms.push(row.term_id);
        }

        while index < state.items.len() && state.items[index].belongs_to_term() {
            if let LineItem::Property(property_row) = &state.items[index] {
                if property_row.value_id.is_persisted() {
                    let pending = PendingValueDelete {
                        property_id: property_row.property_id,
                        value_id: property_row.value_id,
                        scope: PropertyLevel::Term,
                    };
                    state.deleted_values.push(pending);
                }
            }
            state.items.remove(index);
        }
        Ok(())
    }

    /// Insert a property row at `index` for the given scope
    ///
    /// When the scope already holds a persisted value for the property,
    /// the row starts from that value instead of empty.
    pub async fn insert_property_row(
        &self,
        index: usize,
        property_id: PropertyId,
        parent: PropertyParent,
    ) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        if index > state.items.len() {
            return Err(CoreError::ValidationError(format!(
                "index {} out of bounds",
                index
            )));
        }
        let row = self.resolve_property_row(property_id, parent).await?;
        state.items.insert(index, LineItem::Property(row));
        Ok(())
    }

    /// Insert a property row through the add-property affordance at
    /// `affordance_index`; the marker slides below the new row
    pub async fn add_property_at(
        &self,
        affordance_index: usize,
        property_id: PropertyId,
    ) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        let parent = match state.items.get(affordance_index) {
            Some(LineItem::AddProperty { parent }) => parent.clone(),
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "no add-property marker at index {}",
                    affordance_index
                )))
            }
        };
        let row = self.resolve_property_row(property_id, parent).await?;
        state.items.insert(affordance_index, LineItem::Property(row));
        Ok(())
    }

    /// Remove the property row at `index`, queueing its persisted value
    /// for deletion
    pub async fn remove_property_row(&self, index: usize) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        let row = match state.items.get(index) {
            Some(LineItem::Property(row)) => row.clone(),
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "no property row at index {}",
                    index
                )))
            }
        };
        state.items.remove(index);
        if row.value_id.is_persisted() {
            state.deleted_values.push(PendingValueDelete {
                property_id: row.property_id,
                value_id: row.value_id,
                scope: row.parent.level(),
            });
        }
        Ok(())
    }

    /// Replace the lemma text of the term row at `index`
    pub async fn set_lemma(&self, index: usize, text: impl Into<String>) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        match state.items.get_mut(index) {
            Some(LineItem::Lemma(row)) => {
                row.text = text.into();
                Ok(())
            }
            _ => Err(CoreError::ValidationError(format!(
                "no term row at index {}",
                index
            ))),
        }
    }

    /// Replace the value text of the property row at `index`
    pub async fn set_value(&self, index: usize, text: impl Into<String>) -> Result<(), CoreError> {
        let mut state = self.lock_editing().await?;
        match state.items.get_mut(index) {
            Some(LineItem::Property(row)) => {
                row.value = text.into();
                Ok(())
            }
            _ => Err(CoreError::ValidationError(format!(
                "no property row at index {}",
                index
            ))),
        }
    }

    /// Properties offerable through the add-property affordance at
    /// `affordance_index`: all catalog properties of the scope's level not
    /// already present in the contiguous run of rows above the marker
    pub async fn available_properties_at(
        &self,
        affordance_index: usize,
    ) -> Result<Vec<Property>, CoreError> {
        let state = self.state.lock().await;
        let parent = match state.items.get(affordance_index) {
            Some(LineItem::AddProperty { parent }) => parent.clone(),
            _ => {
                return Err(CoreError::ValidationError(format!(
                    "no add-property marker at index {}",
                    affordance_index
                )))
            }
        };
        let level = parent.level();

        let mut present = HashSet::new();
        let mut cursor = affordance_index;
        while cursor > 0 {
            cursor -= 1;
            match &state.items[cursor] {
                LineItem::Property(row) if row.parent.level() == level => {
                    present.insert(row.property_id);
                }
                _ => break,
            }
        }

        let properties = self.catalog.properties_of(self.termbase_id).await?;
        Ok(properties
            .into_iter()
            .filter(|p| p.level == level && !present.contains(&p.id))
            .collect())
    }

    /// Replay the line item list against the store
    ///
    /// One top-to-bottom walk upserts every non-empty row, resolving
    /// term-scoped forward references through the most recent term row;
    /// queued deletions run afterwards, and freshly minted ids are patched
    /// back into the list in place so no reload is needed.
    pub async fn commit(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        if state.mode != SessionMode::Editing {
            return Err(CoreError::SessionError(
                "commit requires editing mode".to_string(),
            ));
        }
        let entry_id = state.entry_id;
        if !entry_id.is_persisted() {
            return Err(CoreError::SessionError("no entry loaded".to_string()));
        }

        let properties: HashMap<PropertyId, Property> = self
            .catalog
            .properties_of(self.termbase_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut last_term_id: Option<TermId> = None;
        let mut term_patches: Vec<(usize, TermId)> = Vec::new();
        let mut value_patches: Vec<(usize, ValueId, PropertyParent)> = Vec::new();
        let mut text_patches: Vec<(usize, String)> = Vec::new();
        let mut mutated = false;

        for index in 0..state.items.len() {
            match state.items[index].clone() {
                LineItem::Lemma(row) => {
                    if row.is_blank() {
                        if row.term_id.is_persisted()
                            && !state.deleted_terms.contains(&row.term_id)
                        {
                            state.deleted_terms.push(row.term_id);
                        }
                        last_term_id = None;
                    } else if row.term_id.is_persisted() {
                        let current = self.store.find_term(row.term_id).await?;
                        let changed = current
                            .map(|c| c.lemma != row.text || c.lang != row.lang)
                            .unwrap_or(false);
                        if changed {
                            self.store
                                .update_term(&Term {
                                    id: row.term_id,
                                    entry_id,
                                    lang: row.lang.clone(),
                                    lemma: row.text.clone(),
                                })
                                .await?;
                            mutated = true;
                        }
                        last_term_id = Some(row.term_id);
                    } else {
                        let new_id = self
                            .store
                            .create_term(&Term::new(entry_id, row.lang.clone(), row.text.clone()))
                            .await?;
                        term_patches.push((index, new_id));
                        last_term_id = Some(new_id);
                        mutated = true;
                    }
                }
                LineItem::Property(row) => {
                    let resolved = match row.parent.clone() {
                        PropertyParent::Term(term) if !term.is_persisted() => {
                            last_term_id.map(PropertyParent::Term)
                        }
                        parent => Some(parent),
                    };
                    match resolved {
                        Some(parent) if !row.value.is_empty() => {
                            let kind = properties.get(&row.property_id).map(|p| p.kind);
                            let outcome = self.upsert_value(&row, &parent, kind).await?;
                            if let Some(new_id) = outcome.created {
                                value_patches.push((index, new_id, parent));
                            }
                            if let Some(stored) = outcome.stored {
                                text_patches.push((index, stored));
                            }
                            mutated |= outcome.mutated;
                        }
                        _ => {
                            if row.value_id.is_persisted() {
                                let pending = PendingValueDelete {
                                    property_id: row.property_id,
                                    value_id: row.value_id,
                                    scope: row.parent.level(),
                                };
                                if !state.deleted_values.contains(&pending) {
                                    state.deleted_values.push(pending);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Queued term deletions first: their value rows go with them. Each
        // queue entry leaves only after its delete call succeeded, so a
        // failed commit retries the remainder on the next save.
        while let Some(&term_id) = state.deleted_terms.first() {
            for value in self.store.term_values_of(term_id).await? {
                self.discard_backing_file(&properties, value.property_id, &value.value)
                    .await;
            }
            self.store.delete_term(term_id).await?;
            state.deleted_terms.remove(0);
            mutated = true;
        }

        while let Some(pending) = state.deleted_values.first().cloned() {
            if properties.get(&pending.property_id).map(|p| p.kind) == Some(PropertyKind::Image) {
                let stored = match pending.scope {
                    PropertyLevel::Entry => self
                        .store
                        .find_entry_value(pending.value_id)
                        .await?
                        .map(|v| v.value),
                    PropertyLevel::Language => self
                        .store
                        .find_language_value(pending.value_id)
                        .await?
                        .map(|v| v.value),
                    PropertyLevel::Term => self
                        .store
                        .find_term_value(pending.value_id)
                        .await?
                        .map(|v| v.value),
                };
                if let Some(path) = stored {
                    self.media.remove(Path::new(&path)).await;
                }
            }
            match pending.scope {
                PropertyLevel::Entry => self.store.delete_entry_value(pending.value_id).await?,
                PropertyLevel::Language => {
                    self.store.delete_language_value(pending.value_id).await?
                }
                PropertyLevel::Term => self.store.delete_term_value(pending.value_id).await?,
            }
            state.deleted_values.remove(0);
            mutated = true;
        }

        for (index, term_id) in term_patches {
            if let Some(LineItem::Lemma(row)) = state.items.get_mut(index) {
                row.term_id = term_id;
            }
        }
        for (index, value_id, parent) in value_patches {
            if let Some(LineItem::Property(row)) = state.items.get_mut(index) {
                row.value_id = value_id;
                row.parent = parent;
            }
        }
        for (index, stored) in text_patches {
            if let Some(LineItem::Property(row)) = state.items.get_mut(index) {
                row.value = stored;
            }
        }
        // Rows emptied into deletions are unsaved rows again.
        for item in state.items.iter_mut() {
            match item {
                LineItem::Lemma(row) if row.is_blank() => row.term_id = TermId::UNSAVED,
                LineItem::Property(row) if row.value.is_empty() => {
                    row.value_id = ValueId::UNSAVED
                }
                _ => {}
            }
        }

        if mutated {
            if let Some(mut entry) = self.store.find_entry(entry_id).await? {
                entry.touch();
                self.store.update_entry(&entry).await?;
            }
        }

        debug!(entry = entry_id.0, mutated, "entry committed");
        self.notifier.publish(ChangeEvent::EntrySaved {
            termbase_id: self.termbase_id,
            entry_id,
        });
        Ok(())
    }

    fn bump_generation(&self) -> u64 {
        self.load_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn lock_editing(&self) -> Result<MutexGuard<'_, SessionState>, CoreError> {
        let state = self.state.lock().await;
        if state.mode != SessionMode::Editing {
            return Err(CoreError::SessionError(
                "structural edits require editing mode".to_string(),
            ));
        }
        Ok(state)
    }

    async fn reload_locked(
        &self,
        state: &mut SessionState,
        token: u64,
    ) -> Result<(), CoreError> {
        let items = self
            .build_items(state.entry_id, &state.main_lang, state.mode)
            .await?;
        if token != self.load_generation.load(Ordering::SeqCst) {
            debug!(token, "reload superseded, discarding result");
            return Ok(());
        }
        state.items = items;
        state.deleted_terms.clear();
        state.deleted_values.clear();
        Ok(())
    }

    async fn build_items(
        &self,
        entry_id: EntryId,
        main_lang: &str,
        mode: SessionMode,
    ) -> Result<Vec<LineItem>, CoreError> {
        let mut items = Vec::new();
        if !entry_id.is_persisted() || self.store.find_entry(entry_id).await?.is_none() {
            return Ok(items);
        }

        let editing = mode == SessionMode::Editing;
        let properties: HashMap<PropertyId, Property> = self
            .catalog
            .properties_of(self.termbase_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut languages = self.catalog.languages_of(self.termbase_id).await?;
        languages.sort_by_key(|l| l.code != main_lang);

        let entry_values = self.store.entry_values_of(entry_id).await?;
        let all_language_values = self.store.language_values_of_entry(entry_id).await?;
        let terms = self.store.terms_of_entry(entry_id).await?;

        let seeding = editing
            && entry_values.is_empty()
            && all_language_values.is_empty()
            && terms.is_empty();
        let descriptors = if seeding {
            self.catalog.input_descriptors_of(self.termbase_id).await?
        } else {
            Vec::new()
        };

        items.push(LineItem::EntryHeader);
        for value in &entry_values {
            items.push(value_item(
                editing,
                value.property_id,
                value.id,
                &value.value,
                PropertyParent::Entry(entry_id),
                &properties,
            ));
        }
        if seeding {
            for descriptor in &descriptors {
                if let DescriptorTarget::Property {
                    property_id,
                    lang: None,
                } = &descriptor.target
                {
                    items.push(LineItem::Property(PropertyRow::blank(
                        *property_id,
                        PropertyParent::Entry(entry_id),
                    )));
                }
            }
        }
        if editing {
            items.push(LineItem::AddProperty {
                parent: PropertyParent::Entry(entry_id),
            });
        }

        for language in &languages {
            items.push(LineItem::LanguageHeader {
                language_id: language.id,
                lang: language.code.clone(),
            });

            for value in all_language_values
                .iter()
                .filter(|v| v.language_id == language.id)
            {
                items.push(value_item(
                    editing,
                    value.property_id,
                    value.id,
                    &value.value,
                    PropertyParent::Language {
                        language_id: language.id,
                        entry_id,
                    },
                    &properties,
                ));
            }
            if seeding {
                for property_id in
                    descriptor_properties(&descriptors, &language.code, &properties, PropertyLevel::Language)
                {
                    items.push(LineItem::Property(PropertyRow::blank(
                        property_id,
                        PropertyParent::Language {
                            language_id: language.id,
                            entry_id,
                        },
                    )));
                }
            }
            if editing {
                items.push(LineItem::AddProperty {
                    parent: PropertyParent::Language {
                        language_id: language.id,
                        entry_id,
                    },
                });
            }

            for term in terms.iter().filter(|t| t.lang == language.code) {
                if editing {
                    items.push(LineItem::Lemma(LemmaRow::persisted(term)));
                } else {
                    items.push(LineItem::TermDisplay {
                        lang: term.lang.clone(),
                        lemma: term.lemma.clone(),
                    });
                }
                for value in self.store.term_values_of(term.id).await? {
                    items.push(value_item(
                        editing,
                        value.property_id,
                        value.id,
                        &value.value,
                        PropertyParent::Term(term.id),
                        &properties,
                    ));
                }
                if editing {
                    items.push(LineItem::AddProperty {
                        parent: PropertyParent::Term(term.id),
                    });
                }
            }

            if seeding {
                let term_seeds =
                    descriptor_properties(&descriptors, &language.code, &properties, PropertyLevel::Term);
                let has_lemma_descriptor = descriptors.iter().any(|d| {
                    matches!(&d.target, DescriptorTarget::Lemma { lang } if *lang == language.code)
                });
                // A mandatory term-level property needs a term row to live
                // under, so it forces the lemma placeholder as well.
                if has_lemma_descriptor || !term_seeds.is_empty() {
                    items.push(LineItem::Lemma(LemmaRow::blank(&language.code)));
                    for property_id in term_seeds {
                        items.push(LineItem::Property(PropertyRow::blank(
                            property_id,
                            PropertyParent::Term(TermId::UNSAVED),
                        )));
                    }
                    items.push(LineItem::AddProperty {
                        parent: PropertyParent::Term(TermId::UNSAVED),
                    });
                }
            }

            if editing {
                items.push(LineItem::AddTerm {
                    lang: language.code.clone(),
                });
            }
        }

        Ok(items)
    }

    async fn resolve_property_row(
        &self,
        property_id: PropertyId,
        parent: PropertyParent,
    ) -> Result<PropertyRow, CoreError> {
        let existing = match &parent {
            PropertyParent::Entry(entry) => self
                .store
                .entry_values_of(*entry)
                .await?
                .into_iter()
                .find(|v| v.property_id == property_id)
                .map(|v| (v.id, v.value)),
            PropertyParent::Language {
                language_id,
                entry_id,
            } => self
                .store
                .language_values_of(*entry_id, *language_id)
                .await?
                .into_iter()
                .find(|v| v.property_id == property_id)
                .map(|v| (v.id, v.value)),
            PropertyParent::Term(term) if term.is_persisted() => self
                .store
                .term_values_of(*term)
                .await?
                .into_iter()
                .find(|v| v.property_id == property_id)
                .map(|v| (v.id, v.value)),
            PropertyParent::Term(_) => None,
        };
        Ok(match existing {
            Some((value_id, value)) => PropertyRow {
                property_id,
                value_id,
                value,
                parent,
            },
            None => PropertyRow::blank(property_id, parent),
        })
    }

    async fn upsert_value(
        &self,
        row: &PropertyRow,
        parent: &PropertyParent,
        kind: Option<PropertyKind>,
    ) -> Result<UpsertOutcome, CoreError> {
        let is_image = kind == Some(PropertyKind::Image);

        if !row.value_id.is_persisted() {
            let stored = if is_image {
                self.import_image(&row.value).await
            } else {
                row.value.clone()
            };
            let diverged = (stored != row.value).then(|| stored.clone());
            let new_id = match parent {
                PropertyParent::Entry(entry) => {
                    self.store
                        .create_entry_value(&EntryValue {
                            id: ValueId::UNSAVED,
                            entry_id: *entry,
                            property_id: row.property_id,
                            value: stored,
                        })
                        .await?
                }
                PropertyParent::Language {
                    language_id,
                    entry_id,
                } => {
                    self.store
                        .create_language_value(&LanguageValue {
                            id: ValueId::UNSAVED,
                            entry_id: *entry_id,
                            language_id: *language_id,
                            property_id: row.property_id,
                            value: stored,
                        })
                        .await?
                }
                PropertyParent::Term(term) => {
                    self.store
                        .create_term_value(&TermValue {
                            id: ValueId::UNSAVED,
                            term_id: *term,
                            property_id: row.property_id,
                            value: stored,
                        })
                        .await?
                }
            };
            return Ok(UpsertOutcome {
                created: Some(new_id),
                stored: diverged,
                mutated: true,
            });
        }

        let old_value = match parent {
            PropertyParent::Entry(_) => self
                .store
                .find_entry_value(row.value_id)
                .await?
                .map(|v| v.value),
            PropertyParent::Language { .. } => self
                .store
                .find_language_value(row.value_id)
                .await?
                .map(|v| v.value),
            PropertyParent::Term(_) => self
                .store
                .find_term_value(row.value_id)
                .await?
                .map(|v| v.value),
        };
        if old_value.as_deref() == Some(row.value.as_str()) {
            return Ok(UpsertOutcome {
                created: None,
                stored: None,
                mutated: false,
            });
        }

        let stored = if is_image {
            self.import_image(&row.value).await
        } else {
            row.value.clone()
        };
        let diverged = (stored != row.value).then(|| stored.clone());
        match parent {
            PropertyParent::Entry(entry) => {
                self.store
                    .update_entry_value(&EntryValue {
                        id: row.value_id,
                        entry_id: *entry,
                        property_id: row.property_id,
                        value: stored,
                    })
                    .await?
            }
            PropertyParent::Language {
                language_id,
                entry_id,
            } => {
                self.store
                    .update_language_value(&LanguageValue {
                        id: row.value_id,
                        entry_id: *entry_id,
                        language_id: *language_id,
                        property_id: row.property_id,
                        value: stored,
                    })
                    .await?
            }
            PropertyParent::Term(term) => {
                self.store
                    .update_term_value(&TermValue {
                        id: row.value_id,
                        term_id: *term,
                        property_id: row.property_id,
                        value: stored,
                    })
                    .await?
            }
        }
        if is_image {
            if let Some(old) = old_value {
                self.media.remove(Path::new(&old)).await;
            }
        }
        Ok(UpsertOutcome {
            created: None,
            stored: diverged,
            mutated: true,
        })
    }

    async fn import_image(&self, source: &str) -> String {
        match self.media.import(self.termbase_id, Path::new(source)).await {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(err) => {
                warn!(error = %err, source, "image import failed, storing source path");
                source.to_string()
            }
        }
    }

    async fn discard_backing_file(
        &self,
        properties: &HashMap<PropertyId, Property>,
        property_id: PropertyId,
        value: &str,
    ) {
        if properties.get(&property_id).map(|p| p.kind) == Some(PropertyKind::Image) {
            self.media.remove(Path::new(value)).await;
        }
    }
}

fn value_item(
    editing: bool,
    property_id: PropertyId,
    value_id: ValueId,
    value: &str,
    parent: PropertyParent,
    properties: &HashMap<PropertyId, Property>,
) -> LineItem {
    if editing {
        LineItem::Property(PropertyRow {
            property_id,
            value_id,
            value: value.to_string(),
            parent,
        })
    } else {
        let name = properties
            .get(&property_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        LineItem::PropertyDisplay {
            name,
            value: value.to_string(),
        }
    }
}

fn descriptor_properties(
    descriptors: &[crate::domain::records::InputDescriptor],
    lang: &str,
    properties: &HashMap<PropertyId, Property>,
    level: PropertyLevel,
) -> Vec<PropertyId> {
    descriptors
        .iter()
        .filter_map(|d| match &d.target {
            DescriptorTarget::Property {
                property_id,
                lang: Some(code),
            } if code == lang && properties.get(property_id).map(|p| p.level) == Some(level) => {
                Some(*property_id)
            }
            _ => None,
        })
        .collect()
}
