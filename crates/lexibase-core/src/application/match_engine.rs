//! Criteria matching over term records
//!
//! Compiles a list of search criteria into a predicate over the terms of
//! one termbase in one main language: criteria are ANDed, the descriptors
//! inside a criterion are ORed. Also hosts the count queries the browsing
//! list renders next to its filter.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::domain::criteria::{MatchDescriptor, SearchCriterion};
use crate::domain::records::{
    EntryId, EntryValue, LanguageId, LanguageValue, Term, TermValue, TermbaseId,
};
use crate::domain::repository::{
    RecordRepository, RecordStore, SchemaRepository, ValueRepository,
};
use crate::CoreError;

/// Everything of one entry a criterion can match against, pre-fetched once
/// per entry while its terms are evaluated
struct EntryContext {
    entry_values: Vec<EntryValue>,
    language_values: Vec<LanguageValue>,
    term_values: Vec<(String, TermValue)>,
}

/// Evaluates search criteria against the record store
pub struct MatchEngine {
    store: Arc<dyn RecordStore>,
}

impl MatchEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Terms of `termbase` in `main_lang` satisfying every criterion
    ///
    /// The result is term-unique and keeps the store's term order. Inert
    /// criteria (no targets, or exact with empty text) constrain nothing;
    /// with no live criterion at all every term of the language qualifies.
    pub async fn search(
        &self,
        termbase: TermbaseId,
        main_lang: &str,
        criteria: &[SearchCriterion],
    ) -> Result<Vec<Term>, CoreError> {
        let candidates = self
            .store
            .terms_of_termbase(termbase, Some(main_lang))
            .await?;
        let live: Vec<&SearchCriterion> = criteria.iter().filter(|c| !c.is_inert()).collect();

        let mut seen = HashSet::new();
        if live.is_empty() {
            return Ok(candidates
                .into_iter()
                .filter(|t| seen.insert(t.id))
                .collect());
        }

        let main_language_id = self
            .store
            .languages_of(termbase)
            .await?
            .into_iter()
            .find(|l| l.code == main_lang)
            .map(|l| l.id);

        let mut contexts: HashMap<EntryId, EntryContext> = HashMap::new();
        let mut hits = Vec::new();
        for term in candidates {
            if !seen.insert(term.id) {
                continue;
            }
            if !contexts.contains_key(&term.entry_id) {
                let context = self
                    .load_context(term.entry_id, main_lang, main_language_id)
                    .await?;
                contexts.insert(term.entry_id, context);
            }
            let context = &contexts[&term.entry_id];
            if live
                .iter()
                .all(|c| Self::criterion_holds(c, &term, context, main_lang))
            {
                hits.push(term);
            }
        }

        debug!(
            termbase = termbase.0,
            lang = main_lang,
            criteria = live.len(),
            hits = hits.len(),
            "filter evaluated"
        );
        Ok(hits)
    }

    async fn load_context(
        &self,
        entry: EntryId,
        main_lang: &str,
        main_language_id: Option<LanguageId>,
    ) -> Result<EntryContext, CoreError> {
        let entry_values = self.store.entry_values_of(entry).await?;
        let language_values = match main_language_id {
            Some(language) => self.store.language_values_of(entry, language).await?,
            None => Vec::new(),
        };

        // Term-scoped values can only match through terms in the main
        // language, so the others are not fetched.
        let mut term_values = Vec::new();
        for sibling in self.store.terms_of_entry(entry).await? {
            if sibling.lang != main_lang {
                continue;
            }
            for value in self.store.term_values_of(sibling.id).await? {
                term_values.push((sibling.lang.clone(), value));
            }
        }

        Ok(EntryContext {
            entry_values,
            language_values,
            term_values,
        })
    }

    fn criterion_holds(
        criterion: &SearchCriterion,
        term: &Term,
        context: &EntryContext,
        main_lang: &str,
    ) -> bool {
        criterion.targets().iter().any(|descriptor| match descriptor {
            MatchDescriptor::Lemma { lang } => {
                *lang == term.lang && criterion.accepts(&term.lemma)
            }
            MatchDescriptor::Property {
                property_id,
                lang: None,
            } => context
                .entry_values
                .iter()
                .any(|v| v.property_id == *property_id && criterion.accepts(&v.value)),
            MatchDescriptor::Property {
                property_id,
                lang: Some(lang),
            } if lang == main_lang => {
                context
                    .language_values
                    .iter()
                    .any(|v| v.property_id == *property_id && criterion.accepts(&v.value))
                    || context.term_values.iter().any(|(value_lang, v)| {
                        value_lang == lang
                            && v.property_id == *property_id
                            && criterion.accepts(&v.value)
                    })
            }
            // The filter is defined per main language; descriptors for
            // other languages are not evaluated.
            MatchDescriptor::Property { .. } => false,
        })
    }

    /// Total entries in a termbase
    pub async fn entry_count(&self, termbase: TermbaseId) -> Result<usize, CoreError> {
        Ok(self.store.entries_of(termbase).await?.len())
    }

    /// Total terms in a termbase across all languages
    pub async fn term_count(&self, termbase: TermbaseId) -> Result<usize, CoreError> {
        Ok(self.store.terms_of_termbase(termbase, None).await?.len())
    }

    /// Term counts keyed by language code
    pub async fn term_count_by_language(
        &self,
        termbase: TermbaseId,
    ) -> Result<HashMap<String, usize>, CoreError> {
        let mut counts = HashMap::new();
        for term in self.store.terms_of_termbase(termbase, None).await? {
            *counts.entry(term.lang).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Entries having at least one term in the given language
    ///
    /// Backs the per-language completion statistic of the browsing list.
    pub async fn entries_with_language(
        &self,
        termbase: TermbaseId,
        lang: &str,
    ) -> Result<usize, CoreError> {
        let entries: HashSet<EntryId> = self
            .store
            .terms_of_termbase(termbase, Some(lang))
            .await?
            .into_iter()
            .map(|t| t.entry_id)
            .collect();
        Ok(entries.len())
    }
}
