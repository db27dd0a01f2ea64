//! Line items of the flattened entry editor
//!
//! An entry's tree (entry properties, per-language terms, per-term
//! properties) is rendered as one ordered list. Property rows are
//! positionally scoped: a contiguous run of term-scoped rows belongs to the
//! nearest preceding lemma row.

use serde::{Deserialize, Serialize};

use super::records::{EntryId, LanguageId, PropertyId, PropertyLevel, Term, TermId, ValueId};

/// The scope a property row attaches to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyParent {
    /// Entry-scoped value
    Entry(EntryId),

    /// Language-scoped value, keyed by (language, entry)
    Language {
        /// Language the value belongs to
        language_id: LanguageId,

        /// Owning entry
        entry_id: EntryId,
    },

    /// Term-scoped value; `TermId::UNSAVED` defers to the nearest preceding
    /// lemma row at commit time
    Term(TermId),
}

impl PropertyParent {
    /// The property level this scope corresponds to
    pub fn level(&self) -> PropertyLevel {
        match self {
            Self::Entry(_) => PropertyLevel::Entry,
            Self::Language { .. } => PropertyLevel::Language,
            Self::Term(_) => PropertyLevel::Term,
        }
    }

    /// Whether this scope is term-level
    pub fn is_term_scoped(&self) -> bool {
        matches!(self, Self::Term(_))
    }
}

/// An editable term row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LemmaRow {
    /// Persisted term id, or `UNSAVED` for a row not yet committed
    pub term_id: TermId,

    /// Language code of the row
    pub lang: String,

    /// Current lemma text; committing an empty text deletes the term
    pub text: String,
}

impl LemmaRow {
    /// An empty row for a new term in the given language
    pub fn blank(lang: impl Into<String>) -> Self {
        Self {
            term_id: TermId::UNSAVED,
            lang: lang.into(),
            text: String::new(),
        }
    }

    /// A row backed by a persisted term
    pub fn persisted(term: &Term) -> Self {
        Self {
            term_id: term.id,
            lang: term.lang.clone(),
            text: term.lemma.clone(),
        }
    }

    /// Whether the row's text is empty, i.e. a deletion request on commit
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An editable property row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRow {
    /// The property being edited
    pub property_id: PropertyId,

    /// Persisted value id, or `UNSAVED` for a row not yet committed
    pub value_id: ValueId,

    /// Current value text; committing an empty text deletes the value
    pub value: String,

    /// Scope the value attaches to
    pub parent: PropertyParent,
}

impl PropertyRow {
    /// An empty row for a property in the given scope
    pub fn blank(property_id: PropertyId, parent: PropertyParent) -> Self {
        Self {
            property_id,
            value_id: ValueId::UNSAVED,
            value: String::new(),
            parent,
        }
    }
}

/// One line of the flattened entry editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineItem {
    /// Heading of the entry section
    EntryHeader,

    /// Heading of one language's section
    LanguageHeader {
        /// The language's persisted id
        language_id: LanguageId,

        /// Language code
        lang: String,
    },

    /// Editable term row
    Lemma(LemmaRow),

    /// Editable property row
    Property(PropertyRow),

    /// Affordance for inserting a new term row; never persisted
    AddTerm {
        /// Language the new term would be created in
        lang: String,
    },

    /// Affordance for inserting a new property row; never persisted
    AddProperty {
        /// Scope the new row would attach to
        parent: PropertyParent,
    },

    /// Read-only term rendering used in viewing mode
    TermDisplay {
        /// Language code
        lang: String,

        /// Lemma text
        lemma: String,
    },

    /// Read-only property rendering used in viewing mode
    ///
    /// An orphaned value whose property no longer resolves carries an empty
    /// name.
    PropertyDisplay {
        /// Resolved property name, empty when orphaned
        name: String,

        /// Stored value text
        value: String,
    },
}

impl LineItem {
    /// Whether this item is positionally owned by the nearest preceding
    /// lemma row
    ///
    /// Drives the cascade when a term row is removed: the contiguous run of
    /// term-owned items after it goes with it.
    pub fn belongs_to_term(&self) -> bool {
        match self {
            Self::Property(row) => row.parent.is_term_scoped(),
            Self::AddProperty { parent } => parent.is_term_scoped(),
            _ => false,
        }
    }

    /// Whether this item accepts in-place text edits
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Lemma(_) | Self::Property(_))
    }
}
