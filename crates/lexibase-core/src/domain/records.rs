//! Row types of the termbase record model
//!
//! All identifiers are integer newtypes; the value 0 marks a row that has
//! not been persisted yet. Rows are plain data carried between the services
//! and the record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value object: termbase identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermbaseId(pub i64);

/// Value object: language identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageId(pub i64);

/// Value object: property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub i64);

/// Value object: input descriptor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorId(pub i64);

/// Value object: entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

/// Value object: term identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermId(pub i64);

/// Value object: property value identifier, shared by all three value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub i64);

macro_rules! unsaved_sentinel {
    ($($id:ident),+ $(,)?) => {$(
        impl $id {
            /// Sentinel for rows that have not been persisted yet
            pub const UNSAVED: Self = Self(0);

            /// Whether this id refers to a persisted row
            pub fn is_persisted(self) -> bool {
                self.0 > 0
            }
        }
    )+};
}

unsaved_sentinel!(
    TermbaseId,
    LanguageId,
    PropertyId,
    DescriptorId,
    EntryId,
    TermId,
    ValueId,
);

/// Aggregate root: a terminology database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Termbase {
    /// Unique identifier
    pub id: TermbaseId,

    /// Display name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Termbase {
    /// Create a new, unsaved termbase
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TermbaseId::UNSAVED,
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A language registered in a termbase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    /// Unique identifier
    pub id: LanguageId,

    /// Owning termbase
    pub termbase_id: TermbaseId,

    /// Language code, e.g. "en"
    pub code: String,
}

impl Language {
    /// Create a new, unsaved language row
    pub fn new(termbase_id: TermbaseId, code: impl Into<String>) -> Self {
        Self {
            id: LanguageId::UNSAVED,
            termbase_id,
            code: code.into(),
        }
    }
}

/// Scope level a property's values attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyLevel {
    /// One value per entry, language-agnostic
    Entry,

    /// One value per (entry, language) pair
    Language,

    /// One value per term
    Term,
}

/// Value shape of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Free text
    Text,

    /// One of a fixed set of choices
    Picklist,

    /// Filesystem path to a termbase-owned image copy
    Image,
}

/// A user-defined attribute definition
///
/// Level and kind are fixed once values exist for the property; no API in
/// this crate mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier
    pub id: PropertyId,

    /// Owning termbase
    pub termbase_id: TermbaseId,

    /// Display name
    pub name: String,

    /// Scope level values of this property attach to
    pub level: PropertyLevel,

    /// Value shape
    pub kind: PropertyKind,

    /// Ordered choices, populated only when `kind` is `Picklist`
    pub picklist: Vec<String>,
}

impl Property {
    /// Create a new, unsaved property definition
    pub fn new(
        termbase_id: TermbaseId,
        name: impl Into<String>,
        level: PropertyLevel,
        kind: PropertyKind,
    ) -> Self {
        Self {
            id: PropertyId::UNSAVED,
            termbase_id,
            name: name.into(),
            level,
            kind,
            picklist: Vec::new(),
        }
    }

    /// Attach picklist choices
    pub fn with_picklist(mut self, choices: Vec<String>) -> Self {
        self.picklist = choices;
        self
    }
}

/// What an input descriptor marks as required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DescriptorTarget {
    /// The lemma of the given language
    Lemma {
        /// Language code
        lang: String,
    },

    /// A property, entry-level when `lang` is `None`
    Property {
        /// The required property
        property_id: PropertyId,

        /// Language the value is required in; `None` for entry-level
        lang: Option<String>,
    },
}

/// Marks one field as required when creating a new entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    /// Unique identifier
    pub id: DescriptorId,

    /// Owning termbase
    pub termbase_id: TermbaseId,

    /// The required field
    pub target: DescriptorTarget,
}

impl InputDescriptor {
    /// Create a new, unsaved descriptor
    pub fn new(termbase_id: TermbaseId, target: DescriptorTarget) -> Self {
        Self {
            id: DescriptorId::UNSAVED,
            termbase_id,
            target,
        }
    }
}

/// A terminology entry
///
/// An entry may transiently hold zero terms, e.g. immediately after
/// creation before the first term row is typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier
    pub id: EntryId,

    /// Owning termbase
    pub termbase_id: TermbaseId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new, unsaved entry
    pub fn new(termbase_id: TermbaseId) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::UNSAVED,
            termbase_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One language's term inside an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Unique identifier
    pub id: TermId,

    /// Owning entry
    pub entry_id: EntryId,

    /// Language code; always non-empty
    pub lang: String,

    /// The term text
    pub lemma: String,
}

impl Term {
    /// Create a new, unsaved term
    pub fn new(entry_id: EntryId, lang: impl Into<String>, lemma: impl Into<String>) -> Self {
        Self {
            id: TermId::UNSAVED,
            entry_id,
            lang: lang.into(),
            lemma: lemma.into(),
        }
    }
}

/// An entry-scoped property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryValue {
    /// Unique identifier
    pub id: ValueId,

    /// Owning entry
    pub entry_id: EntryId,

    /// The property this value belongs to
    pub property_id: PropertyId,

    /// Stored value text
    pub value: String,
}

/// A language-scoped property value, keyed by (language, entry)
///
/// Represents "this entry's value of this property in this language",
/// independent of which term rows exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageValue {
    /// Unique identifier
    pub id: ValueId,

    /// Owning entry
    pub entry_id: EntryId,

    /// Language this value belongs to
    pub language_id: LanguageId,

    /// The property this value belongs to
    pub property_id: PropertyId,

    /// Stored value text
    pub value: String,
}

/// A term-scoped property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermValue {
    /// Unique identifier
    pub id: ValueId,

    /// Owning term
    pub term_id: TermId,

    /// The property this value belongs to
    pub property_id: PropertyId,

    /// Stored value text
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsaved_sentinel() {
        assert!(!TermId::UNSAVED.is_persisted());
        assert!(!ValueId::UNSAVED.is_persisted());
        assert!(TermId(7).is_persisted());
        assert!(!TermId(-1).is_persisted());
    }

    #[test]
    fn test_new_rows_start_unsaved() {
        let termbase = Termbase::new("medical", "clinical terminology");
        assert_eq!(termbase.id, TermbaseId::UNSAVED);
        assert_eq!(termbase.name, "medical");
        assert!(termbase.created_at <= Utc::now());

        let entry = Entry::new(TermbaseId(1));
        assert_eq!(entry.id, EntryId::UNSAVED);
        assert_eq!(entry.termbase_id, TermbaseId(1));

        let term = Term::new(EntryId(3), "en", "heart");
        assert_eq!(term.id, TermId::UNSAVED);
        assert_eq!(term.lang, "en");
        assert_eq!(term.lemma, "heart");
    }

    #[test]
    fn test_property_builder() {
        let property = Property::new(
            TermbaseId(1),
            "part of speech",
            PropertyLevel::Term,
            PropertyKind::Picklist,
        )
        .with_picklist(vec!["noun".to_string(), "verb".to_string()]);

        assert_eq!(property.level, PropertyLevel::Term);
        assert_eq!(property.picklist, vec!["noun", "verb"]);
    }

    #[test]
    fn test_row_serialization_round_trip() {
        let term = Term {
            id: TermId(11),
            entry_id: EntryId(4),
            lang: "it".to_string(),
            lemma: "cuore".to_string(),
        };

        let serialized = serde_json_round_trip(&term);
        assert_eq!(serialized, term);

        let value = LanguageValue {
            id: ValueId(9),
            entry_id: EntryId(4),
            language_id: LanguageId(2),
            property_id: PropertyId(5),
            value: "definition text".to_string(),
        };
        assert_eq!(serde_json_round_trip(&value), value);
    }

    fn serde_json_round_trip<T>(row: &T) -> T
    where
        T: Serialize + for<'de> Deserialize<'de>,
    {
        let text = serde_json::to_string(row).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}
