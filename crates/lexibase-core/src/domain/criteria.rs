//! Search criteria consumed by the match engine
//!
//! A filter is a list of criteria, ANDed together; inside one criterion the
//! descriptors are ORed. Descriptors address either a lemma or a property,
//! optionally pinned to a language.

use serde::{Deserialize, Serialize};

use super::records::PropertyId;

/// One search criterion of a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchCriterion {
    /// Exact string equality
    Exact {
        /// Text the stored value must equal
        text: String,

        /// Fields this criterion applies to, ORed
        targets: Vec<MatchDescriptor>,
    },

    /// Case-sensitive substring containment
    Fuzzy {
        /// Text the stored value must contain; empty means "no constraint"
        text: String,

        /// Fields this criterion applies to, ORed
        targets: Vec<MatchDescriptor>,
    },
}

impl SearchCriterion {
    /// The criterion's search text
    pub fn text(&self) -> &str {
        match self {
            Self::Exact { text, .. } | Self::Fuzzy { text, .. } => text,
        }
    }

    /// The fields this criterion applies to
    pub fn targets(&self) -> &[MatchDescriptor] {
        match self {
            Self::Exact { targets, .. } | Self::Fuzzy { targets, .. } => targets,
        }
    }

    /// Whether a stored value satisfies this criterion's text test
    ///
    /// A fuzzy criterion with empty text accepts every existing value; it is
    /// an existence test, used to back a single search box spanning all
    /// searchable fields before the user has typed anything.
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            Self::Exact { text, .. } => candidate == text,
            Self::Fuzzy { text, .. } => candidate.contains(text.as_str()),
        }
    }

    /// Whether the engine skips this criterion outright
    ///
    /// Criteria without targets constrain nothing; an exact criterion with
    /// empty text is treated as "no constraint yet" rather than matching
    /// only empty values.
    pub fn is_inert(&self) -> bool {
        if self.targets().is_empty() {
            return true;
        }
        matches!(self, Self::Exact { text, .. } if text.is_empty())
    }
}

/// One field addressed by a criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchDescriptor {
    /// The literal lemma of a term in the given language
    Lemma {
        /// Language code the term itself must carry
        lang: String,
    },

    /// A user-defined property; entry-level when `lang` is `None`
    Property {
        /// The property to test
        property_id: PropertyId,

        /// Language scope; `None` addresses entry-scoped values
        lang: Option<String>,
    },
}
