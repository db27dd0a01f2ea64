//!
//! Lexibase Core - record model and editing engines for termbases
//!
//! This crate defines the termbase record schema, the repository contract
//! persistence backends implement, and the two engines built on top of
//! them: criteria matching over term records and the edit-session
//! reconciliation of a flattened entry editor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - records, criteria, repository contracts, events
pub mod domain;

/// Application services - catalog, matching, edit sessions, feeds
pub mod application;

/// Error types
pub mod error;

// Re-export key types
pub use error::CoreError;

pub use domain::criteria::{MatchDescriptor, SearchCriterion};
pub use domain::events::{ChangeEvent, ChangeNotifier};
pub use domain::line_item::{LemmaRow, LineItem, PropertyParent, PropertyRow};
pub use domain::records::{
    DescriptorId, DescriptorTarget, Entry, EntryId, EntryValue, InputDescriptor, Language,
    LanguageId, LanguageValue, Property, PropertyId, PropertyKind, PropertyLevel, Term, TermId,
    TermValue, Termbase, TermbaseId, ValueId,
};
pub use domain::repository::{RecordRepository, RecordStore, SchemaRepository, ValueRepository};

pub use application::catalog::SchemaCatalog;
pub use application::edit_session::{EditSession, SessionMode};
pub use application::entry_feed::{EntryFeed, FeedConfig, TermbaseFeed};
pub use application::match_engine::MatchEngine;
pub use application::media::MediaStore;
