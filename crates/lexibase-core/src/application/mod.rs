//! Application services built over the record store

pub mod catalog;
pub mod edit_session;
pub mod entry_feed;
pub mod match_engine;
pub mod media;
