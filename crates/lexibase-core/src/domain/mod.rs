//! Domain layer: records, criteria, line items, repository contracts,
//! and change events

pub mod criteria;
pub mod events;
pub mod line_item;
pub mod records;
pub mod repository;
