//! Domain model: value objects, aggregates, events and the totals engine
pub mod aggregates;
pub mod events;
pub mod totals;
pub mod value_objects;
