//! Domain value types shared across the data and service layers.
//!
//! Enums persisted as strings carry `as_str`/`parse` pairs so the entity
//! layer stays plain `String` columns and stays portable across storage
//! backends.

pub mod confidence;
pub mod issue;
pub mod run;
pub mod snapshot;
