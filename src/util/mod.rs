//! Leaf utilities shared by every comparison the matching and drift layers
//! perform: text canonicalization, free-text hint extraction, and fuzzy
//! similarity scoring.

pub mod hint;
pub mod similarity;
pub mod text;
