//! Request handlers, grouped per resource.

pub mod decks;
pub mod generation;
