/// Pages and decks are identified by random v4 UUIDs, stable across
/// reordering and outline regeneration.
pub type PageId = uuid::Uuid;

/// Identifier of a deck (one presentation).
pub type DeckId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
