//! Filesystem-backed thumbnail derivation and image persistence.
//!
//! Generated images land under `<root>/decks/<deck_id>/` as
//! `{name}_{uuid}_{timestamp}` files with a JSON sidecar describing the
//! stored image.  Persistence failures are surfaced as errors but are
//! non-fatal to the generation pipeline.

pub mod fs;
pub mod preview;

pub use fs::FsImageStore;
