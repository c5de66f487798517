//! # sqlsynth
//!
//! Synthetic NL/SQL corpus generation by recursive template expansion, with
//! a SQL canonicalizer for deduplicating equivalent queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Templates (NL \t SQL) + slot dictionary           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Query: join/argmax variants, slot filling            │
//! │     against the Schema (tables, types, links)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [generation]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Depth-first expansion with layer-decayed pruning     │
//! │     → marker resolution → literals → validation          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [canonical]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Canonical SQL + sqlparser label + paraphrases        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod canonical;
pub mod config;
pub mod db;
pub mod generation;
pub mod paraphrase;
pub mod query;
pub mod schema;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::canonical::{canonicalize, Canonicalizer, Pass};
    pub use crate::config::{GenerationSettings, Settings};
    pub use crate::db::{Database, InMemoryDatabase, LiteralSource, QueryValidator, SqliteDatabase};
    pub use crate::generation::{Generator, Sample, SampleRecord};
    pub use crate::paraphrase::{NoParaphrase, Paraphraser, PpdbParaphraser};
    pub use crate::query::{FillContext, PhraseTables, Query, Rejection, Resolution, SlotDictionary};
    pub use crate::schema::{find_join_path, CanonicalSchema, JoinKind, Schema};
}
