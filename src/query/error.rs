//! Reasons a candidate query is dropped.

use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A candidate that contributes zero samples.
///
/// Rejections never abort a run; the driver logs them via [`Rejection::log`]
/// and moves on to the next branch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Template line failed structural checks.
    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    /// A token was handed to the slot resolver without a `{…}` slot.
    #[error("token '{0}' contains no template slot")]
    MalformedSlot(String),

    #[error("template slot {0} not recognized")]
    UnknownSlot(String),

    /// Every remaining slot waits on another one.
    #[error("no slot can be resolved in: {0}")]
    Stalled(String),

    #[error("no direct join path between {from} and {to}")]
    NoJoinPath { from: String, to: String },

    #[error("aggregation over a single table {0}")]
    SingleTableAggregation(String),

    #[error("table {0} has no default column")]
    MissingDefaultColumn(String),

    #[error("unknown table {0}")]
    UnknownTable(String),

    #[error("unknown column {table}.{column}")]
    UnknownColumn { table: String, column: String },

    /// An ordering comparison against a non-numeric literal.
    #[error("numeric comparison on non-numeric value in: {0}")]
    NumericComparison(String),

    #[error("{0}")]
    ArgumentCount(String),

    #[error("no literals observed for {table}.{column}")]
    EmptyLiteralPool { table: String, column: String },

    #[error("literal substitution requested without a database")]
    NoLiteralSource,

    #[error("invalid query: {0}")]
    ValidationFailed(String),

    #[error("could not create SQL label for {sql}: {reason}")]
    Unlabelable { sql: String, reason: String },

    #[error("unresolved slot in: {0}")]
    UnresolvedSlots(String),

    #[error("recursion depth {0} exceeded")]
    DepthExceeded(usize),
}

impl Rejection {
    /// Log at the level matching the kind of failure.
    pub fn log(&self, context: &str) {
        match self {
            Rejection::NoJoinPath { .. } | Rejection::SingleTableAggregation(_) => {
                info!("dropped query: {} ({})", self, context)
            }
            Rejection::NumericComparison(_) | Rejection::Stalled(_) => {
                debug!("dropped query: {} ({})", self, context)
            }
            Rejection::UnknownSlot(_) | Rejection::ValidationFailed(_) => {
                warn!("dropped query: {} ({})", self, context)
            }
            _ => error!("dropped query: {} ({})", self, context),
        }
    }
}
