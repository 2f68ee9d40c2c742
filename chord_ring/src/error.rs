//! Error types for ring operations.

/// Errors reported by ring operations. All of these are recoverable at the
/// call site; none of them leaves the ring in a worse state than before.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The id is outside the identifier space or already taken by a live
    /// member.
    #[error("invalid node id {id}: out of range or already present (ring capacity {capacity})")]
    InvalidNodeId { id: u64, capacity: u64 },

    /// The target of a delete was not a live member.
    #[error("node {0} not found")]
    NodeNotFound(u64),

    /// The member responsible for the key does not hold it.
    #[error("'{key}' (id {id}) is not stored in the ring")]
    DataNotFound { key: String, id: u64 },

    /// Every member has left; lookups and inserts have no entry point.
    #[error("the ring has no live members")]
    EmptyRing,

    /// A lookup could not close within its hop budget, or a link pointed at
    /// a member that no longer exists.
    #[error("routing for id {key} gave up after {hops} hops")]
    RoutingInconsistency { key: u64, hops: usize },

    /// Ring order must produce identifiers that fit in a u64.
    #[error("ring order m={0} must be between 1 and 63")]
    InvalidRingOrder(u32),
}
