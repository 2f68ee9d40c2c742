use serde::Serialize;

/// Point-in-time view of one member, for graph rendering and state dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeExport {
    pub id: u64,
    pub predecessor: u64,
    pub successor: u64,
    /// Stored `(hashed key, original value)` pairs, ascending by key.
    pub keys: Vec<KeyEntry>,
    /// Finger entries as `(start, target member id)` pairs, one per bit.
    pub fingers: Vec<FingerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEntry {
    pub key: u64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FingerEntry {
    pub start: u64,
    pub node: u64,
}
