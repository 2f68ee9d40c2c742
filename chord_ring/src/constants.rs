pub const MAX_RING_ORDER: u32 = 63;
pub const HOP_CAP_FACTOR: usize = 8;
pub const JOIN_MAX_RETRIES: usize = 64;
pub const JOIN_WORKERS: usize = 4;

// Intervals
pub const STABILIZE_INTERVAL_MS: u64 = 15_000;
