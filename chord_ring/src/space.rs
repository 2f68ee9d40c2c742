use sha1::{Digest, Sha1};

use crate::constants::MAX_RING_ORDER;
use crate::error::NetworkError;

/// The circular identifier space `[0, 2^m)`. Constructed once per ring and
/// passed by value to every member; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierSpace {
    m: u32,
    ring_size: u64,
}

impl IdentifierSpace {
    pub fn new(m: u32) -> Result<Self, NetworkError> {
        if m == 0 || m > MAX_RING_ORDER {
            return Err(NetworkError::InvalidRingOrder(m));
        }
        Ok(IdentifierSpace {
            m,
            ring_size: 1u64 << m,
        })
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    pub fn ring_size(&self) -> u64 {
        self.ring_size
    }

    pub fn contains(&self, id: u64) -> bool {
        id < self.ring_size
    }

    /// Hash a raw key onto the ring: SHA-1 over the UTF-8 bytes, keep the
    /// most-significant `ceil(m/8)` bytes big-endian, and shift off the
    /// excess bits when `m` is not a multiple of 8.
    pub fn hash(&self, key: &str) -> u64 {
        let mut hasher = Sha1::new();
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();

        let required = ((self.m + 7) / 8) as usize;
        let mut id = 0u64;
        for byte in &digest[..required] {
            id = (id << 8) | u64::from(*byte);
        }
        if self.m % 8 != 0 {
            id >>= 8 - self.m % 8;
        }
        id
    }

    /// Clockwise steps from `a` to `b`. This is the only ordering used on
    /// the ring; raw id comparisons do not respect the wraparound.
    pub fn distance(&self, a: u64, b: u64) -> u64 {
        if a <= b {
            b - a
        } else {
            self.ring_size - a + b
        }
    }

    /// Start of finger `i` for a member: `(id + 2^i) mod ring_size`.
    pub fn finger_start(&self, id: u64, i: u32) -> u64 {
        (id + (1u64 << i)) % self.ring_size
    }
}
