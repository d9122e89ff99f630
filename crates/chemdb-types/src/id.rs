use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DbError;

/// Length of the raw identifier in bytes.
pub const ID_BYTES: usize = 12;

/// Length of the canonical hex form in characters.
pub const ID_HEX_CHARS: usize = 2 * ID_BYTES;

/// Globally unique, time-ordered surrogate key for one stored record.
///
/// Layout of the 12 bytes:
///
/// - bytes 0..4 — creation time as big-endian UNIX seconds
/// - bytes 4..9 — per-process random value, drawn once at first use
/// - bytes 9..12 — big-endian counter, randomly seeded, incremented per id
///
/// Byte-wise comparison therefore yields a total order consistent with
/// creation time across processes, and with generation order within one
/// process. Two generators running in the same second still produce
/// almost-certainly distinct values via the process entropy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_BYTES]);

/// Per-process generator state: 5 random bytes plus a monotonic counter.
struct Generator {
    process_entropy: [u8; 5],
    counter: AtomicU32,
}

fn generator() -> &'static Generator {
    static GENERATOR: OnceLock<Generator> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let mut entropy = [0u8; 5];
        rng.fill_bytes(&mut entropy);
        Generator {
            process_entropy: entropy,
            counter: AtomicU32::new(rng.next_u32() & 0x00ff_ffff),
        }
    })
}

impl Id {
    /// Generate a fresh identifier. Never null, never repeats in-process.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let state = generator();
        let count = state.counter.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_BYTES];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&state.process_entropy);
        // Low 24 bits only; the counter wraps at 2^24 like the timestamp
        // rolls over seconds, which keeps ordering stable for any realistic
        // generation rate.
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Create an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// The raw 12 bytes.
    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }

    /// Canonical 24-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the canonical hex form. Round-trip exact with [`Id::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, DbError> {
        if s.len() != ID_HEX_CHARS {
            return Err(DbError::MalformedIdentifier(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| DbError::MalformedIdentifier(s.to_string()))?;
        let mut arr = [0u8; ID_BYTES];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The embedded creation time as UNIX seconds.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_hex())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Id {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
