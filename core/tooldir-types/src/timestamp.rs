//! Server-assigned creation timestamps.
//!
//! Clients never mint these for entries they write: the remote store stamps
//! every created document. The type still carries a monotonic `tick` so a
//! store can hand out strictly increasing stamps for writes that land in
//! the same millisecond.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A creation timestamp as assigned by the store.
///
/// - `wall_time`: milliseconds since Unix epoch
/// - `logical`: counter disambiguating writes within the same millisecond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerTimestamp {
    wall_time: u64,
    logical: u32,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

impl ServerTimestamp {
    /// Creates a timestamp at the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            wall_time: now_millis(),
            logical: 0,
        }
    }

    /// Creates a timestamp from components.
    #[must_use]
    pub const fn new(wall_time: u64, logical: u32) -> Self {
        Self { wall_time, logical }
    }

    /// Creates a timestamp at whole milliseconds.
    #[must_use]
    pub const fn from_millis(wall_time: u64) -> Self {
        Self::new(wall_time, 0)
    }

    /// Returns the wall time component.
    #[must_use]
    pub const fn wall_time(&self) -> u64 {
        self.wall_time
    }

    /// Returns the logical counter.
    #[must_use]
    pub const fn logical(&self) -> u32 {
        self.logical
    }

    /// Generates the next stamp after `self`, never going backwards even if
    /// the wall clock does.
    #[must_use]
    pub fn tick(&self) -> Self {
        let now = now_millis();
        if now > self.wall_time {
            Self {
                wall_time: now,
                logical: 0,
            }
        } else {
            Self {
                wall_time: self.wall_time,
                logical: self.logical.saturating_add(1),
            }
        }
    }
}

impl PartialOrd for ServerTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerTimestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.wall_time.cmp(&other.wall_time) {
            Ordering::Equal => self.logical.cmp(&other.logical),
            other => other,
        }
    }
}

impl fmt::Display for ServerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.wall_time, self.logical)
    }
}

/// Parses `"<millis>"` or `"<millis>.<logical>"`.
impl FromStr for ServerTimestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wall, logical) = match s.split_once('.') {
            Some((wall, logical)) => (wall, Some(logical)),
            None => (s, None),
        };
        let wall_time = wall
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::InvalidTimestamp(format!("{s}: {e}")))?;
        let logical = match logical {
            Some(l) => l
                .trim()
                .parse::<u32>()
                .map_err(|e| Error::InvalidTimestamp(format!("{s}: {e}")))?,
            None => 0,
        };
        Ok(Self::new(wall_time, logical))
    }
}
