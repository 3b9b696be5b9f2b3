use std::collections::BTreeMap;

use serde::Serialize;

/// The full set of observed listing entries at one point in time, keyed by
/// entry name. Timestamp values are opaque upstream tokens, only ever
/// compared for string equality.
///
/// A `BTreeMap` keeps the persisted JSON sorted by name, so consecutive
/// state files diff cleanly.
pub type Snapshot = BTreeMap<String, String>;

/// One classified difference between two snapshots. A name appears in at
/// most one event per diff run. Events are ephemeral; only snapshots are
/// persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeEvent {
    Added {
        name: String,
        timestamp: String,
    },
    Removed {
        name: String,
        timestamp: String,
    },
    Modified {
        name: String,
        previous: String,
        current: String,
    },
}

impl ChangeEvent {
    pub fn name(&self) -> &str {
        match self {
            ChangeEvent::Added { name, .. }
            | ChangeEvent::Removed { name, .. }
            | ChangeEvent::Modified { name, .. } => name,
        }
    }
}
