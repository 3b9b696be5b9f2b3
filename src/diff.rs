use std::collections::BTreeSet;

use crate::model::{ChangeEvent, Snapshot};

/// Classifies the differences between two snapshots.
///
/// Every name in the union of both key sets is considered exactly once:
/// present only in `current` is `Added`, only in `previous` is `Removed`,
/// present in both with unequal timestamp strings is `Modified`, equal
/// timestamps emit nothing. Pure and deterministic; events come out in
/// lexicographic name order.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<ChangeEvent> {
    let names: BTreeSet<&str> = previous
        .keys()
        .chain(current.keys())
        .map(String::as_str)
        .collect();

    let mut events = Vec::new();
    for name in names {
        match (previous.get(name), current.get(name)) {
            (None, Some(ts)) => events.push(ChangeEvent::Added {
                name: name.to_string(),
                timestamp: ts.clone(),
            }),
            (Some(ts), None) => events.push(ChangeEvent::Removed {
                name: name.to_string(),
                timestamp: ts.clone(),
            }),
            (Some(prev), Some(cur)) if prev != cur => events.push(ChangeEvent::Modified {
                name: name.to_string(),
                previous: prev.clone(),
                current: cur.clone(),
            }),
            (Some(_), Some(_)) => {}
            (None, None) => unreachable!("name came from the union of both key sets"),
        }
    }
    events
}
