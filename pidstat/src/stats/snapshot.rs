//! Point-in-time copies of the stats map

use aya::maps::{HashMap, Map, MapData, MapError};
use pidstat_common::Stats;
use std::borrow::Borrow;
use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;

use crate::domain::{Pid, ReaderError};

/// Counters of every pid present in the table at read time, ordered by pid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<Pid, Stats>,
}

impl Snapshot {
    pub fn get(&self, pid: Pid) -> Option<&Stats> {
        self.entries.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Pid, Stats> {
        self.entries.iter()
    }
}

impl FromIterator<(Pid, Stats)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Pid, Stats)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Copy every entry of the stats map
///
/// The probe keeps inserting (and, for the LRU variant, evicting) while we
/// iterate, so a key that disappears between being listed and being read is
/// skipped rather than treated as an error.
///
/// # Errors
/// Returns an error if the map cannot be iterated
pub fn read_snapshot<T: Borrow<MapData>>(
    map: &HashMap<T, u32, Stats>,
) -> Result<Snapshot, ReaderError> {
    let mut entries = BTreeMap::new();
    for item in map.iter() {
        match item {
            Ok((pid, stats)) => {
                entries.insert(Pid(pid), stats);
            }
            Err(MapError::KeyNotFound) => {}
            Err(e) => return Err(ReaderError::ReadFailed(e)),
        }
    }
    Ok(Snapshot { entries })
}

/// Open a stats map pinned on bpffs by a running probe
///
/// # Errors
/// Returns an error if nothing usable is pinned at `path`
pub fn open_pinned(path: &Path) -> Result<HashMap<MapData, u32, Stats>, ReaderError> {
    let data = MapData::from_pin(path).map_err(|e| ReaderError::PinnedMapUnavailable {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    // Hash and LRU hash maps are read through the same syscalls
    let map = HashMap::try_from(Map::HashMap(data))?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_ordered_by_pid() {
        let snapshot: Snapshot =
            [(Pid(30), Stats::ZERO), (Pid(2), Stats::ZERO), (Pid(100), Stats::ZERO)]
                .into_iter()
                .collect();
        let pids: Vec<u32> = snapshot.iter().map(|(pid, _)| pid.0).collect();
        assert_eq!(pids, vec![2, 30, 100]);
    }

    #[test]
    fn test_open_missing_pin_fails() {
        let result = open_pinned(Path::new("/nonexistent/bpf/stats_map"));
        assert!(matches!(result, Err(ReaderError::PinnedMapUnavailable { .. })));
    }
}
