use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};
use log::{debug, info};

use crate::dataset::{Dataset, Record, SensorSample, SessionTask, TaskMarker};

/// Union of one or more recordings, keyed by record id.
///
/// Ids are unique across recordings, so merging is a plain set union: the
/// first record seen with a given id is kept and later copies are ignored.
#[derive(Debug, Default)]
pub struct Store {
    tasks: BTreeMap<String, SessionTask>,
    samples: BTreeMap<String, SensorSample>,
    markers: BTreeMap<String, TaskMarker>,
}

/// Outcome of one merge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub ignored: usize,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Read and merge several recording folders, in order
    pub fn open<P: AsRef<Path>>(folders: &[P]) -> Result<Store> {
        let mut store = Store::new();
        for folder in folders {
            let folder = folder.as_ref();
            info!("Merging {}", folder.display());
            let records = Dataset::new(folder)?
                .read_all()
                .with_context(|| format!("Failed to read recording {}", folder.display()))?;
            store.merge(records);
        }
        Ok(store)
    }

    pub fn merge<I: IntoIterator<Item = Record>>(&mut self, records: I) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in records {
            let inserted = match record {
                Record::Task(task) => insert_or_ignore(&mut self.tasks, task.id.clone(), task),
                Record::Sample(sample) => {
                    insert_or_ignore(&mut self.samples, sample.id.clone(), sample)
                }
                Record::Marker(marker) => {
                    insert_or_ignore(&mut self.markers, marker.id.clone(), marker)
                }
            };
            if inserted {
                stats.inserted += 1;
            } else {
                stats.ignored += 1;
            }
        }
        debug!(
            "merged {} records, ignored {} duplicates",
            stats.inserted, stats.ignored
        );
        stats
    }

    /// Distinct participants, sorted
    pub fn participants(&self) -> Vec<&str> {
        self.tasks
            .values()
            .map(|t| t.participant_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn session_tasks(&self, participant_id: &str) -> Vec<&SessionTask> {
        self.tasks
            .values()
            .filter(|t| t.participant_id == participant_id)
            .collect()
    }

    /// Samples of a task ordered by timestamp
    pub fn samples(&self, session_task_id: &str) -> Vec<&SensorSample> {
        let mut samples: Vec<&SensorSample> = self
            .samples
            .values()
            .filter(|s| s.session_task_id == session_task_id)
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        samples
    }

    /// Markers of a task ordered by timestamp
    pub fn markers(&self, session_task_id: &str) -> Vec<&TaskMarker> {
        let mut markers: Vec<&TaskMarker> = self
            .markers
            .values()
            .filter(|m| m.session_task_id == session_task_id)
            .collect();
        markers.sort_by_key(|m| m.timestamp);
        markers
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

fn insert_or_ignore<T>(table: &mut BTreeMap<String, T>, id: String, value: T) -> bool {
    if table.contains_key(&id) {
        return false;
    }
    table.insert(id, value);
    true
}
