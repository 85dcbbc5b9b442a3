//! Record store: id generation, lookups and reference resolution over a
//! [`RunStore`], plus the filesystem backing in [`fs`].

pub mod fs;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::error::{Result, StoreError};
use crate::domain::run::{Run, RunStore};

pub use fs::{resolve_store_path, FsRunStore, StoreLayout};

const ID_SUFFIX_LEN: usize = 8;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a run id of the form `run-{unix millis}-{8 base36 chars}`.
///
/// The suffix is drawn from a v4 UUID, so ids minted in the same millisecond
/// still differ.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut entropy = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(ID_SUFFIX_LEN);
    for _ in 0..ID_SUFFIX_LEN {
        suffix.push(BASE36[(entropy % 36) as usize] as char);
        entropy /= 36;
    }
    format!("run-{}-{}", millis, suffix)
}

impl RunStore {
    pub fn get(&self, id: &str) -> Option<&Run> {
        self.runs.get(id)
    }

    /// All runs whose label equals `label` exactly.
    pub fn find_by_label(&self, label: &str) -> Vec<&Run> {
        self.runs
            .values()
            .filter(|run| run.label.as_deref() == Some(label))
            .collect()
    }

    /// Insert `run`, replacing any existing entry with the same id.
    ///
    /// Returns the replaced run, if any. Persisting is the caller's job.
    pub fn add_run(&mut self, run: Run) -> Option<Run> {
        self.runs.insert(run.id.clone(), run)
    }

    /// Remove the run with `id`. Absent ids are a no-op.
    pub fn delete_run(&mut self, id: &str) -> Option<Run> {
        self.runs.remove(id)
    }

    /// Runs ordered by creation time, then id.
    pub fn list(&self) -> Vec<&Run> {
        let mut runs: Vec<&Run> = self.runs.values().collect();
        runs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        runs
    }

    pub fn count(&self) -> usize {
        self.runs.len()
    }

    /// Resolve a full id, a unique label, or an unambiguous id prefix to a run id.
    ///
    /// Lookup order is exact id, then label, then prefix. A label or prefix
    /// matching several runs is an error listing every candidate.
    pub fn resolve_id(&self, reference: &str) -> Result<String> {
        if reference.is_empty() {
            return Err(StoreError::NotFound(reference.to_string()));
        }
        if self.runs.contains_key(reference) {
            return Ok(reference.to_string());
        }

        let by_label: Vec<String> = self
            .runs
            .iter()
            .filter(|(_, run)| run.label.as_deref() == Some(reference))
            .map(|(id, _)| id.clone())
            .collect();
        if let Some(id) = single_match(reference, by_label)? {
            return Ok(id);
        }

        let by_prefix: Vec<String> = self
            .runs
            .keys()
            .filter(|id| id.starts_with(reference))
            .cloned()
            .collect();
        if let Some(id) = single_match(reference, by_prefix)? {
            return Ok(id);
        }

        Err(StoreError::NotFound(reference.to_string()))
    }

    /// Resolve `reference` and return the run it names.
    pub fn resolve(&self, reference: &str) -> Result<&Run> {
        let id = self.resolve_id(reference)?;
        self.runs
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))
    }
}

fn single_match(reference: &str, mut candidates: Vec<String>) -> Result<Option<String>> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => Err(StoreError::Ambiguous {
            reference: reference.to_string(),
            candidates,
        }),
    }
}
