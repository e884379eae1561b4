use crate::diary_entry::{now, DiaryEntry, EntryDraft, EntryPatch};
use crate::errors::{DiaryError, DiaryResult};
use crate::storage::SnapshotStorage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const ENTRIES_KEY: &str = "diaryEntries";
/// Prefix of the keys corrupt snapshots are copied to.
pub const CORRUPT_KEY: &str = "diaryEntries.corrupt";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    entries: &'a [DiaryEntry],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotIn {
    Versioned {
        version: u32,
        entries: Vec<DiaryEntry>,
    },
    // Version-less layout: a bare array of entries.
    Legacy(Vec<DiaryEntry>),
}

/// What was found in storage at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Vec<DiaryEntry>),
    Empty,
    /// The snapshot exists but could not be decoded; the raw bytes are kept so
    /// the caller can decide what to do with them.
    Corrupt(Vec<u8>),
}

pub fn decode_snapshot(bytes: &[u8]) -> LoadOutcome {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return LoadOutcome::Empty;
    }
    match serde_json::from_slice::<SnapshotIn>(bytes) {
        Ok(SnapshotIn::Versioned { version, entries }) if version <= SNAPSHOT_VERSION => {
            LoadOutcome::Loaded(entries)
        }
        Ok(SnapshotIn::Versioned { version, .. }) => {
            warn!(version, "snapshot written by a newer version");
            LoadOutcome::Corrupt(bytes.to_vec())
        }
        Ok(SnapshotIn::Legacy(entries)) => LoadOutcome::Loaded(entries),
        Err(e) => {
            warn!(error = %e, "snapshot could not be decoded");
            LoadOutcome::Corrupt(bytes.to_vec())
        }
    }
}

/// First unused `diaryEntries.corrupt.<utc timestamp>[-n]` key.
fn backup_key<S: SnapshotStorage>(storage: &S) -> DiaryResult<String> {
    let stamp = now().format("%Y%m%dT%H%M%S%3fZ");
    let base = format!("{CORRUPT_KEY}.{stamp}");
    let mut key = base.clone();
    let mut n = 1;
    while storage.read(&key)?.is_some() {
        key = format!("{base}-{n}");
        n += 1;
    }
    Ok(key)
}

pub fn encode_snapshot(entries: &[DiaryEntry]) -> DiaryResult<Vec<u8>> {
    Ok(serde_json::to_vec(&SnapshotOut {
        version: SNAPSHOT_VERSION,
        entries,
    })?)
}

/// Owner of the diary entries and their durability.
///
/// Every mutation rewrites the whole snapshot before the in-memory list
/// changes, so a failed write leaves the store exactly as it was.
pub struct EntryStore<S: SnapshotStorage> {
    storage: S,
    entries: Vec<DiaryEntry>,
}

impl<S: SnapshotStorage> EntryStore<S> {
    /// Reads the persisted snapshot without building a store.
    pub fn load(storage: &S) -> DiaryResult<LoadOutcome> {
        Ok(match storage.read(ENTRIES_KEY)? {
            Some(bytes) => decode_snapshot(&bytes),
            None => LoadOutcome::Empty,
        })
    }

    /// Opens the store. A corrupt snapshot is copied aside under a
    /// timestamped key starting with [`CORRUPT_KEY`] and the store starts
    /// empty. Earlier backups are never overwritten.
    pub fn open(mut storage: S) -> DiaryResult<Self> {
        let entries = match Self::load(&storage)? {
            LoadOutcome::Loaded(entries) => {
                info!(count = entries.len(), "diary loaded");
                entries
            }
            LoadOutcome::Empty => {
                info!("no existing diary found, starting a new one");
                Vec::new()
            }
            LoadOutcome::Corrupt(raw) => {
                let backup = backup_key(&storage)?;
                warn!(
                    bytes = raw.len(),
                    %backup,
                    "diary snapshot is corrupt, keeping a copy and starting empty"
                );
                storage.write(&backup, &raw)?;
                Vec::new()
            }
        };
        Ok(Self::from_entries(storage, entries))
    }

    pub fn from_entries(storage: S, entries: Vec<DiaryEntry>) -> Self {
        EntryStore { storage, entries }
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Creates an entry at the head of the list. Content is not validated here;
    /// that is the editor's job.
    pub fn add(&mut self, draft: EntryDraft) -> DiaryResult<DiaryEntry> {
        let entry = DiaryEntry::new(draft);
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry.clone());
        next.extend(self.entries.iter().cloned());
        self.commit(next)?;
        debug!(id = %entry.id, "entry added");
        Ok(entry)
    }

    /// Merges `patch` onto the entry with `id`. Returns `false` (and writes
    /// nothing) when no such entry exists.
    pub fn update(&mut self, id: &str, patch: EntryPatch) -> DiaryResult<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "update ignored, entry not found");
            return Ok(false);
        };
        let mut next = self.entries.clone();
        next[index].apply(patch);
        self.commit(next)?;
        debug!(id, "entry updated");
        Ok(true)
    }

    /// Removes the entry with `id`. Returns `false` when it did not exist.
    pub fn delete(&mut self, id: &str) -> DiaryResult<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "delete ignored, entry not found");
            return Ok(false);
        };
        let mut next = self.entries.clone();
        next.remove(index);
        self.commit(next)?;
        debug!(id, "entry deleted");
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn require(&self, id: &str) -> DiaryResult<&DiaryEntry> {
        self.get(id).ok_or_else(|| DiaryError::NotFound(id.to_string()))
    }

    pub fn search(&self, query: &str) -> Vec<DiaryEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.content.to_lowercase().contains(&query)
                    || e.mood.to_lowercase().contains(&query)
                    || e
                        .title
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn commit(&mut self, next: Vec<DiaryEntry>) -> DiaryResult<()> {
        let bytes = encode_snapshot(&next)?;
        self.storage.write(ENTRIES_KEY, &bytes)?;
        self.entries = next;
        Ok(())
    }
}
