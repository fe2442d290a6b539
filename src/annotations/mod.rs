//! Per-thread user annotations: favorites, applied, hidden and notes.
//!
//! `Annotations` is an immutable snapshot. The `with_*` setters return
//! a new snapshot and leave the receiver untouched, so a filter pass
//! can hold a reference while an edit produces the next state.
//!
//! The JSON form keys every map by thread id, then by posting id. The
//! key names used by the browser viewer's local storage
//! (`favoriteHNv1`, `appliedHNv1`, `hiddenHNv1`, `notesHNv1`) are
//! accepted as aliases so an export can be read as-is.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

type FlagMap = BTreeMap<String, BTreeMap<String, bool>>;
type NoteMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, alias = "favoriteHNv1")]
    favorites: FlagMap,
    #[serde(default, alias = "appliedHNv1")]
    applied: FlagMap,
    #[serde(default, alias = "hiddenHNv1")]
    hidden: FlagMap,
    #[serde(default, alias = "notesHNv1")]
    notes: NoteMap,
}

impl Annotations {
    /// Read an annotation export from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read annotations at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse annotations at {}", path.display()))
    }

    /// Borrowed view of one thread's annotations.
    pub fn for_thread(&self, thread_id: &str) -> ThreadAnnotations<'_> {
        ThreadAnnotations {
            favorites: self.favorites.get(thread_id),
            applied: self.applied.get(thread_id),
            hidden: self.hidden.get(thread_id),
            notes: self.notes.get(thread_id),
        }
    }

    /// Snapshot with the posting's favorite flag set or cleared.
    ///
    /// Clearing removes the entry (and an emptied thread map) instead
    /// of storing `false`, so a cleared snapshot equals one that never
    /// had the flag.
    pub fn with_favorite(&self, thread_id: &str, job_id: &str, value: bool) -> Self {
        let mut next = self.clone();
        set_flag(&mut next.favorites, thread_id, job_id, value);
        next
    }

    /// Snapshot with the posting's applied flag set or cleared.
    pub fn with_applied(&self, thread_id: &str, job_id: &str, value: bool) -> Self {
        let mut next = self.clone();
        set_flag(&mut next.applied, thread_id, job_id, value);
        next
    }

    /// Snapshot with the posting's hidden flag set or cleared.
    pub fn with_hidden(&self, thread_id: &str, job_id: &str, value: bool) -> Self {
        let mut next = self.clone();
        set_flag(&mut next.hidden, thread_id, job_id, value);
        next
    }

    /// Snapshot with the posting's note replaced; blank text removes
    /// the note.
    pub fn with_note(&self, thread_id: &str, job_id: &str, note: &str) -> Self {
        let mut next = self.clone();
        if note.trim().is_empty() {
            remove_entry(&mut next.notes, thread_id, job_id);
        } else {
            next.notes
                .entry(thread_id.to_string())
                .or_default()
                .insert(job_id.to_string(), note.to_string());
        }
        next
    }
}

fn set_flag(map: &mut FlagMap, thread_id: &str, job_id: &str, value: bool) {
    if value {
        map.entry(thread_id.to_string())
            .or_default()
            .insert(job_id.to_string(), true);
    } else {
        remove_entry(map, thread_id, job_id);
    }
}

fn remove_entry<V>(map: &mut BTreeMap<String, BTreeMap<String, V>>, thread_id: &str, job_id: &str) {
    if let Some(jobs) = map.get_mut(thread_id) {
        jobs.remove(job_id);
        if jobs.is_empty() {
            map.remove(thread_id);
        }
    }
}

/// Annotations of a single thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAnnotations<'a> {
    favorites: Option<&'a BTreeMap<String, bool>>,
    applied: Option<&'a BTreeMap<String, bool>>,
    hidden: Option<&'a BTreeMap<String, bool>>,
    notes: Option<&'a BTreeMap<String, String>>,
}

impl<'a> ThreadAnnotations<'a> {
    pub fn is_favorite(&self, job_id: &str) -> bool {
        flag(self.favorites, job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        flag(self.applied, job_id)
    }

    pub fn is_hidden(&self, job_id: &str) -> bool {
        flag(self.hidden, job_id)
    }

    /// Note text, if any. May be blank.
    pub fn note(&self, job_id: &str) -> Option<&'a str> {
        self.notes?.get(job_id).map(String::as_str)
    }

    pub fn has_note(&self, job_id: &str) -> bool {
        self.note(job_id).is_some_and(|note| !note.trim().is_empty())
    }
}

fn flag(map: Option<&BTreeMap<String, bool>>, job_id: &str) -> bool {
    map.and_then(|jobs| jobs.get(job_id)).copied().unwrap_or(false)
}
