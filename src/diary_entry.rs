use chrono::{DateTime, Duration, Local, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MOOD: &str = "happy";

/// Moods offered by the editor. Stored moods are free-form strings, so this
/// list only drives the picker.
pub const MOODS: &[&str] = &["happy", "calm", "excited", "tired", "sad", "anxious", "angry"];

fn default_mood() -> String {
    DEFAULT_MOOD.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    /// Photo embedded as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Builds a brand-new entry from a draft with a fresh id and
    /// `created_at == updated_at == now`.
    pub fn new(draft: EntryDraft) -> Self {
        let now = now();
        DiaryEntry {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            title: draft.title,
            content: draft.content,
            mood: draft.mood,
            image: draft.image,
            music_link: draft.music_link,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a patch onto the entry and bumps `updated_at`.
    pub fn apply(&mut self, patch: EntryPatch) {
        let EntryPatch {
            date,
            title,
            content,
            mood,
            image,
            music_link,
        } = patch;

        if let Some(date) = date {
            self.date = date;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(mood) = mood {
            self.mood = mood;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if let Some(music_link) = music_link {
            self.music_link = music_link;
        }
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// First non-blank line of the content, used for list previews.
    pub fn headline(&self) -> &str {
        self.content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// An entry under edit that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub mood: String,
    pub image: Option<String>,
    pub music_link: Option<String>,
}

impl EntryDraft {
    pub fn new(content: impl Into<String>) -> Self {
        EntryDraft {
            content: content.into(),
            ..EntryDraft::default()
        }
    }

    /// Draft prefilled from an existing entry, for the edit screen.
    pub fn from_entry(entry: &DiaryEntry) -> Self {
        EntryDraft {
            date: entry.date,
            title: entry.title.clone(),
            content: entry.content.clone(),
            mood: entry.mood.clone(),
            image: entry.image.clone(),
            music_link: entry.music_link.clone(),
        }
    }

    /// Patch that overwrites every user-editable field of an entry with this draft.
    pub fn into_patch(self) -> EntryPatch {
        EntryPatch {
            date: Some(self.date),
            title: Some(self.title),
            content: Some(self.content),
            mood: Some(self.mood),
            image: Some(self.image),
            music_link: Some(self.music_link),
        }
    }
}

impl Default for EntryDraft {
    fn default() -> Self {
        EntryDraft {
            date: Local::now().date_naive(),
            title: None,
            content: String::new(),
            mood: default_mood(),
            image: None,
            music_link: None,
        }
    }
}

/// Partial update of an entry. `None` leaves a field alone; for the optional
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub image: Option<Option<String>>,
    pub music_link: Option<Option<String>>,
}

impl EntryPatch {
    pub fn content(content: impl Into<String>) -> Self {
        EntryPatch {
            content: Some(content.into()),
            ..EntryPatch::default()
        }
    }
}

/// Current time at millisecond precision, matching what the snapshot stores.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A timestamp strictly later than `previous`, even on a coarse or stalled clock.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
