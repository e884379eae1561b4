//! The entry currently being written or edited, and everything that happens
//! to it before it reaches the store.

use crate::diary_entry::{DiaryEntry, EntryDraft};
use crate::diary_state::EntryStore;
use crate::errors::{DiaryError, DiaryResult};
use crate::grammar::{GrammarCheckResult, GrammarChecker};
use crate::image;
use crate::storage::SnapshotStorage;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

const NOT_CONFIGURED: &str =
    "Grammar check is not configured. Set DIARY_OPENAI_API_KEY or OPENAI_API_KEY.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short message shown above the editor until it expires.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

impl Notice {
    pub fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Notice {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTICE_TTL
    }
}

type PendingCheck = oneshot::Receiver<DiaryResult<GrammarCheckResult>>;

#[derive(Debug, Default)]
pub struct DraftEditor {
    pub draft: EntryDraft,
    editing: Option<String>,
    pending: Option<PendingCheck>,
    result: Option<GrammarCheckResult>,
    notice: Option<Notice>,
}

impl DraftEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor prefilled with an existing entry; saving updates it in place.
    pub fn for_entry(entry: &DiaryEntry) -> Self {
        DraftEditor {
            draft: EntryDraft::from_entry(entry),
            editing: Some(entry.id.clone()),
            ..Self::default()
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_checking(&self) -> bool {
        self.pending.is_some()
    }

    pub fn grammar_result(&self) -> Option<&GrammarCheckResult> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Sets the entry date from `YYYY-MM-DD` text.
    pub fn set_date(&mut self, raw: &str) -> DiaryResult<()> {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => {
                self.draft.date = date;
                Ok(())
            }
            Err(_) => {
                let err = DiaryError::Validation(format!("'{}' is not a date (YYYY-MM-DD)", raw.trim()));
                self.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Music links are stored as typed; blank clears the link.
    pub fn set_music_link(&mut self, raw: &str) {
        let raw = raw.trim();
        self.draft.music_link = (!raw.is_empty()).then(|| raw.to_string());
    }

    pub fn set_image_path(&mut self, path: &Path) -> DiaryResult<()> {
        match image::to_data_uri(path) {
            Ok(uri) => {
                self.draft.image = Some(uri);
                Ok(())
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Starts a grammar check of the current content in the background.
    ///
    /// Returns `false` without doing anything when the content is empty or a
    /// check is already running.
    pub fn request_check(&mut self, checker: Option<&Arc<GrammarChecker>>, runtime: &Handle) -> bool {
        if self.draft.content.trim().is_empty() || self.pending.is_some() {
            return false;
        }
        let Some(checker) = checker else {
            self.notice = Some(Notice::new(NOT_CONFIGURED, NoticeKind::Error));
            return false;
        };

        let (tx, rx) = oneshot::channel();
        let checker = Arc::clone(checker);
        let text = self.draft.content.clone();
        runtime.spawn(async move {
            let _ = tx.send(checker.check(&text).await);
        });
        self.pending = Some(rx);
        debug!("grammar check started");
        true
    }

    /// Picks up a finished check and drops expired notices. Call once per UI tick.
    pub fn tick(&mut self) {
        if let Some(rx) = self.pending.as_mut() {
            match rx.try_recv() {
                Ok(Ok(result)) => {
                    self.pending = None;
                    self.result = Some(result);
                }
                Ok(Err(e)) => {
                    self.pending = None;
                    warn!(error = %e, "grammar check failed");
                    self.notify_error(&e);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.pending = None;
                    self.notify_error(&DiaryError::RemoteService(
                        "grammar check was interrupted".to_string(),
                    ));
                }
            }
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            self.notice = None;
        }
    }

    /// Replaces the draft content with the corrected text.
    pub fn apply_correction(&mut self) -> bool {
        match self.result.take() {
            Some(result) => {
                self.draft.content = result.corrected_text;
                true
            }
            None => false,
        }
    }

    pub fn discard_correction(&mut self) {
        self.result = None;
    }

    /// Validates and stores the draft, then resets the editor for the next entry.
    pub fn save<S: SnapshotStorage>(&mut self, store: &mut EntryStore<S>) -> DiaryResult<DiaryEntry> {
        match self.persist(store) {
            Ok(entry) => {
                self.draft = EntryDraft::default();
                self.editing = None;
                self.pending = None;
                self.result = None;
                self.notice = Some(Notice::new(
                    "Diary entry saved successfully!",
                    NoticeKind::Success,
                ));
                Ok(entry)
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    fn persist<S: SnapshotStorage>(&self, store: &mut EntryStore<S>) -> DiaryResult<DiaryEntry> {
        if self.draft.content.trim().is_empty() {
            return Err(DiaryError::Validation(
                "Please write your diary entry".to_string(),
            ));
        }
        let draft = self.draft.clone();
        match &self.editing {
            None => store.add(draft),
            Some(id) => {
                if !store.update(id, draft.into_patch())? {
                    return Err(DiaryError::NotFound(id.clone()));
                }
                store.require(id).cloned()
            }
        }
    }

    fn notify_error(&mut self, err: &DiaryError) {
        self.notice = Some(Notice::new(err.to_string(), NoticeKind::Error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CompletionClient;
    use crate::storage::MemoryStorage;
    use mockito::Server;
    use serde_json::json;

    fn store() -> EntryStore<MemoryStorage> {
        EntryStore::open(MemoryStorage::new()).unwrap()
    }

    #[test]
    fn empty_content_is_rejected_and_store_untouched() {
        let mut store = store();
        let mut editor = DraftEditor::new();
        editor.draft.content = "   \n".to_string();

        let err = editor.save(&mut store).unwrap_err();

        assert!(matches!(err, DiaryError::Validation(_)));
        assert_eq!(store.len(), 0);
        assert_eq!(editor.notice().unwrap().kind, NoticeKind::Error);
    }

    #[test]
    fn save_adds_and_resets_the_draft() {
        let mut store = store();
        let mut editor = DraftEditor::new();
        editor.draft.content = "Sunny day".to_string();
        editor.draft.mood = "calm".to_string();

        let entry = editor.save(&mut store).unwrap();

        assert_eq!(store.get(&entry.id).unwrap().mood, "calm");
        assert!(editor.draft.content.is_empty());
        assert_eq!(editor.notice().unwrap().kind, NoticeKind::Success);
    }

    #[test]
    fn saving_an_edit_updates_in_place() {
        let mut store = store();
        let original = store.add(EntryDraft::new("first")).unwrap();
        store.add(EntryDraft::new("second")).unwrap();

        let mut editor = DraftEditor::for_entry(&original);
        editor.draft.content = "first, revised".to_string();
        let saved = editor.save(&mut store).unwrap();

        assert_eq!(saved.id, original.id);
        assert_eq!(saved.created_at, original.created_at);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1].content, "first, revised");
    }

    #[test]
    fn editing_a_deleted_entry_reports_not_found() {
        let mut store = store();
        let entry = store.add(EntryDraft::new("soon gone")).unwrap();
        let mut editor = DraftEditor::for_entry(&entry);
        store.delete(&entry.id).unwrap();

        assert!(matches!(editor.save(&mut store), Err(DiaryError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn date_and_music_link_setters() {
        let mut editor = DraftEditor::new();

        editor.set_date("2024-02-29").unwrap();
        assert_eq!(editor.draft.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(editor.set_date("2023-02-29").is_err());
        assert_eq!(editor.draft.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        editor.set_music_link(" https://open.spotify.com/track/abc ");
        assert_eq!(
            editor.draft.music_link.as_deref(),
            Some("https://open.spotify.com/track/abc")
        );
        editor.set_music_link("");
        assert_eq!(editor.draft.music_link, None);
    }

    #[test]
    fn apply_and_discard_correction() {
        let mut editor = DraftEditor::new();
        editor.draft.content = "i am happy".to_string();
        editor.result = Some(GrammarCheckResult {
            corrected_text: "I am happy.".to_string(),
            explanations: vec![],
        });

        assert!(editor.apply_correction());
        assert_eq!(editor.draft.content, "I am happy.");
        assert!(editor.grammar_result().is_none());
        assert!(!editor.apply_correction());

        editor.result = Some(GrammarCheckResult {
            corrected_text: "ignored".to_string(),
            explanations: vec![],
        });
        editor.discard_correction();
        assert_eq!(editor.draft.content, "I am happy.");
    }

    #[test]
    fn correction_never_touches_stored_entries() {
        let mut store = store();
        let entry = store.add(EntryDraft::new("teh end")).unwrap();
        let mut editor = DraftEditor::for_entry(&entry);
        editor.result = Some(GrammarCheckResult {
            corrected_text: "The end".to_string(),
            explanations: vec![],
        });

        editor.apply_correction();

        assert_eq!(store.get(&entry.id).unwrap().content, "teh end");
    }

    #[test]
    fn expired_notice_is_cleared_on_tick() {
        let mut editor = DraftEditor::new();
        editor.notice = Some(Notice {
            text: "old".to_string(),
            kind: NoticeKind::Success,
            shown_at: Instant::now() - NOTICE_TTL,
        });
        editor.tick();
        assert!(editor.notice().is_none());
    }

    #[tokio::test]
    async fn check_without_checker_reports_configuration() {
        let mut editor = DraftEditor::new();
        editor.draft.content = "text".to_string();

        assert!(!editor.request_check(None, &Handle::current()));
        assert!(editor.notice().unwrap().text.contains("not configured"));
        assert!(!editor.is_checking());
    }

    #[tokio::test]
    async fn second_request_while_busy_is_ignored() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"role": "assistant",
                    "content": "Corrected text: It rains.\nExplanations:\n- Verb form"}}]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let client =
            CompletionClient::new(server.url(), "k", "m", Duration::from_secs(5)).unwrap();
        let checker = Arc::new(GrammarChecker::new(client));

        let mut editor = DraftEditor::new();
        editor.draft.content = "It rain".to_string();
        let handle = Handle::current();

        assert!(editor.request_check(Some(&checker), &handle));
        assert!(!editor.request_check(Some(&checker), &handle));

        while editor.is_checking() {
            tokio::time::sleep(Duration::from_millis(10)).await;
            editor.tick();
        }

        assert_eq!(editor.grammar_result().unwrap().corrected_text, "It rains.");
        mock.assert_async().await;

        let mut store = store();
        editor.apply_correction();
        let saved = editor.save(&mut store).unwrap();
        assert_eq!(saved.content, "It rains.");
        assert_eq!(store.get(&saved.id), Some(&saved));
    }
}
