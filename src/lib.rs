pub mod config;
pub mod diary_entry;
pub mod diary_state;
pub mod draft;
pub mod errors;
pub mod grammar;
pub mod image;
pub mod logging;
pub mod storage;

pub use config::Config;
pub use diary_entry::{DiaryEntry, EntryDraft, EntryPatch};
pub use diary_state::{EntryStore, LoadOutcome};
pub use errors::{DiaryError, DiaryResult};
pub use grammar::{parse_response, GrammarCheckResult};
