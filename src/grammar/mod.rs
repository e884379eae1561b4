//! Grammar checking through a remote chat-completion service.
//!
//! The service is asked to answer in a fixed plain-text layout
//! ([`prompt::build_prompt`]) and [`parser::parse_response`] pulls the
//! corrected text and explanations back out. The two are meant to change
//! together; callers only see [`GrammarCheckResult`].

pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{CompletionClient, GrammarChecker};
pub use parser::{parse_response, GrammarCheckResult};
