//! Rating pass over a linked store table.
//!
//! Each store row is sent to an OpenAI-compatible chat endpoint and the reply
//! is normalized into health and economy scores. Failures degrade per row to
//! neutral defaults; nothing here aborts a batch.

pub mod client;
pub mod error;
pub mod key;
pub mod rating;
pub mod score;

pub use client::{OpenAiClient, DEFAULT_MODEL};
pub use error::ScoreError;
pub use key::{get_api_key, KeyLookup, KeySource};
pub use rating::{rate_table, RatingOptions, RatingSummary, StoreScorer};
pub use score::{RawScore, RatingOutcome, StorePayload, StoreRating};
