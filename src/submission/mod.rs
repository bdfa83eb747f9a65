//! Submission module - the public admission form endpoint.
//!
//! A submission is stored in Notion, rendered to a PDF and delivered to
//! Telegram. Storage and delivery fail independently; the request only
//! fails when the PDF cannot be built or neither side succeeded.

pub mod handlers;
pub mod models;

pub use handlers::config;
