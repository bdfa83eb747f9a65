//! Form module - the admission form as submitted by the browser.

pub mod models;

pub use models::FormRecord;
