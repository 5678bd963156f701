//! mastery-store: Persistence and reporting for learner mastery.
//!
//! Implements the `MasterySink` trait with a JSON file store and an
//! in-memory store, and renders stored records as HTML or Markdown.

pub mod html;
pub mod json;
pub mod markdown;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
