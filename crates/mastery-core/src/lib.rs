//! mastery-core: Topic ancestry, credit propagation, and mastery scoring.
//!
//! This crate defines the curriculum data model, the pure scoring pipeline
//! (ancestry → credit → bucket → decay), the collaborator traits, and the
//! sync service that ties them together.

pub mod ancestry;
pub mod classify;
pub mod credit;
pub mod decay;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interval;
pub mod model;
pub mod parser;
pub mod record;
pub mod sync;
pub mod traits;

pub use ancestry::{resolve_ancestry, AncestryMap};
pub use classify::{normalize_history, TagMap};
pub use engine::{compute_mastery, MasterySnapshot};
pub use error::{GraphError, MasteryError, SyncError};
pub use graph::{default_curriculum, TopicGraph};
pub use record::LearnerRecord;
pub use sync::{MasteryService, SyncConfig, SyncOutcome};
