//! mastery-providers: Curriculum and submission-history sources.
//!
//! Implements the `HistoryProvider` trait for the Codeforces API and the
//! `GraphProvider` trait for the built-in roadmap and curriculum files, and
//! loads `mastery.toml` configuration.

pub mod codeforces;
pub mod config;
pub mod error;
pub mod graph;
pub mod mock;

pub use codeforces::CodeforcesProvider;
pub use config::{
    create_graph_provider, create_history_provider, load_config, load_config_from,
    HistoryConfig, MasteryConfig,
};
pub use error::ProviderError;
pub use graph::{BuiltinGraphProvider, FileGraphProvider, StaticGraphProvider};
pub use mock::MockHistoryProvider;
