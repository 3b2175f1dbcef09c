pub mod config;
pub mod error;
pub mod geo;
pub mod llm;
pub mod pipeline;
pub mod query;
pub mod storage;
pub mod synthesis;
pub mod types;

// Re-export primary types for convenience
pub use config::ChatConfig;
pub use error::QueryError;
pub use pipeline::QueryPipeline;
pub use query::constraints::{ConstraintSet, TimeWindow};
pub use query::intent::Intent;
pub use storage::{FloatStore, MemoryStore, StoreQuery};
pub use types::{FloatRecord, Parameter, QueryResponse};

// Re-export common types
pub use anyhow::Result;
pub use uuid::Uuid;
