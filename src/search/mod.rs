//! Search: validated, parameter-bound lookups grouped by source table

pub mod filters;
pub mod orchestrator;
pub mod types;

pub use filters::{normalize_list, FilterInput, FilterValue, Lookup};
pub use orchestrator::{search, search_with, SearchOptions};
pub use types::{GroupRole, ResultGroup, SearchResult};
