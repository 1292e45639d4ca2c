//! V1 API: the pipeline stages and interaction history.

pub mod routes;

pub use routes::{paths, v1_router, V1_PREFIX};
