pub mod middleware;
pub mod shutdown;
pub mod tracing;
