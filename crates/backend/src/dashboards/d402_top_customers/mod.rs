pub mod error;
pub mod prompt;
pub mod response_parser;
pub mod service;

pub use error::ReportError;
pub use service::{ReportQuery, ReportSettings};
