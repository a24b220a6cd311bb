pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod report;

pub use config::ReportConfig;
pub use error::{Error, Result};
