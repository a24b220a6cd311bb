mod reader;
mod types;

pub use reader::DatasetReader;
pub use types::*;
