pub mod completion;
pub mod handovers;
pub mod report;
pub mod stats;
