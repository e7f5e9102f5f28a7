pub mod build;
pub mod compile;
pub mod filter;
pub mod merge;
pub mod stats;
