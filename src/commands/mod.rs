//! One module per CLI subcommand.

pub mod jobs;
pub mod migrate;
pub mod serve;
