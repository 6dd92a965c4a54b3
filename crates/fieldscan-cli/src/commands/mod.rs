//! CLI subcommands.

pub mod config;
pub mod scan;
pub mod serve;
