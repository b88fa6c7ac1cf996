//! Fetch-and-save orchestration for the `dhv-xc-sync` binary.

pub mod cli;
pub mod logging;
pub mod runner;

pub use runner::{Download, SyncOptions, SyncReport, plan_downloads, run};
