//! CLI commands for the cross-venue scanner.

pub mod scan;

pub use scan::{run_scan, ScanArgs};
