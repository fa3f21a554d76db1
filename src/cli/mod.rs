//! Command-line interface definitions for the `berth` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `berth` binary.
#[derive(Debug, Parser)]
#[command(
    name = "berth",
    about = "Provision an SSH key, register it with Hetzner Cloud, and open a session",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Reconcile key material, pick a datacentre, and connect over SSH.
    #[command(
        name = "up",
        about = "Reconcile key material, pick a datacentre, and connect over SSH"
    )]
    Up,
}
