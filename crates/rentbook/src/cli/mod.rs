//! Command-line interface for rentbook.
//!
//! This module provides the CLI structure for the `rentbook` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ApartmentCommand, ApartmentFields, ApartmentUpdate, ConfigCommand, DashboardCommand,
    DocumentCommand, DocumentFields, DocumentUpdate, ListArgs, OutputFormat, StatusCommand,
    TenantCommand, TenantFields, TenantUpdate, TransactionCommand, TransactionFields,
    TransactionUpdate,
};

use crate::logging::Verbosity;

/// rentbook - Keep the books of a small rental portfolio
///
/// Tracks apartments, tenants, income and expenses, and documents in a
/// local database, and reports occupancy, profit, and monthly totals.
#[derive(Debug, Parser)]
#[command(name = "rentbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Keep data in memory only; nothing is written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage apartments
    #[command(subcommand)]
    Apartment(ApartmentCommand),

    /// Manage tenants
    #[command(subcommand)]
    Tenant(TenantCommand),

    /// Manage income and expenses
    #[command(subcommand, alias = "tx")]
    Transaction(TransactionCommand),

    /// Manage documents
    #[command(subcommand)]
    Document(DocumentCommand),

    /// Show dashboard figures
    #[command(subcommand)]
    Dashboard(DashboardCommand),

    /// Show database and record counts
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        }
    }
}
