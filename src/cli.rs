//! CLI argument parsing for the vblock signer.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "binman-vblock",
    version,
    about = "Sign firmware entries into a Chromium OS verified-boot block",
    after_help = "Examples:\n  binman-vblock sign --desc rw-a.json --output vblock-a.bin\n  binman-vblock sign --desc rw-a.json -a keydir=/keys --outdir out --json\n  binman-vblock bintools",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Sign(SignArgs),
    Bintools(BintoolsArgs),
}

/// Sign command inputs.
#[derive(Parser, Debug)]
#[command(about = "Build the vblock for one entry description")]
pub struct SignArgs {
    /// JSON description of the vblock entry and the entries it signs
    #[arg(long, value_name = "FILE")]
    pub desc: PathBuf,

    /// Build config JSON (toolpaths, entry args, size policy)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Entry argument override, e.g. keydir=/path/to/keys
    #[arg(short = 'a', long = "entry-arg", value_name = "NAME=VALUE")]
    pub entry_args: Vec<String>,

    /// Extra directory to search for bintools (searched before PATH)
    #[arg(long, value_name = "DIR")]
    pub toolpath: Vec<PathBuf>,

    /// Keep scratch files in this directory
    #[arg(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Write the final vblock contents here
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the build report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit successfully even if bintools are missing
    #[arg(long)]
    pub ignore_missing: bool,

    /// Emit debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// Bintools command inputs.
#[derive(Parser, Debug)]
#[command(about = "List the bintools used for signing and where they were found")]
pub struct BintoolsArgs {
    /// Extra directory to search for bintools (searched before PATH)
    #[arg(long, value_name = "DIR")]
    pub toolpath: Vec<PathBuf>,
}
