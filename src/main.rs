use anyhow::{Context, Result};
use binman_vblock::bintool::{Bintools, KNOWN_BINTOOLS};
use binman_vblock::config::{load_config, BuildConfig};
use binman_vblock::description::load_description;
use binman_vblock::futility::{Futility, FUTILITY};
use binman_vblock::report::{BuildReport, EXIT_MISSING_BINTOOLS};
use binman_vblock::{build_vblock, EntryArgs, OutputDir, VblockEntry};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{BintoolsArgs, Command, RootArgs, SignArgs};

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    match args.command {
        Command::Sign(args) => {
            init_tracing(args.verbose);
            run_sign(args)
        }
        Command::Bintools(args) => {
            init_tracing(false);
            run_bintools(args)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn run_sign(args: SignArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BuildConfig::default(),
    };
    let mut toolpaths = args.toolpath.clone();
    toolpaths.append(&mut config.toolpaths);
    config.toolpaths = toolpaths;
    if args.outdir.is_some() {
        config.outdir = args.outdir.clone();
    }
    config.ignore_missing |= args.ignore_missing;

    let mut entry_args = config.entry_args();
    entry_args.merge(&EntryArgs::parse(&args.entry_args)?);

    let desc = load_description(&args.desc)?;
    let base = args
        .desc
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut entry = VblockEntry::new(desc.entry.clone(), &entry_args)?;
    let mut btools = Bintools::with_default_toolpaths(config.toolpaths.clone());
    entry.add_bintools(&mut btools);

    let outdir = match &config.outdir {
        Some(dir) => OutputDir::preserved(dir)?,
        None => OutputDir::temporary()?,
    };
    let mut section = desc.section(base)?;
    let outcome = build_vblock(
        &mut entry,
        &mut section,
        &outdir,
        config.resize_policy(),
        |_, _| Ok(()),
    )?;

    if let Some(output) = &args.output {
        std::fs::write(output, &outcome.data)
            .with_context(|| format!("write {}", output.display()))?;
    }

    let kept_outdir = (!outdir.is_temporary()).then_some(outdir.path());
    let report = BuildReport::new(&entry, &outcome, args.output.as_deref(), kept_outdir);
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize build report")?;
        println!("{text}");
    } else {
        print!("{}", report.render_text());
    }

    if !report.is_valid() && !config.ignore_missing {
        return Ok(ExitCode::from(EXIT_MISSING_BINTOOLS));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_bintools(args: BintoolsArgs) -> Result<ExitCode> {
    let mut btools = Bintools::with_default_toolpaths(args.toolpath);
    println!("{:<12} {:<12} {:<40} Description", "Name", "Version", "Path");
    for (name, description) in KNOWN_BINTOOLS {
        let tool = btools.bind(name);
        let version = if *name == FUTILITY {
            Futility::new(tool.clone()).version()
        } else {
            tool.version(&["--version"])
        };
        let path = tool
            .path()
            .map_or_else(|| "missing".to_string(), |path| path.display().to_string());
        println!(
            "{:<12} {:<12} {:<40} {}",
            name,
            version.as_deref().unwrap_or("-"),
            path,
            description
        );
    }
    Ok(ExitCode::SUCCESS)
}
