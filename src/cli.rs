use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use serde::Serialize;

use crate::config::{Collection, SignatureConfig};
use crate::record::RecordSummary;
use crate::signatures::{Assignment, assign_signatures_with};
use crate::types::RecordId;

#[derive(Debug, Parser)]
#[command(
    name = "ddr-signatures",
    disable_help_subcommand = true,
    about = "Assign signature files to collection objects",
    long_about = "Choose a representative file for every collection, entity, and segment under a collection root and write its id into each object's signature_id field.",
    after_help = "Updated ids are printed one per line. Changed metadata files are not committed."
)]
/// CLI for `ddr-signatures`.
///
/// Common usage:
/// - Assign and write: `ddr-signatures /var/www/media/ddr/ddr-densho-10`
/// - Preview without writing: `ddr-signatures --dry-run <COLLECTION>`
/// - Machine-readable preview: `ddr-signatures --dry-run --json <COLLECTION>`
struct AssignSignaturesCli {
    #[arg(value_name = "COLLECTION", help = "Path to the collection directory")]
    collection: PathBuf,
    #[arg(
        long = "base-path",
        env = "DDR_BASE_PATH",
        value_name = "DIR",
        help = "Directory holding collection directories (defaults to the collection's parent)"
    )]
    base_path: Option<PathBuf>,
    #[arg(long = "dry-run", help = "List assignments without writing metadata files")]
    dry_run: bool,
    #[arg(long, help = "Print results as a JSON document")]
    json: bool,
    #[arg(long = "include-tmp", help = "Include paths containing 'tmp'")]
    include_tmp: bool,
    #[arg(long = "follow-links", help = "Follow symlinks while discovering metadata files")]
    follow_links: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    dry_run: bool,
    updated: &'a [RecordId],
    unresolved: &'a [RecordId],
    records: Vec<RecordSummary>,
}

/// Parse `args_iter` (without the program name) and run one assignment.
pub fn run_assign_signatures<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) = parse_cli::<AssignSignaturesCli, _>(
        std::iter::once("ddr-signatures".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let collection = match cli.base_path {
        Some(base_path) => Collection::new(&cli.collection, base_path),
        None => Collection::from_path(&cli.collection)?,
    };
    let config = SignatureConfig::default()
        .with_dry_run(cli.dry_run)
        .with_include_tmp(cli.include_tmp)
        .with_follow_links(cli.follow_links);

    let assignment = assign_signatures_with(&collection, &config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        print_json(&mut out, &assignment, cli.dry_run)?;
    } else {
        print_text(&mut out, &assignment, cli.dry_run)?;
    }
    Ok(())
}

fn print_text<W: Write>(out: &mut W, assignment: &Assignment, dry_run: bool) -> io::Result<()> {
    if dry_run {
        for record in assignment.signatures.top_down() {
            writeln!(out, "{record}")?;
        }
    }
    for id in &assignment.updated {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

fn print_json<W: Write>(
    out: &mut W,
    assignment: &Assignment,
    dry_run: bool,
) -> Result<(), Box<dyn Error>> {
    let report = JsonReport {
        dry_run,
        updated: &assignment.updated,
        unresolved: assignment.signatures.unresolved(),
        records: assignment.signatures.summaries(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
