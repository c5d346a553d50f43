//! Functionality relating to the `samstats flagstat` subcommand itself.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::flagstat::compute::Category;
use crate::flagstat::compute::FlagstatAccumulator;
use crate::flagstat::results::FlagstatResult;
use crate::utils::args::NumberOfRecords;
use crate::utils::display::RecordCounter;
use crate::utils::formats::sam;
use crate::utils::formats::sam::SamLine;
use crate::utils::formats::sam::SamLines;
use crate::utils::formats::STDIO;

/// Clap arguments for the `samstats flagstat` subcommand.
#[derive(Args)]
pub struct FlagstatArgs {
    /// Source SAM sorted by read name (plain or gzipped), or `-` for standard
    /// input.
    #[arg(value_name = "SAM")]
    src: PathBuf,

    /// Where to write the report.
    #[arg(short, long, value_name = "PATH", default_value = STDIO)]
    output: PathBuf,

    /// Write the report as JSON instead of text lines.
    #[arg(long)]
    json: bool,

    /// Only examine the first n alignment records in the file.
    #[arg(short, long, value_name = "USIZE")]
    num_records: Option<usize>,
}

/// Main function for the `samstats flagstat` subcommand.
pub fn flagstat(args: FlagstatArgs) -> anyhow::Result<()> {
    info!("Starting flagstat subcommand.");

    let num_records = NumberOfRecords::from(args.num_records);
    let reader = sam::open(&args.src)?;

    let mut accumulator = FlagstatAccumulator::new();
    let mut counter = RecordCounter::default();

    for result in SamLines::new(reader) {
        if let SamLine::Record(record) = result? {
            accumulator.push(&record);

            counter.inc();
            if counter.time_to_break(&num_records) {
                break;
            }
        }
    }

    let totals = accumulator.finish();
    info!(
        "Processed {} alignment records from {} reads.",
        counter.get(),
        accumulator.reads()
    );
    debug!(
        "Reads in total: {} QC-passed + {} QC-failed.",
        totals.qc_passed.get(Category::Total),
        totals.qc_failed.get(Category::Total)
    );

    let result = FlagstatResult::new(&totals);

    if result.qc_passed_primary == 0 {
        warn!("No primary QC-passed reads found: their ratios are reported as NA.");
    }

    let mut writer = sam::writer(&args.output)?;

    if args.json {
        let output = serde_json::to_string_pretty(&result)?;
        writeln!(writer, "{}", output)?;
    } else {
        for line in result.to_lines() {
            writeln!(writer, "{}", line)?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("could not write {}", args.output.display()))?;

    info!("Finished flagstat subcommand.");
    Ok(())
}
