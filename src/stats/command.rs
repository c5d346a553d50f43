//! Functionality relating to the `samstats stats` subcommand itself.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::stats::compute::AnnotatedRecord;
use crate::stats::compute::MappingStatsEngine;
use crate::stats::results::MappingStatsResult;
use crate::utils::args::window_in_range;
use crate::utils::args::NumberOfRecords;
use crate::utils::display::RecordCounter;
use crate::utils::formats::sam;
use crate::utils::formats::sam::SamLine;
use crate::utils::formats::sam::SamLines;
use crate::utils::formats::STDIO;

/// Clap arguments for the `samstats stats` subcommand.
#[derive(Args)]
pub struct StatsArgs {
    /// Source SAM (plain or gzipped), or `-` for standard input.
    #[arg(value_name = "SAM")]
    src: PathBuf,

    /// Number of distinct read identifiers held while grouping alignments.
    /// One is enough for input sorted or grouped by read identifier.
    #[arg(long, value_name = "USIZE", default_value = "1")]
    #[arg(value_parser = window_in_range)]
    window: usize,

    /// Where to write the statistics report.
    #[arg(short = 'o', long, value_name = "PATH", default_value = STDIO)]
    stats_out: PathBuf,

    /// Write the report as JSON instead of tab-separated lines.
    #[arg(long)]
    json: bool,

    /// Write the header and every mapped alignment to this path (`-` for
    /// standard output).
    #[arg(long, value_name = "PATH")]
    print_alignments: Option<PathBuf>,

    /// Append an `NH:i` tag with the computed multiplicity to each alignment
    /// written by `--print-alignments`.
    #[arg(long, requires = "print_alignments")]
    add_nh: bool,

    /// Only examine the first n alignment records in the file.
    #[arg(short, long, value_name = "USIZE")]
    num_records: Option<usize>,
}

fn write_alignments(
    dst: &mut Option<Box<dyn Write>>,
    records: Vec<AnnotatedRecord>,
    add_nh: bool,
) -> anyhow::Result<()> {
    if let Some(writer) = dst.as_mut() {
        for record in records {
            writeln!(writer, "{}", record.render(add_nh))?;
        }
    }

    Ok(())
}

/// Writes the statistics as `label\tvalue` lines. Section headings are written
/// on their own.
pub fn write_report<W: Write>(writer: &mut W, result: &MappingStatsResult) -> anyhow::Result<()> {
    for (label, value) in result.to_pairs() {
        if value.is_empty() {
            writeln!(writer, "{}", label)?;
        } else {
            writeln!(writer, "{}\t{}", label, value)?;
        }
    }

    Ok(())
}

fn warn_if_not_applicable(result: &MappingStatsResult) {
    let lc = &result.library_complexity;

    for (name, metric) in [("PBC1", lc.pbc1), ("PBC2", lc.pbc2), ("NRF", lc.nrf)] {
        if metric.is_none() {
            warn!("{} is not defined for this input and is reported as NA.", name);
        }
    }

    if result.read_length.average.is_none() {
        warn!("No mapped reads found: read length statistics are reported as NA.");
    }
}

/// Main function for the `samstats stats` subcommand.
pub fn stats(args: StatsArgs) -> anyhow::Result<()> {
    info!("Starting stats subcommand.");
    debug!("Arguments: window = {}, json = {}.", args.window, args.json);

    let num_records = NumberOfRecords::from(args.num_records);
    let pass_through = args.print_alignments.is_some();

    let reader = sam::open(&args.src)?;
    let mut alignments = match &args.print_alignments {
        Some(path) => Some(sam::writer(path)?),
        None => None,
    };

    let mut engine = MappingStatsEngine::new(args.window, pass_through);
    let mut counter = RecordCounter::default();

    // (1) Feed every alignment record through the engine, echoing the header
    // and the released alignments when passing through.
    for result in SamLines::new(reader) {
        match result? {
            SamLine::Header(line) => {
                if let Some(writer) = alignments.as_mut() {
                    writeln!(writer, "{}", line)?;
                }
            }
            SamLine::Record(record) => {
                let released = engine.process(record)?;
                write_alignments(&mut alignments, released, args.add_nh)?;

                counter.inc();
                if counter.time_to_break(&num_records) {
                    break;
                }
            }
        }
    }

    // (2) Close the remaining read groups.
    let (state, released) = engine.finish()?;
    write_alignments(&mut alignments, released, args.add_nh)?;

    if let Some(mut writer) = alignments {
        writer.flush()?;
    }

    info!("Processed {} alignment records.", counter.get());

    // (3) Finalize and write the report.
    let result = state.finalize();
    warn_if_not_applicable(&result);

    let mut writer = sam::writer(&args.stats_out)?;

    if args.json {
        let output = serde_json::to_string_pretty(&result)?;
        writeln!(writer, "{}", output)?;
    } else {
        write_report(&mut writer, &result)?;
    }

    writer
        .flush()
        .with_context(|| format!("could not write {}", args.stats_out.display()))?;

    info!("Finished stats subcommand.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::complexity::ComplexitySummary;
    use crate::stats::counts::MappingCounts;

    #[test]
    fn test_write_report() {
        let result = MappingStatsResult::new(&MappingCounts::new(), ComplexitySummary::default());
        let mut buffer = Vec::new();
        write_report(&mut buffer, &result).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 24);
        assert_eq!(lines[0], "unique pairs, proper:\t0");
        assert_eq!(
            lines[15],
            "#Library complexity metrics (unique reads/pairs only):"
        );
        assert_eq!(lines[23], "NRF\tNA");
    }
}
