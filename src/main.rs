use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;

use samstats::errors;
use samstats::errors::ExitCode;
use samstats::flagstat::command::FlagstatArgs;
use samstats::stats::command::StatsArgs;

git_testament!(TESTAMENT);

#[derive(Subcommand)]
enum Subcommands {
    /// Computes mapping statistics and library complexity metrics.
    Stats(StatsArgs),

    /// Computes per-read flagstat counts over a file sorted by read name.
    Flagstat(FlagstatArgs),
}

#[derive(Parser)]
#[command(name = "samstats", author, version = render_testament!(TESTAMENT), propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match cli.subcommand {
        Subcommands::Stats(args) => samstats::stats::command::stats(args),
        Subcommands::Flagstat(args) => samstats::flagstat::command::flagstat(args),
    };

    if let Err(err) = result {
        errors::exit(format!("{:#}", err).as_str(), ExitCode::InvalidInputData);
    }
}
