//! Code to parse the command line using `clap`, and definitions of the parsed
//! result

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

use crate::intersections::{SetOrder, SubsetOrder};
use crate::render::{PlotOptions, DEFAULT_TITLE};

/// Printed to standard output when the command line doesn't name exactly one
/// output file
pub const USAGE: &str = "usage: plot-upset <output file name>";

/// Returns the parsed command line
#[must_use]
pub fn parsed() -> Args {
    Args::from_cli(CliArgs::parse())
}

/// The parsed command line
#[derive(Debug)]
pub struct Args {
    /// Every positional argument. Exactly one is expected, but we don't insist
    /// on that until it's time to write the plot.
    pub outputs: Vec<PathBuf>,
    /// The title and orderings for the plot
    pub plot: PlotOptions,
    /// How much to log
    pub log_level: LevelFilter,
}

impl Args {
    /// True unless exactly one output file was named
    #[must_use]
    pub fn wrong_output_count(&self) -> bool {
        self.outputs.len() != 1
    }

    fn from_cli(parsed: CliArgs) -> Self {
        let subset_order = match parsed.sort_by {
            CliSubsetOrder::Degree => SubsetOrder::Degree,
            CliSubsetOrder::Cardinality => SubsetOrder::Cardinality,
            CliSubsetOrder::Input => SubsetOrder::Input,
        };
        let set_order = match parsed.sort_sets_by {
            CliSetOrder::Cardinality => SetOrder::Cardinality,
            CliSetOrder::Input => SetOrder::Input,
        };
        let log_level = if parsed.quiet {
            LevelFilter::Off
        } else {
            match parsed.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        Args {
            outputs: parsed.output,
            plot: PlotOptions { title: parsed.title, subset_order, set_order },
            log_level,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "plot-upset", version)]
/// Reads lines of the form `<filename>: <hash>, <hash>, ...` from standard
/// input and draws an UpSet plot of how the filenames' hash sets intersect.
struct CliArgs {
    #[arg(value_name = "OUTPUT")]
    /// The file to write; its extension (.svg, .png, .html, or .htm) picks the format
    output: Vec<PathBuf>,

    #[arg(long, default_value = DEFAULT_TITLE)]
    /// The title drawn across the top of the plot
    title: String,

    #[arg(long, value_enum, default_value_t = CliSubsetOrder::Degree)]
    /// The order of the intersection columns
    sort_by: CliSubsetOrder,

    #[arg(long, value_enum, default_value_t = CliSetOrder::Cardinality)]
    /// The order of the set rows
    sort_sets_by: CliSetOrder,

    #[arg(short, long, action = ArgAction::Count)]
    /// Log more (repeat for still more)
    verbose: u8,

    #[arg(short, long, conflicts_with = "verbose")]
    /// Log nothing
    quiet: bool,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, ValueEnum)]
/// Intersection orderings
enum CliSubsetOrder {
    /// Fewest sets first
    Degree,
    /// Largest intersection first
    Cardinality,
    /// As first seen in the input
    Input,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, ValueEnum)]
/// Set orderings
enum CliSetOrder {
    /// Largest set first
    Cardinality,
    /// As first seen in the input
    Input,
}
