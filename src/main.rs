use anyhow::Result;
use is_terminal::IsTerminal;
use log::info;
use plot_upset::args::USAGE;
use plot_upset::output;
use std::io;

fn main() -> Result<()> {
    let args = plot_upset::args::parsed();
    env_logger::builder().filter_level(args.log_level).init();

    // A wrong output count doesn't stop the run: the input is still read and
    // checked, and `path_from` settles which file (if any) gets written.
    if args.wrong_output_count() {
        println!("{USAGE}");
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        info!("Reading from the terminal; end the input with end-of-file");
    }
    let chart = plot_upset::chart_from(stdin.lock(), &args.plot)?;
    let path = output::path_from(&args.outputs)?;
    output::save(&chart, path)
}
