use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use verbose output.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Level of events echoed to stderr.
    #[must_use]
    pub fn stderr_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::OFF;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
