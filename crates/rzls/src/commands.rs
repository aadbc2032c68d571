mod check;
mod complete;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Subcommand;
use rzls_conf::Settings;
use tracing_appender::non_blocking::WorkerGuard;

use crate::args::Args;
use crate::exit::Exit;
use crate::logging::init_tracing;

pub trait Command {
    async fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum RzlsCommand {
    /// Validate a tag helper catalog
    Check(self::check::Check),
    /// Compute completions against a tag helper catalog
    #[command(subcommand)]
    Complete(self::complete::Complete),
}

impl Command for RzlsCommand {
    async fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            RzlsCommand::Check(command) => command.execute(args).await,
            RzlsCommand::Complete(command) => command.execute(args).await,
        }
    }
}

/// Load settings for the current directory and start logging.
fn setup(args: &Args) -> Result<(Settings, WorkerGuard)> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let project_root = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| anyhow::anyhow!("Current directory is not UTF-8: {}", path.display()))?;
    let settings = Settings::new(&project_root).context("Failed to load settings")?;
    let guard = init_tracing(&settings, args.global.stderr_level())?;
    Ok((settings, guard))
}
