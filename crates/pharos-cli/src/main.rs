mod commands;
mod env_file;
mod prompt;
mod scaffold;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use pharos_core::ProjectLayout;
use pharos_toolchain::{HttpProbe, ProcessRunner};
use tracing::Level;

use commands::{Command, Session};
use prompt::TerminalPrompter;

#[derive(Parser)]
#[command(name = "configure-pharos")]
#[command(about = "Scaffold, compile, deploy and test Pharos smart-contract projects")]
#[command(version)]
struct Cli {
    /// Project root; for `init`, the directory the new project is created in
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {}", e);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runner = ProcessRunner::new();
    let probe = HttpProbe::new();
    let prompter = TerminalPrompter::new();
    let session = Session {
        layout: ProjectLayout::at(cli.project_dir),
        runner: &runner,
        probe: &probe,
        prompter: &prompter,
    };

    match cli.command.run(&session).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!();
            eprintln!("{} {}", style("✗").red().bold(), style(&err).red());
            for cause in err.chain().skip(1) {
                eprintln!("  {} {}", style("caused by:").dim(), cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
