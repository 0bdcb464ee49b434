mod cli;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use roll_pangolin_api::DockerClient;
use roll_pangolin_config::load_config;

use crate::cli::{Cli, Command, GlobalOpts, LogFormat, PlanArgs, SyncArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        tracing::error!(code, "{err}");
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Some(Command::Completions(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "roll-pangolin", &mut std::io::stdout());
            Ok(())
        }
        Some(Command::Plan(args)) => plan(&cli.global, &args).await,
        Some(Command::Sync(args)) => sync(&cli.global, &args).await,
        None => sync(&cli.global, &SyncArgs::default()).await,
    }
}

/// Compile the labels on the local engine without touching Pangolin.
async fn plan(global: &GlobalOpts, args: &PlanArgs) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let builder = config.builder_settings()?;
    let docker = DockerClient::new(&config.docker_socket);

    let state = roll_pangolin_core::plan(&docker, &builder).await?;
    output::print_output(&output::render_plan(args.output, &state)?)
}

/// One reconciliation pass.
async fn sync(global: &GlobalOpts, args: &SyncArgs) -> Result<(), CliError> {
    let mut config = load_config(global.config.as_deref())?;
    if args.no_redeploy {
        config.force_redeploy = false;
    }
    let run_config = config.into_run_config()?;
    tracing::debug!(api = %run_config.api_url, org = %run_config.organization, "starting sync");

    let report = roll_pangolin_core::sync(&run_config).await?;
    let color = output::should_color(global.color);
    output::print_output(&output::render_report(args.output, &report, color)?)
}
