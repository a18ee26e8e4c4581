//! CLI entrypoint for Self-Critique Planner
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use planner_application::{
    CompositeConversationLogger, ConversationLogger, NoProgress, PlanningProgressNotifier,
    RunSelfCritiqueInput, RunSelfCritiqueUseCase,
};
use planner_domain::{PlanResult, PlanStatus};
use planner_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, ProviderKind, ProviderRouter,
};
use planner_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.print_default_config {
        print!("{}", ConfigLoader::default_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting Self-Critique Planner");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let (Some(domain_path), Some(problem_path)) = (&cli.domain, &cli.problem) else {
        bail!("Both DOMAIN_FILE and PROBLEM_FILE are required");
    };
    let domain = read_input(domain_path)?;
    let problem = read_input(problem_path)?;

    let mut params = config.to_planning_params();
    if let Some(model) = &cli.model {
        params = params.with_model(model.clone());
    }

    // === Dependency Injection ===
    let kind: ProviderKind = match cli.provider {
        Some(arg) => arg.as_str().parse()?,
        None => config.default_provider()?,
    };
    let router = ProviderRouter::from_config(&config.providers, kind)?.require(&config.providers)?;

    let mut use_case = RunSelfCritiqueUseCase::new(Arc::new(router));
    if let Some(logger) = build_event_logger(&cli)? {
        use_case = use_case.with_conversation_logger(logger);
    }

    let token = CancellationToken::new();
    spawn_cancel_watcher(token.clone(), cli.deadline.map(Duration::from_secs));
    let use_case = use_case.with_cancellation(token.clone());

    if !cli.quiet {
        eprintln!();
        eprintln!("+============================================================+");
        eprintln!("|           Self-Critique Planner                            |");
        eprintln!("+============================================================+");
        eprintln!();
        eprintln!("Provider: {}", kind);
        eprintln!(
            "Iterations: up to {}, {} critique samples each",
            params.max_iterations, params.samples_per_iteration
        );
        eprintln!();
    }

    let input = RunSelfCritiqueInput::new(domain, problem).with_params(params);

    let progress: Box<dyn PlanningProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let result = use_case.execute_with_progress(input, progress.as_ref()).await;
    token.cancel();

    let format = cli
        .output
        .map(planner_domain::OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::render(&result, format));

    Ok(exit_code(&result))
}

/// Install the tracing subscriber: stderr always, a rolling file when `log_dir` is set.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "self-critique-planner.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(n) = cli.max_iterations {
        config.planning.max_iterations = n;
    }
    if let Some(n) = cli.samples {
        config.planning.samples_per_iteration = n;
    }
    if let Some(n) = cli.min_samples {
        config.planning.min_successful_samples = n;
    }
    if let Some(secs) = cli.sample_timeout {
        config.planning.sample_timeout_seconds = Some(secs);
    }
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// JSONL loggers requested on the command line, combined.
fn build_event_logger(cli: &Cli) -> Result<Option<Arc<dyn ConversationLogger>>> {
    let mut loggers: Vec<Arc<dyn ConversationLogger>> = Vec::new();

    if let Some(path) = &cli.history_log {
        let logger = JsonlConversationLogger::iteration_history(path)
            .with_context(|| format!("Failed to open history log {}", path.display()))?;
        loggers.push(Arc::new(logger));
    }

    if let Some(path) = &cli.transcript_log {
        let logger = JsonlConversationLogger::new(path)
            .with_context(|| format!("Failed to open transcript log {}", path.display()))?;
        loggers.push(Arc::new(logger));
    }

    Ok(match loggers.len() {
        0 => None,
        1 => loggers.pop(),
        _ => Some(Arc::new(CompositeConversationLogger::new(loggers))),
    })
}

/// Cancel `token` on Ctrl-C or when `deadline` elapses.
fn spawn_cancel_watcher(token: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let timer = async {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::signal::ctrl_c() => warn!("Interrupted, cancelling run"),
            _ = timer => warn!("Deadline reached, cancelling run"),
        }
        token.cancel();
    });
}

fn exit_code(result: &PlanResult) -> ExitCode {
    match result.status {
        PlanStatus::Valid => ExitCode::SUCCESS,
        PlanStatus::Failed => ExitCode::from(1),
        PlanStatus::MaxIterations => ExitCode::from(2),
        PlanStatus::Cancelled => ExitCode::from(130),
    }
}
