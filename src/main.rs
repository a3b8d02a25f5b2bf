use clap::Parser;
use line_debugger::replay::{self, CommandSource, InteractiveCommands, ScriptedCommands, Trace};
use line_debugger::DebuggerConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "line-debugger")]
#[command(about = "Replay a recorded line trace through the debugger engine")]
struct Cli {
    /// Trace file (JSON) with breakpoints, line events and scripted commands
    trace: PathBuf,

    /// Debugger configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer stops from stdin instead of the trace's command list
    #[arg(long)]
    interactive: bool,

    /// Print the replay report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("line_debugger=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(DebuggerConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            error!("{e}: {}", source_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    let trace = match Trace::load(&cli.trace) {
        Ok(trace) => trace,
        Err(e) => {
            error!("{e}: {}", source_chain(&e));
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Replaying {} ({} events, {} breakpoints)",
        cli.trace.display(),
        trace.events.len(),
        trace.breakpoints.len()
    );

    let commands: Box<dyn CommandSource> = if cli.interactive {
        Box::new(InteractiveCommands)
    } else {
        Box::new(ScriptedCommands::new(trace.commands.clone()))
    };

    let report = match replay::run_trace(config, &trace, commands) {
        Ok(report) => report,
        Err(e) => {
            error!("{e}: {}", source_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("failed to encode report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for stop in &report.stops {
            println!(
                "event {:>4}  {:<10} {}:{}",
                stop.event, stop.reason, stop.source, stop.line
            );
        }
        println!(
            "{} stops, {} events delivered{}",
            report.stops.len(),
            report.events_delivered,
            if report.quit { " (quit)" } else { "" }
        );
    }

    ExitCode::SUCCESS
}

fn source_chain(e: &dyn std::error::Error) -> String {
    let mut parts = Vec::new();
    let mut current = e.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
