use auditor_bridge::bridge::{panic_message, Bridge, ExitStatus, RunOutcome, LIVE_ENV_VAR};
use auditor_bridge::cli::Cli;
use auditor_bridge::core::{RunLog, ScanResult};

use clap::error::ErrorKind;
use clap::Parser;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return finish(usage_error(&e)),
    };
    init_tracing(&cli);

    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| run(&cli))) {
        Ok(outcome) => outcome,
        Err(payload) => fatal(&panic_message(payload.as_ref())),
    };

    finish(outcome)
}

fn finish(outcome: RunOutcome) -> ExitCode {
    match outcome.result.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to encode result: {}", e),
    }

    ExitCode::from(outcome.status.code())
}

fn usage_error(error: &clap::Error) -> RunOutcome {
    let _ = error.print();

    let rendered = error.to_string();
    let mut log = RunLog::new();
    log.push(format!(
        "Invalid command line: {}",
        rendered.lines().next().unwrap_or_default()
    ));
    RunOutcome::new(ScanResult::input_failure(log), ExitStatus::InputError)
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> RunOutcome {
    let live_env = std::env::var(LIVE_ENV_VAR).ok();
    let config = cli.to_config(live_env.as_deref());

    let bridge = match Bridge::builder().with_config(config).build() {
        Ok(bridge) => bridge,
        Err(e) => return fatal(&e.to_string()),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return fatal(&format!("failed to start async runtime: {}", e)),
    };

    runtime.block_on(bridge.run_guarded(&cli.input, &cli.output))
}

fn fatal(fault: &str) -> RunOutcome {
    tracing::error!(fault = %fault, "Bridge crashed");
    RunOutcome::new(ScanResult::fatal(RunLog::new(), fault), ExitStatus::Fatal)
}
