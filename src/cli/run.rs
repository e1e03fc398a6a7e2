//! `pipeline-studio run` and `pipeline-studio config` handlers.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{Cli, RunArgs};
use crate::config::StudioConfig;
use crate::pipeline;
use crate::stream::HttpTransport;
use crate::types::{PipelineRun, ProviderInput, RunStatus, Stage};

/// Resolve the config from file and env, then apply command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<StudioConfig, Box<dyn std::error::Error>> {
    let mut config = StudioConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(secs) = cli.idle_timeout_secs {
        config = config.with_idle_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    config.validate()?;
    Ok(config)
}

/// Handle `pipeline-studio config`.
pub fn handle_config(config: &StudioConfig) {
    println!("endpoint:        {}", config.stream_url());
    match config.idle_timeout {
        Some(timeout) => println!("idle timeout:    {}s", timeout.as_secs()),
        None => println!("idle timeout:    none"),
    }
    println!("connect timeout: {}s", config.connect_timeout.as_secs());
}

/// Handle `pipeline-studio run`. Ctrl-C cancels the run.
pub async fn handle_run(
    config: &StudioConfig,
    args: RunArgs,
) -> Result<PipelineRun, Box<dyn std::error::Error>> {
    let input = ProviderInput {
        name: args.name,
        npi: args.npi,
        address: args.address,
        phone: args.phone,
        specialty: args.specialty,
        license: args.license,
    }
    .prepare()?;

    let transport = HttpTransport::new(config)?;
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut printed = 0;
    let run = pipeline::execute(
        &transport,
        PipelineRun::new(input),
        config.idle_timeout,
        &cancel,
        |run| {
            for entry in &run.log.entries()[printed..] {
                eprintln!("> {}", entry.text);
            }
            printed = run.log.len();
        },
    )
    .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }

    if run.status != RunStatus::Completed {
        let reason = run.error.clone().unwrap_or_else(|| format!("{:?}", run.status));
        return Err(reason.into());
    }
    Ok(run)
}

fn print_summary(run: &PipelineRun) {
    use strum::IntoEnumIterator;

    println!("status: {:?} (step {}/5)", run.status, run.current_step());
    for stage in Stage::iter() {
        let mark = if run.stage_results.get(stage).is_some() { "done" } else { "-" };
        println!("  {:<18} {mark}", stage.agent_name());
    }
    if let Some(report) = &run.stage_results.summary_report {
        println!("summary: {report}");
    }
}
