use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{info, warn};

use shard_api::{ApiConfig, HttpApi};
use shard_core::{
    BatchOrchestrator, CaptureBuffer, ClaimStrategy, RunConfig, WorkClaimer, machine_id, platform,
    run_till_done,
};
use shard_exec::{EngineConfig, EngineNormalizer, ProcEngine};
use shard_model::RunMeta;
use shard_observe::{LoggerConfig, LoggerFormat, LoggerLevel, init_logger};

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> anyhow::Result<String> {
    var(name).with_context(|| format!("{name} is not set"))
}

/// The engine must be told both which specs to run and where to write its report.
fn check_engine_args(args: &[String]) -> anyhow::Result<()> {
    for placeholder in ["{specs}", "{results}"] {
        if !args.iter().any(|a| a.contains(placeholder)) {
            bail!("SHARD_ENGINE_ARGS must contain a {placeholder} placeholder");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1) Logger
    let cfg = LoggerConfig {
        level: LoggerLevel::new(var("SHARD_LOG").unwrap_or_else(|| "info".into()))?,
        format: var("SHARD_LOG_FORMAT")
            .map(|f| f.parse::<LoggerFormat>())
            .transpose()?
            .unwrap_or(LoggerFormat::Text),
        ..Default::default()
    };
    init_logger(&cfg)?;

    // 2) Run configuration
    let batch_size = var("SHARD_BATCH_SIZE")
        .map(|v| v.parse::<usize>())
        .transpose()
        .context("SHARD_BATCH_SIZE must be a positive integer")?
        .unwrap_or(1);
    let mut run_cfg = RunConfig::default().with_batch_size(batch_size)?;
    if let Some(root) = var("SHARD_SPEC_ROOT") {
        run_cfg = run_cfg.with_spec_root(root);
    }
    run_cfg.params.browser = var("SHARD_BROWSER");
    run_cfg.params.headed = var("SHARD_HEADED").is_some();
    run_cfg.validate()?;

    let run_id = required("SHARD_RUN_ID")?;
    let group_id = var("SHARD_GROUP_ID").unwrap_or_else(|| run_id.clone());
    let meta = RunMeta::new(run_id, group_id, machine_id(), platform())?;

    // Chosen once for the whole run.
    let strategy = ClaimStrategy::detect(run_cfg.batch_size);
    info!(run_id = %meta.run_id, machine_id = %meta.machine_id, ?strategy, "run configured");

    // 3) Remote authority
    let mut api_cfg = ApiConfig::new(required("SHARD_API_URL")?);
    api_cfg.record_key = var("SHARD_RECORD_KEY");
    let api = Arc::new(HttpApi::new(api_cfg)?);

    // 4) Engine
    let program = required("SHARD_ENGINE")?;
    let args: Vec<String> = var("SHARD_ENGINE_ARGS")
        .map(|a| a.split_whitespace().map(str::to_string).collect())
        .unwrap_or_else(|| {
            [
                "run",
                "--spec",
                "{specs}",
                "--reporter",
                "json",
                "--reporter-output",
                "{results}",
            ]
            .map(String::from)
            .to_vec()
        });
    check_engine_args(&args)?;
    let mut engine_cfg = EngineConfig {
        program,
        args,
        ..Default::default()
    };
    if let Some(path) = var("SHARD_RESULTS_PATH") {
        engine_cfg.results_path = PathBuf::from(path);
    }
    if let Some(root) = &run_cfg.spec_root {
        engine_cfg.cwd = Some(root.clone());
    }

    let capture = CaptureBuffer::with_limit(run_cfg.output_limit);
    let engine = ProcEngine::new(engine_cfg, capture.clone());

    // 5) Run until the authority has nothing left
    let mut orchestrator = BatchOrchestrator::new(
        WorkClaimer::new(api.clone(), meta, strategy),
        engine,
        EngineNormalizer,
        api,
        capture,
        run_cfg,
    );
    let summary = run_till_done(&mut orchestrator).await?;

    for (spec, s) in summary.iter() {
        info!(
            spec,
            tests = s.stats.tests,
            passes = s.stats.passes,
            failures = s.stats.failures,
            duration_ms = s.stats.duration_ms,
            "spec finished"
        );
    }
    let totals = summary.totals();
    info!(
        specs = summary.len(),
        tests = totals.tests,
        passes = totals.passes,
        failures = totals.failures,
        pending = totals.pending,
        skipped = totals.skipped,
        "run finished"
    );

    if summary.has_failures() {
        warn!("some specs failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
