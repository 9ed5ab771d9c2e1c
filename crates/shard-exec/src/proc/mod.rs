use std::path::PathBuf;

use async_trait::async_trait;
use shard_core::{CaptureBuffer, Engine, RunRequest};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::{
    error::{ExecError, ExecResult},
    raw::{EngineReport, RawResult},
    util::engine_command,
};

/// How to launch the test engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub program: String,
    /// Arguments; `{specs}` and `{results}` are substituted on every run.
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Where the engine writes its JSON report.
    pub results_path: PathBuf,
    /// Mirror engine output to the log as well as the capture buffer.
    pub echo_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            results_path: std::env::temp_dir().join("shard-results.json"),
            echo_output: true,
        }
    }
}

/// Runs the test engine as a subprocess, one invocation per batch.
///
/// Engine stdout and stderr are appended line by line to the capture buffer.
/// Any failure to produce a report becomes [`RawResult::Failed`].
pub struct ProcEngine {
    name: &'static str,
    cfg: EngineConfig,
    capture: CaptureBuffer,
}

impl ProcEngine {
    pub fn new(cfg: EngineConfig, capture: CaptureBuffer) -> Self {
        Self {
            name: "proc",
            cfg,
            capture,
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    async fn run(&self, request: RunRequest<'_>) -> ExecResult<EngineReport> {
        if self.cfg.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }

        match tokio::fs::remove_file(&self.cfg.results_path).await {
            Ok(()) => trace!(target: "shard.exec.proc", path = %self.cfg.results_path.display(), "removed stale report"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut cmd = engine_command(&self.cfg, &request);
        trace!(target: "shard.exec.proc", program = %self.cfg.program, specs = request.specs, "spawn");

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", self.cfg.program)))?;

        let mut readers = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(self.pump(out));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(self.pump(err));
        }

        let status = child.wait().await?;
        for reader in readers {
            let _ = reader.await;
        }

        match tokio::fs::read(&self.cfg.results_path).await {
            Ok(bytes) => {
                let report: EngineReport = serde_json::from_slice(&bytes)?;
                if !status.success() {
                    debug!(target: "shard.exec.proc", code = ?status.code(), "engine exited non-zero with a report");
                }
                Ok(report)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => match status.code() {
                Some(0) => Err(ExecError::InvalidResult(format!(
                    "engine wrote no report to {}",
                    self.cfg.results_path.display()
                ))),
                Some(code) => Err(ExecError::NonZeroExit { code }),
                None => Err(ExecError::KilledBySignal),
            },
            Err(e) => Err(e.into()),
        }
    }

    fn pump<R>(&self, stream: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let capture = self.capture.clone();
        let echo = self.cfg.echo_output;
        tokio::spawn(async move {
            let mut reader = BufReader::new(stream);
            let mut buf = Vec::with_capacity(256);
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(trim_eol(&buf));
                        if echo {
                            info!(target: "shard.exec.out", "{line}");
                        }
                        capture.write_line(&line);
                    }
                    Err(e) => {
                        // The pipe must stay open until EOF or the engine dies on SIGPIPE.
                        debug!(target: "shard.exec.proc", error = %e, "engine output unreadable; draining");
                        let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                        break;
                    }
                }
            }
        })
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[async_trait]
impl Engine for ProcEngine {
    type Raw = RawResult;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn run_safe(&self, request: RunRequest<'_>) -> RawResult {
        match self.run(request).await {
            Ok(report) => {
                debug!(target: "shard.exec.proc", runs = report.runs.len(), "engine report read");
                RawResult::Completed(report)
            }
            Err(e) => {
                warn!(target: "shard.exec.proc", specs = request.specs, error = %e, "engine run failed");
                RawResult::failed(e.to_string())
            }
        }
    }
}
