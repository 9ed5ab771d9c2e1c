use std::process::Stdio;

use shard_core::RunRequest;
use tokio::process::Command;

use crate::proc::EngineConfig;

pub const SPECS_PLACEHOLDER: &str = "{specs}";
pub const RESULTS_PLACEHOLDER: &str = "{results}";

/// Engine argv for `request`: configured args with placeholders filled, then run params.
pub fn engine_args(cfg: &EngineConfig, request: &RunRequest<'_>) -> Vec<String> {
    let results = cfg.results_path.to_string_lossy();
    let mut args: Vec<String> = cfg
        .args
        .iter()
        .map(|a| {
            a.replace(SPECS_PLACEHOLDER, request.specs)
                .replace(RESULTS_PLACEHOLDER, &results)
        })
        .collect();

    if let Some(browser) = &request.params.browser {
        args.push("--browser".into());
        args.push(browser.clone());
    }
    if request.params.headed {
        args.push("--headed".into());
    }
    args.extend(request.params.extra_args.iter().cloned());
    args
}

pub fn engine_command(cfg: &EngineConfig, request: &RunRequest<'_>) -> Command {
    let mut cmd = Command::new(&cfg.program);
    cmd.args(engine_args(cfg, request));
    if let Some(cwd) = &cfg.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &cfg.env {
        cmd.env(k, v);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::RunParams;

    #[test]
    fn placeholders_and_params() {
        let cfg = EngineConfig {
            program: "engine".into(),
            args: vec![
                "run".into(),
                "--spec={specs}".into(),
                "--report".into(),
                "{results}".into(),
            ],
            results_path: "/tmp/out.json".into(),
            ..Default::default()
        };
        let params = RunParams {
            browser: Some("firefox".into()),
            headed: true,
            extra_args: vec!["--quiet".into()],
        };
        let args = engine_args(
            &cfg,
            &RunRequest {
                specs: "a.spec,b.spec",
                params: &params,
            },
        );
        assert_eq!(
            args,
            [
                "run",
                "--spec=a.spec,b.spec",
                "--report",
                "/tmp/out.json",
                "--browser",
                "firefox",
                "--headed",
                "--quiet"
            ]
        );
    }
}
