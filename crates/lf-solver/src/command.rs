//! External-process solver.
//!
//! The network and options are written as JSON to `<work_dir>/network.json`;
//! the program is invoked as `<program> [args...] network.json results.json`
//! and must write a [`SolverResponse`] to `results.json`.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SolverError, SolverResult};
use crate::network::{Network, PowerFlowResults};
use crate::solver::{PowerFlowOptions, PowerFlowSolver};

const REQUEST_FILE: &str = "network.json";
const RESPONSE_FILE: &str = "results.json";
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Serialize)]
struct SolverRequest<'a> {
    network: &'a Network,
    options: &'a PowerFlowOptions,
}

/// What the external program writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverResponse {
    pub converged: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: PowerFlowResults,
}

#[derive(Debug, Clone)]
pub struct CommandSolver {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    pub timeout_secs: u64,
}

impl CommandSolver {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl PowerFlowSolver for CommandSolver {
    fn run_pf(&self, network: &mut Network, options: &PowerFlowOptions) -> SolverResult<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        let request_path = self.work_dir.join(REQUEST_FILE);
        let response_path = self.work_dir.join(RESPONSE_FILE);

        let request = SolverRequest { network, options };
        std::fs::write(&request_path, serde_json::to_string_pretty(&request)?)?;
        if response_path.exists() {
            std::fs::remove_file(&response_path)?;
        }

        info!(program = %self.program, "running load flow");
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&request_path)
            .arg(&response_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::NotFound(format!("{}: {e}", self.program)))?;

        let output = wait_with_timeout(child, Duration::from_secs(self.timeout_secs))?;
        if !output.status.success() {
            return Err(SolverError::ExecutionFailed(format!(
                "{} exited with {}\nstderr: {}\nstdout: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
                tail(&output.stdout, OUTPUT_TAIL_LINES)
            )));
        }

        let text = std::fs::read_to_string(&response_path).map_err(|e| {
            SolverError::MalformedResults(format!("cannot read {}: {e}", response_path.display()))
        })?;
        let response: SolverResponse = serde_json::from_str(&text)?;
        apply_response(network, response)
    }
}

/// Store a solver response on the network, failing on non-convergence.
pub fn apply_response(network: &mut Network, response: SolverResponse) -> SolverResult<()> {
    if !response.converged {
        return Err(SolverError::ConvergenceFailed {
            message: response
                .message
                .unwrap_or_else(|| "solver reported no convergence".to_string()),
        });
    }
    network.set_results(response.results)?;
    debug!("load flow results attached");
    Ok(())
}

/// Read a child pipe to the end on its own thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // a read error just truncates the captured output
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> SolverResult<Output> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    if let Err(e) = child.kill() {
                        warn!(error = %e, "failed to kill timed-out solver");
                    }
                    // reap; the drain threads finish once the pipes close
                    child
                        .wait()
                        .map_err(|e| SolverError::ExecutionFailed(e.to_string()))?;
                    return Err(SolverError::Timeout(timeout.as_secs()));
                }
                thread::sleep(poll_interval);
            }
            Err(e) => return Err(SolverError::ExecutionFailed(e.to_string())),
        }
    };

    let join = |handle: JoinHandle<Vec<u8>>| {
        handle
            .join()
            .map_err(|_| SolverError::ExecutionFailed("output reader panicked".to_string()))
    };
    Ok(Output {
        status,
        stdout: join(stdout)?,
        stderr: join(stderr)?,
    })
}

/// Last `max_lines` lines of captured output.
fn tail(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    lines[lines.len().saturating_sub(max_lines)..].join("\n")
}
