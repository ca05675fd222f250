//! Subprocess capture.
//!
//! Shared by the runner, the completion helper and plugin commands: spawn a
//! program, optionally feed it stdin, and collect stdout and stderr merged
//! into one text in the order the lines arrive.
//!
//! The child is spawned with `kill_on_drop`, so dropping the future (an
//! aborted iced task, a cancelled run) also ends the process.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};

/// What to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    /// Kept as `OsString` so non-UTF-8 paths reach the child unchanged
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,

    /// Written to the child's stdin, which is then closed
    pub stdin: Option<String>,

    /// Kill the child after this long
    pub timeout: Option<Duration>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// What a finished (or killed) process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// stdout and stderr, interleaved by line
    pub text: String,

    /// Exit code; `None` when killed or ended by a signal
    pub status: Option<i32>,

    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs `spec` to completion and captures its output.
///
/// Only a spawn failure or a pipe error is an `Err`. A nonzero exit or a
/// timeout is reported through `ProcessOutput`, with whatever output was
/// produced before the kill.
pub async fn capture(spec: &ProcessSpec) -> io::Result<ProcessOutput> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.current_dir {
        cmd.current_dir(dir);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    tracing::debug!("Spawning: {}", spec);
    let mut child = cmd.spawn()?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let mut collected = Vec::new();
    let work = async {
        let feed = async {
            if let (Some(mut pipe), Some(input)) = (stdin, spec.stdin.as_deref()) {
                match pipe.write_all(input.as_bytes()).await {
                    // The child may exit without reading its input
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };
        let (fed, read) = tokio::join!(feed, merge_streams(stdout, stderr, &mut collected));
        fed?;
        read?;
        child.wait().await
    };

    let finished = match spec.timeout {
        Some(limit) => tokio::time::timeout(limit, work).await.ok(),
        None => Some(work.await),
    };

    let (status, timed_out) = match finished {
        Some(status) => (status?.code(), false),
        None => {
            tracing::warn!("Killing `{}` after {:?}", spec, spec.timeout);
            if let Err(e) = child.kill().await {
                tracing::debug!("Kill failed: {}", e);
            }
            (None, true)
        }
    };

    Ok(ProcessOutput {
        text: String::from_utf8_lossy(&collected).into_owned(),
        status,
        timed_out,
    })
}

/// Copies whole lines from both pipes into `out` as they arrive.
async fn merge_streams(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    out: &mut Vec<u8>,
) -> io::Result<()> {
    let mut stdout = stdout.map(BufReader::new);
    let mut stderr = stderr.map(BufReader::new);

    // `read_until` keeps partial lines in these across select! rounds
    let mut out_line = Vec::new();
    let mut err_line = Vec::new();

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = next_line(&mut stdout, &mut out_line) => {
                if read? == 0 {
                    stdout = None;
                }
                out.append(&mut out_line);
            }
            read = next_line(&mut stderr, &mut err_line) => {
                if read? == 0 {
                    stderr = None;
                }
                out.append(&mut err_line);
            }
        }
    }
    Ok(())
}

async fn next_line<R>(reader: &mut Option<R>, buf: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    match reader {
        Some(r) => r.read_until(b'\n', buf).await,
        None => std::future::pending().await,
    }
}
