use anyhow::{anyhow, Context, Result};
use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Output of a process that ran to completion
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Last `count` non-empty stderr lines, for error messages
    pub fn stderr_tail(&self, count: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        lines[lines.len().saturating_sub(count)..].join("\n")
    }
}

/// Run a command, wait for it to exit and capture both output streams.
pub async fn run_to_completion<I, S>(program: &OsStr, args: I) -> Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("failed to start {}", program.to_string_lossy()))?;

    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// A running process whose stdout and stderr are merged into one line stream.
pub struct StreamingProcess {
    child: Child,
    lines: mpsc::UnboundedReceiver<String>,
}

impl StreamingProcess {
    pub fn spawn<I, S>(program: &OsStr, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start {}", program.to_string_lossy()))?;

        let stdout = child.stdout.take().ok_or_else(|| anyhow!("Failed to capture stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("Failed to capture stderr"))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_lines(stdout, tx.clone()));
        tokio::spawn(forward_lines(stderr, tx));

        Ok(Self { child, lines: rx })
    }

    /// Next output line, `None` once both streams are closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    pub async fn wait(&mut self) -> Result<ExitStatus> {
        self.child.wait().await.context("failed to wait for process")
    }

    /// Kill the process and reap it.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await.context("failed to terminate process")
    }
}

/// Forward lines from `reader` as soon as they are terminated by `\n` or `\r`.
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let (consumed, line_done) = match reader.fill_buf().await {
            Ok([]) | Err(_) => break,
            Ok(buf) => match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    pending.extend_from_slice(&buf[..end]);
                    (end + 1, true)
                }
                None => {
                    pending.extend_from_slice(buf);
                    (buf.len(), false)
                }
            },
        };
        reader.consume(consumed);

        if line_done {
            if !send_line(&pending, &tx) {
                return;
            }
            pending.clear();
        }
    }

    // Unterminated tail
    send_line(&pending, &tx);
}

/// Send one line unless it is blank. `false` once the receiver is gone.
fn send_line(bytes: &[u8], tx: &mpsc::UnboundedSender<String>) -> bool {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_end();
    if line.is_empty() {
        return true;
    }
    tx.send(line.to_string()).is_ok()
}
