//! Drive the `jules-mcp` binary over newline-delimited JSON-RPC on stdio.

use anyhow::{Context as _, bail};
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

const IO_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StdioSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: JoinHandle<String>,
    next_id: u64,
}

impl StdioSession {
    /// Spawn the server with the given environment and complete the MCP handshake.
    pub async fn start(env: &[(&str, &str)]) -> anyhow::Result<(Self, Value)> {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jules-mcp"));
        cmd.env_remove("JULES_API_KEY")
            .env_remove("JULES_API_URL")
            .env_remove("JULES_DOCS_PATH")
            .envs(env.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().context("spawn jules-mcp")?;
        let stdin = child.stdin.take().context("child stdin")?;
        let stdout = child.stdout.take().context("child stdout")?;
        let mut stderr = child.stderr.take().context("child stderr")?;
        let stderr = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut session = Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            stderr,
            next_id: 1,
        };

        let init = session
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2025-06-18",
                    "capabilities": {},
                    "clientInfo": { "name": "jules-mcp-tests", "version": "0.0.0" }
                }),
            )
            .await?;
        session
            .send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .await?;
        Ok((session, init))
    }

    /// Send a request and return the whole response envelope (`result` or `error`).
    pub async fn request(&mut self, method: &str, params: Value) -> anyhow::Result<Value> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await?;

        loop {
            let line = tokio::time::timeout(IO_TIMEOUT, self.stdout.next_line())
                .await
                .with_context(|| format!("timed out waiting for {method} response"))??
                .with_context(|| format!("server closed stdout before answering {method}"))?;
            if line.trim().is_empty() {
                continue;
            }
            let msg: Value = serde_json::from_str(&line)
                .with_context(|| format!("non-JSON line on stdout: {line}"))?;
            if msg.get("id") == Some(&json!(id)) {
                return Ok(msg);
            }
        }
    }

    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        self.request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }

    async fn send(&mut self, msg: Value) -> anyhow::Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            bail!("stdin already closed");
        };
        let mut line = serde_json::to_string(&msg)?;
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Close stdin, wait for exit and return everything written to stderr.
    pub async fn shutdown(mut self) -> anyhow::Result<String> {
        drop(self.stdin.take());
        if tokio::time::timeout(IO_TIMEOUT, self.child.wait()).await.is_err() {
            self.child.kill().await.context("kill jules-mcp")?;
        }
        let stderr = tokio::time::timeout(IO_TIMEOUT, self.stderr)
            .await
            .context("timed out collecting stderr")??;
        Ok(stderr)
    }
}

/// The single text block of a `tools/call` result.
pub fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
}
