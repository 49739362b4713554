use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// `run_streaming` 的逐行回呼；傳入的位元組包含行尾的 `\n`
pub type LineSink<'a> = dyn FnMut(&[u8]) -> Result<()> + Send + 'a;

/// 一次外部工具呼叫 (psql / sqlite3 / mysql / isql)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<String>,
    secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
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

    /// 日誌輸出時以 `****` 取代的值
    pub fn secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.secrets.push(value);
        }
        self
    }

    /// 工具名稱 (不含路徑)，用於錯誤訊息
    pub fn tool_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }

    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| self.redact(arg)));
        parts.join(" ")
    }

    fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), "****"))
    }

    /// 失敗訊息中要顯示的指令內容：有 stdin 時顯示 stdin，否則顯示參數
    fn command_text(&self) -> String {
        match &self.stdin {
            Some(input) => self.redact(input.trim()),
            None => self.display(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 執行指令；找不到執行檔回傳 `ToolNotFound`，非零結束碼回傳 `CommandFailed`
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// 逐行把 stdout 交給 `on_line`，不保留整份輸出；回傳 stderr。
    /// 預設實作先呼叫 `run` 再切行，只適合輸出很小的 runner。
    async fn run_streaming(&self, spec: &CommandSpec, on_line: &mut LineSink<'_>) -> Result<String> {
        let output = self.run(spec).await?;
        for line in output.stdout.split_inclusive(|b| *b == b'\n') {
            on_line(line)?;
        }
        Ok(output.stderr)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    async fn spawn(spec: &CommandSpec) -> Result<Child> {
        tracing::debug!("Running: {}", spec.display());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EtlError::ToolNotFound {
                tool: spec.program.clone(),
            },
            _ => EtlError::IoError(e),
        })?;

        if let Some(input) = &spec.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await?;
            }
        }

        Ok(child)
    }

    fn failure(spec: &CommandSpec, status: std::process::ExitStatus, stderr: String) -> EtlError {
        EtlError::CommandFailed {
            tool: spec.tool_name(),
            command: spec.command_text(),
            status: status.to_string(),
            stderr,
        }
    }
}

fn stream_missing(name: &str) -> EtlError {
    EtlError::ProcessingError {
        message: format!("child process {} was not captured", name),
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let child = Self::spawn(spec).await?;
        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Self::failure(spec, output.status, stderr));
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr,
        })
    }

    async fn run_streaming(&self, spec: &CommandSpec, on_line: &mut LineSink<'_>) -> Result<String> {
        let mut child = Self::spawn(spec).await?;
        let stdout = child.stdout.take().ok_or_else(|| stream_missing("stdout"))?;
        let mut stderr = child.stderr.take().ok_or_else(|| stream_missing("stderr"))?;

        // stderr 另外讀，避免子程序因 stderr 管線塞滿而卡住
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        let mut reader = BufReader::new(stdout);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            // 回呼失敗時 child 被 drop，kill_on_drop 會結束子程序
            on_line(&line)?;
        }

        let status = child.wait().await?;
        let stderr = stderr_task
            .await
            .map_err(|e| EtlError::ProcessingError {
                message: format!("stderr reader failed: {}", e),
            })??;
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        if !status.success() {
            return Err(Self::failure(spec, status, stderr));
        }
        Ok(stderr)
    }
}
