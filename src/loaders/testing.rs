//! 不需要真實資料庫的 `CommandRunner`，供單元與整合測試使用。

use crate::loaders::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Responder = dyn Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync;

/// 記錄每次呼叫，並依 `responder` 決定回應
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    responder: Arc<Responder>,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self::with_responder(|_| Ok(CommandOutput::default()))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// 任何參數或 stdin 含有 `needle` 的呼叫都以 `CommandFailed` 回應
    pub fn failing_when(needle: &'static str) -> Self {
        Self::with_responder(move |spec| {
            let hit = spec.args.iter().any(|a| a.contains(needle))
                || spec.stdin.as_deref().is_some_and(|s| s.contains(needle));
            if hit {
                Err(EtlError::CommandFailed {
                    tool: spec.tool_name(),
                    command: needle.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: format!("simulated failure for {}", needle),
                })
            } else {
                Ok(CommandOutput::default())
            }
        })
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        (self.responder)(spec)
    }
}
