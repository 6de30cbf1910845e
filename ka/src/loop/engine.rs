//! LoopEngine - drives provider calls and tool execution for one run

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::LoopConfig;
use crate::config::{Config, MAX_RUN_TIMEOUT_MS};
use crate::llm::{AgentMessage, Conversation, LlmClient, LlmError, Message, OllamaClient, ProviderRequest, ToolCall};
use crate::tools::{ToolContext, ToolError, ToolExecutor, ToolSettings};

/// Hard failures that abort a run
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("conversation is empty")]
    EmptyConversation,

    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error("max tool-calling steps exceeded ({0})")]
    StepsExceeded(u32),

    #[error("run deadline exceeded")]
    Timeout,

    #[error("run cancelled")]
    Cancelled,
}

/// Caller-supplied bounds for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overall deadline; the configured run timeout applies when absent
    pub deadline: Option<Instant>,

    /// Cancels the provider call or tool in flight
    pub cancel: Option<CancellationToken>,
}

impl RunOptions {
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// The orchestration loop
///
/// Holds no per-run state: each run borrows its conversation mutably and
/// derives its own tool context from the engine's.
pub struct LoopEngine {
    config: LoopConfig,
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    ctx: ToolContext,
}

impl LoopEngine {
    pub fn new(config: LoopConfig, llm: Arc<dyn LlmClient>, executor: ToolExecutor, ctx: ToolContext) -> Self {
        debug!(model = %config.model, max_steps = config.max_steps, root = ?ctx.root(), "LoopEngine::new: called");
        Self {
            config,
            llm,
            executor,
            ctx,
        }
    }

    /// Wire an engine to the configured Ollama endpoint, confined to `root`
    pub fn from_config(config: &Config, root: &Path) -> Result<Self, ToolError> {
        debug!(?root, "LoopEngine::from_config: called");
        let llm: Arc<dyn LlmClient> = Arc::new(OllamaClient::from_config(&config.llm));
        let executor = ToolExecutor::with_settings(ToolSettings::from_secs(
            config.tools.shell_timeout_secs,
            config.tools.fetch_timeout_secs,
        ));
        let ctx = ToolContext::new(root)?;
        Ok(Self::new(LoopConfig::from(config), llm, executor, ctx))
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Resolve the conversation to a final assistant message
    pub async fn run(&self, conversation: &mut Conversation) -> Result<Message, LoopError> {
        self.run_with(conversation, RunOptions::default()).await
    }

    /// Resolve the conversation under caller-supplied bounds
    ///
    /// Every assistant turn and tool result is appended to `conversation` as
    /// it happens, so on a hard failure the history still shows how far the
    /// run got.
    pub async fn run_with(&self, conversation: &mut Conversation, options: RunOptions) -> Result<Message, LoopError> {
        if conversation.is_empty() {
            debug!("LoopEngine::run_with: empty conversation");
            return Err(LoopError::EmptyConversation);
        }

        let deadline = options.deadline.unwrap_or_else(|| run_deadline(self.config.run_timeout));
        let cancel = options.cancel.unwrap_or_default();
        let ctx = self
            .ctx
            .clone()
            .with_cancellation(cancel.clone())
            .with_deadline(Some(deadline));
        let tools = self.executor.definitions();

        info!(
            model = %self.config.model,
            messages = conversation.len(),
            max_steps = self.config.max_steps,
            "LoopEngine::run_with: starting run"
        );

        for step in 1..=self.config.max_steps {
            if cancel.is_cancelled() {
                return Err(LoopError::Cancelled);
            }
            if Instant::now() >= deadline {
                debug!(step, "LoopEngine::run_with: deadline passed before request");
                return Err(LoopError::Timeout);
            }

            debug!(step, messages = conversation.len(), "LoopEngine::run_with: requesting");
            let request = ProviderRequest::new(&self.config.model, conversation, &tools)
                .with_options(self.config.options.clone());

            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(step, "LoopEngine::run_with: cancelled during provider call");
                    return Err(LoopError::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    debug!(step, "LoopEngine::run_with: deadline hit during provider call");
                    return Err(LoopError::Timeout);
                }
                result = self.llm.chat(request) => result?,
            };

            let done = reply.done;
            let AgentMessage {
                content, tool_calls, ..
            } = reply.message;

            if !tool_calls.is_empty() {
                let calls = assign_call_ids(tool_calls);
                info!(step, count = calls.len(), "LoopEngine::run_with: executing tool calls");
                conversation.push(Message::assistant_with_calls(content, calls.clone()));

                for call in &calls {
                    let result = self.executor.execute(call, &ctx).await;
                    debug!(
                        tool_name = %call.name(),
                        is_error = result.is_error,
                        len = result.content.len(),
                        "LoopEngine::run_with: tool finished"
                    );
                    conversation.push(Message::tool_result(&call.id, call.name(), result.content));
                }
                continue;
            }

            if !content.is_empty() {
                info!(step, len = content.len(), "LoopEngine::run_with: final answer");
                let message = Message::assistant(content);
                conversation.push(message.clone());
                return Ok(message);
            }

            if done {
                info!(step, "LoopEngine::run_with: provider finished without text");
                let message = Message::assistant("");
                conversation.push(message.clone());
                return Ok(message);
            }

            warn!(step, "LoopEngine::run_with: empty reply, asking again");
        }

        warn!(max_steps = self.config.max_steps, "LoopEngine::run_with: step bound reached");
        Err(LoopError::StepsExceeded(self.config.max_steps))
    }
}

/// Deadline `timeout` from now, saturating at one day out
fn run_deadline(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_millis(MAX_RUN_TIMEOUT_MS))
}

/// Give every call an id so its result can be correlated
fn assign_call_ids(calls: Vec<ToolCall>) -> Vec<ToolCall> {
    calls
        .into_iter()
        .map(|mut call| {
            if call.id.is_empty() {
                call.id = format!("call_{}", Uuid::now_v7().simple());
                debug!(id = %call.id, tool_name = %call.name(), "assign_call_ids: generated id");
            }
            call
        })
        .collect()
}
