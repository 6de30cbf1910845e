//! fetch_url tool - fetch a web page or document over HTTP(S)

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use scraper::Html;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::llm::ToolArgs;
use crate::tools::args::{required_str, timeout_secs};
use crate::tools::output::{CappedBuffer, MAX_OUTPUT_BYTES, TRUNCATION_NOTICE};
use crate::tools::{Tool, ToolContext, ToolError};

/// Default limit for one fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Identifies the agent to the servers it fetches from
pub const USER_AGENT: &str = concat!("kutagent/", env!("CARGO_PKG_VERSION"), " (fetch_url tool)");

/// Fetch content from an http(s) URL
pub struct FetchUrlTool {
    default_timeout: Duration,
}

impl FetchUrlTool {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for FetchUrlTool {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &'static str {
        "fetch_url"
    }

    fn description(&self) -> &'static str {
        "Fetch an http or https URL with GET. HTML is converted to plain text. Bodies over 1 MiB are truncated."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http:// or https:// URL"
                },
                "timeout_sec": {
                    "type": "number",
                    "description": "Timeout in seconds (default: 20)"
                }
            },
            "required": ["url"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let raw = required_str(args, "url")?;
        debug!(url = %raw, "FetchUrlTool::execute: called");

        let url = parse_url(raw)?;
        let timeout = ctx.effective_timeout(timeout_secs(args, "timeout_sec", self.default_timeout));

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        tokio::select! {
            result = fetch(&client, url) => result,
            _ = tokio::time::sleep(timeout) => {
                debug!(?timeout, "FetchUrlTool::execute: timed out");
                Err(ToolError::Timeout(timeout))
            }
            _ = ctx.cancellation().cancelled() => {
                debug!("FetchUrlTool::execute: cancelled");
                Err(ToolError::Cancelled)
            }
        }
    }
}

/// Accept only absolute http(s) URLs with a host
fn parse_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw.trim()).map_err(|e| ToolError::InvalidUrl(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ToolError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ToolError::InvalidUrl(format!("{}: missing host", raw)));
    }

    Ok(url)
}

async fn fetch(client: &reqwest::Client, url: Url) -> Result<String, ToolError> {
    let mut response = client.get(url).header(ACCEPT, "*/*").send().await?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    debug!(status, %content_type, "fetch: response received");

    let mut body = CappedBuffer::new(MAX_OUTPUT_BYTES);
    while let Some(chunk) = response.chunk().await? {
        body.push(&chunk);
        if body.is_truncated() {
            debug!("fetch: body cap reached");
            break;
        }
    }

    let text = if content_type.to_ascii_lowercase().contains("html") {
        html_to_text(&body.to_text())
    } else {
        body.to_text()
    };

    let mut out = format!("status={} content_type=\"{}\"\n{}", status, content_type, text);
    if body.is_truncated() {
        out.push_str(TRUNCATION_NOTICE);
    }
    Ok(out)
}

/// Visible text of an HTML document
///
/// Text inside script, style and noscript elements is dropped.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"))
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }

    clean_text(&raw)
}

/// Collapse whitespace runs to one space and trim
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
