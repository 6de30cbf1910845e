//! Argument extraction for loosely-typed tool calls

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::ToolError;
use crate::llm::ToolArgs;

/// Required non-empty string argument
pub fn required_str<'a>(args: &'a ToolArgs, name: &'static str) -> Result<&'a str, ToolError> {
    match present_str(args, name)? {
        "" => Err(ToolError::MissingArgument(name)),
        s => Ok(s),
    }
}

/// Required string argument that may be empty
pub fn present_str<'a>(args: &'a ToolArgs, name: &'static str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => {
            debug!(%name, ?other, "present_str: wrong type");
            Err(ToolError::InvalidArgument {
                name,
                expected: "string",
            })
        }
    }
}

/// Optional timeout in seconds, falling back to `default`
///
/// Accepts integer or fractional seconds, as a number or a numeric string.
/// Anything absent, unparseable, zero or negative yields the default.
pub fn timeout_secs(args: &ToolArgs, name: &str, default: Duration) -> Duration {
    let secs = match args.get(name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match secs.filter(|s| *s > 0.0).and_then(|s| Duration::try_from_secs_f64(s).ok()) {
        Some(timeout) => timeout,
        None => {
            debug!(%name, ?default, "timeout_secs: using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str() {
        let a = args(json!({"path": "a.txt", "empty": "", "num": 3, "nil": null}));

        assert_eq!(required_str(&a, "path").unwrap(), "a.txt");
        assert!(matches!(required_str(&a, "empty"), Err(ToolError::MissingArgument("empty"))));
        assert!(matches!(required_str(&a, "nil"), Err(ToolError::MissingArgument("nil"))));
        assert!(matches!(required_str(&a, "absent"), Err(ToolError::MissingArgument("absent"))));
        assert!(matches!(
            required_str(&a, "num"),
            Err(ToolError::InvalidArgument { name: "num", .. })
        ));
    }

    #[test]
    fn test_present_str_allows_empty() {
        let a = args(json!({"content": ""}));
        assert_eq!(present_str(&a, "content").unwrap(), "");
    }

    #[test]
    fn test_timeout_secs() {
        let default = Duration::from_secs(30);

        assert_eq!(timeout_secs(&args(json!({})), "t", default), default);
        assert_eq!(timeout_secs(&args(json!({"t": 5})), "t", default), Duration::from_secs(5));
        assert_eq!(timeout_secs(&args(json!({"t": 0.5})), "t", default), Duration::from_millis(500));
        assert_eq!(timeout_secs(&args(json!({"t": "2"})), "t", default), Duration::from_secs(2));
        assert_eq!(timeout_secs(&args(json!({"t": 0})), "t", default), default);
        assert_eq!(timeout_secs(&args(json!({"t": -3})), "t", default), default);
        assert_eq!(timeout_secs(&args(json!({"t": "soon"})), "t", default), default);
        assert_eq!(timeout_secs(&args(json!({"t": true})), "t", default), default);
    }
}
