//! Structured sub-handlers: `tool.activity` events whose `text` starts with
//! a recognized prefix carry a JSON payload instead of free-form commentary.
//! Parse failures here are swallowed — the event is still acknowledged,
//! since the producer may simply retry with well-formed JSON on its next
//! tool call.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredEvent {
    TaskCreate { subject: String },
    TaskUpdate { task_id: u64, status: Option<String>, subject: Option<String> },
    GitCommit { message: String, stat: Option<String> },
    GitPush { remote_ref: String, to_hash: String },
    SubagentDone { subagent_type: String, summary: String },
}

const PREFIXES: &[(&str, fn(&Value) -> Option<StructuredEvent>)] = &[
    ("TASK_CREATE:", parse_task_create),
    ("TASK_UPDATE:", parse_task_update),
    ("GIT_COMMIT:", parse_git_commit),
    ("GIT_PUSH:", parse_git_push),
    ("SUBAGENT_DONE:", parse_subagent_done),
];

/// Returns `Some` only when `text` starts with a recognized prefix and the
/// remainder parses as the expected JSON shape. Any other `tool.activity`
/// text (including a recognized prefix with malformed JSON) returns `None`
/// and is treated as ordinary streaming output instead.
pub fn parse(text: &str) -> Option<StructuredEvent> {
    for (prefix, parser) in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            let value: Value = serde_json::from_str(rest.trim()).ok()?;
            return parser(&value);
        }
    }
    None
}

#[derive(Deserialize)]
struct TaskCreatePayload {
    subject: String,
}

fn parse_task_create(value: &Value) -> Option<StructuredEvent> {
    let payload: TaskCreatePayload = serde_json::from_value(value.clone()).ok()?;
    Some(StructuredEvent::TaskCreate { subject: payload.subject })
}

#[derive(Deserialize)]
struct TaskUpdatePayload {
    #[serde(rename = "taskId")]
    task_id: String,
    status: Option<String>,
    subject: Option<String>,
}

fn parse_task_update(value: &Value) -> Option<StructuredEvent> {
    let payload: TaskUpdatePayload = serde_json::from_value(value.clone()).ok()?;
    let task_id = payload.task_id.parse().ok()?;
    Some(StructuredEvent::TaskUpdate {
        task_id,
        status: payload.status,
        subject: payload.subject,
    })
}

#[derive(Deserialize)]
struct GitCommitPayload {
    message: String,
    stat: Option<String>,
}

fn parse_git_commit(value: &Value) -> Option<StructuredEvent> {
    let payload: GitCommitPayload = serde_json::from_value(value.clone()).ok()?;
    Some(StructuredEvent::GitCommit { message: payload.message, stat: payload.stat })
}

#[derive(Deserialize)]
struct GitPushPayload {
    #[serde(rename = "remoteRef")]
    remote_ref: String,
    #[serde(rename = "toHash")]
    to_hash: String,
}

fn parse_git_push(value: &Value) -> Option<StructuredEvent> {
    let payload: GitPushPayload = serde_json::from_value(value.clone()).ok()?;
    Some(StructuredEvent::GitPush { remote_ref: payload.remote_ref, to_hash: payload.to_hash })
}

#[derive(Deserialize)]
struct SubagentDonePayload {
    #[serde(rename = "subagentType")]
    subagent_type: String,
    summary: String,
}

fn parse_subagent_done(value: &Value) -> Option<StructuredEvent> {
    let payload: SubagentDonePayload = serde_json::from_value(value.clone()).ok()?;
    Some(StructuredEvent::SubagentDone { subagent_type: payload.subagent_type, summary: payload.summary })
}

/// `📦 *Committed:* \`<message>\`` with an optional stat line appended.
pub fn render_git_commit(message: &str, stat: Option<&str>) -> String {
    let mut text = format!("📦 *Committed:* `{message}`");
    if let Some(stat) = stat {
        text.push('\n');
        text.push_str(stat);
    }
    text
}

/// `🚀 *Pushed to* \`<remoteRef>\` (\`<toHash[:7]>\`)`.
pub fn render_git_push(remote_ref: &str, to_hash: &str) -> String {
    let short = &to_hash[..to_hash.len().min(7)];
    format!("🚀 *Pushed to* `{remote_ref}` (`{short}`)")
}

/// `🔍 *<subagentType> 완료:* <summary>`, or `None` when the summary is
/// empty (nothing worth posting).
pub fn render_subagent_done(subagent_type: &str, summary: &str) -> Option<String> {
    if summary.is_empty() {
        return None;
    }
    Some(format!("🔍 *{subagent_type} 완료:* {summary}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_create() {
        let event = parse(r#"TASK_CREATE:{"subject":"Fix bug"}"#).unwrap();
        assert_eq!(event, StructuredEvent::TaskCreate { subject: "Fix bug".to_string() });
    }

    #[test]
    fn parses_task_update_with_string_task_id() {
        let event = parse(r#"TASK_UPDATE:{"taskId":"1","status":"completed"}"#).unwrap();
        assert_eq!(
            event,
            StructuredEvent::TaskUpdate { task_id: 1, status: Some("completed".to_string()), subject: None }
        );
    }

    #[test]
    fn malformed_json_returns_none_instead_of_erroring() {
        assert!(parse("TASK_CREATE:{not json}").is_none());
    }

    #[test]
    fn unrecognized_prefix_returns_none() {
        assert!(parse("plain streaming text").is_none());
    }

    #[test]
    fn renders_git_push_truncates_hash_to_seven_chars() {
        let text = render_git_push("origin/main", "abcdef1234567890");
        assert_eq!(text, "🚀 *Pushed to* `origin/main` (`abcdef1`)");
    }

    #[test]
    fn subagent_done_skips_empty_summary() {
        assert_eq!(render_subagent_done("reviewer", ""), None);
        assert!(render_subagent_done("reviewer", "looks good").is_some());
    }
}
