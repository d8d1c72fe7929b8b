//! Hook envelope parsing and validation: turns an arbitrary inbound JSON
//! body into a typed [`HookEnvelope`], rejecting malformed shapes while
//! tolerating unrecognized event types (those are accepted here and turned
//! away at dispatch instead).

use serde_json::Value;

/// The closed set of event types the pipeline knows how to dispatch.
/// Anything else still parses successfully as `Unrecognized` so validation
/// can return a 200 no-op rather than a 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    SessionStart,
    SessionEnd,
    SessionError,
    SessionNotification,
    SessionIdle,
    ThinkingStart,
    ThinkingStop,
    ToolActivity,
    ToolFailure,
    PermissionRequest,
    TaskCompleted,
    PromptSubmit,
    TeammateIdle,
    Unrecognized(String),
}

impl EventType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "session.start" => Self::SessionStart,
            "session.end" => Self::SessionEnd,
            "session.error" => Self::SessionError,
            "session.notification" => Self::SessionNotification,
            "session.idle" => Self::SessionIdle,
            "thinking.start" => Self::ThinkingStart,
            "thinking.stop" => Self::ThinkingStop,
            "tool.activity" => Self::ToolActivity,
            "tool.failure" => Self::ToolFailure,
            "permission.request" => Self::PermissionRequest,
            "task.completed" => Self::TaskCompleted,
            "prompt.submit" => Self::PromptSubmit,
            "teammate.idle" => Self::TeammateIdle,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SessionStart => "session.start",
            Self::SessionEnd => "session.end",
            Self::SessionError => "session.error",
            Self::SessionNotification => "session.notification",
            Self::SessionIdle => "session.idle",
            Self::ThinkingStart => "thinking.start",
            Self::ThinkingStop => "thinking.stop",
            Self::ToolActivity => "tool.activity",
            Self::ToolFailure => "tool.failure",
            Self::PermissionRequest => "permission.request",
            Self::TaskCompleted => "task.completed",
            Self::PromptSubmit => "prompt.submit",
            Self::TeammateIdle => "teammate.idle",
            Self::Unrecognized(s) => s,
        }
    }
}

/// A validated hook event. `extra` carries fields this crate doesn't model
/// directly (`toolName`, `toolInput`, `taskId`, `subject`, `teammate`,
/// `subagentType`, `summary`, `remoteRef`, `toHash`, `stat`, …) so typed
/// handlers downstream can pull what they need without this layer having to
/// know every event-specific payload shape.
#[derive(Debug, Clone)]
pub struct HookEnvelope {
    pub event_type: EventType,
    pub project_name: String,
    pub agent_type: Option<String>,
    pub instance_id: Option<String>,
    pub text: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    pub turn_id: Option<String>,
    pub extra: serde_json::Map<String, Value>,
}

impl HookEnvelope {
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

fn optional_string_field(obj: &serde_json::Map<String, Value>, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("`{key}` must be a string when present"));
            None
        }
    }
}

/// Validate an arbitrary JSON payload into a [`HookEnvelope`]. Rejects
/// non-object bodies and missing/empty `type`/`projectName`; type-checks
/// the other known fields when present; passes everything else through
/// into `extra` untouched. An unrecognized `type` string still validates
/// successfully — rejection of unknown types is a dispatch-time decision,
/// not a validation-time one.
pub fn validate(payload: &Value) -> Result<HookEnvelope, Vec<String>> {
    let mut errors = Vec::new();

    let Value::Object(obj) = payload else {
        return Err(vec!["payload must be a JSON object".to_string()]);
    };

    let event_type = match obj.get("type") {
        Some(Value::String(s)) if !s.is_empty() => EventType::parse(s),
        Some(Value::String(_)) => {
            errors.push("`type` must be a non-empty string".to_string());
            EventType::Unrecognized(String::new())
        }
        _ => {
            errors.push("`type` is required and must be a non-empty string".to_string());
            EventType::Unrecognized(String::new())
        }
    };

    let project_name = match obj.get("projectName") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => {
            errors.push("`projectName` is required and must be a non-empty string".to_string());
            String::new()
        }
    };

    let agent_type = optional_string_field(obj, "agentType", &mut errors);
    let instance_id = optional_string_field(obj, "instanceId", &mut errors);
    let text = optional_string_field(obj, "text", &mut errors);
    let message = optional_string_field(obj, "message", &mut errors);
    let timestamp = optional_string_field(obj, "timestamp", &mut errors);
    let turn_id = optional_string_field(obj, "turnId", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut extra = obj.clone();
    for key in [
        "type",
        "projectName",
        "agentType",
        "instanceId",
        "text",
        "message",
        "timestamp",
        "turnId",
    ] {
        extra.remove(key);
    }

    Ok(HookEnvelope {
        event_type,
        project_name,
        agent_type,
        instance_id,
        text,
        message,
        timestamp,
        turn_id,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payload() {
        let result = validate(&json!("not an object"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_required_fields() {
        let result = validate(&json!({}));
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn accepts_unrecognized_type_as_no_op_candidate() {
        let envelope = validate(&json!({"type": "mystery.event", "projectName": "p"})).unwrap();
        assert_eq!(envelope.event_type, EventType::Unrecognized("mystery.event".to_string()));
    }

    #[test]
    fn type_checks_optional_fields() {
        let result = validate(&json!({"type": "session.start", "projectName": "p", "text": 5}));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_fields_pass_through_into_extra() {
        let envelope = validate(&json!({
            "type": "permission.request",
            "projectName": "p",
            "toolName": "Bash",
            "toolInput": "npm test",
        }))
        .unwrap();
        assert_eq!(envelope.extra_str("toolName"), Some("Bash"));
        assert_eq!(envelope.extra_str("toolInput"), Some("npm test"));
    }
}
