//! Typed handlers (C6): one behavior per recognized event type, plus the
//! structured `tool.activity` sub-handlers. Every chat-side call here is
//! best-effort — a transient messaging failure is logged and swallowed so
//! the event still acknowledges; the only thing that aborts a handler
//! early is a routing failure, which never reaches this module at all.

use std::time::Duration;

use discode_core::types::MessageId;
use discode_hooks::{EventContext, EventType, HookEnvelope, PendingKey};

use crate::dispatch::Deps;
use crate::structured::{self, StructuredEvent};

pub async fn dispatch(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope) -> Result<(), String> {
    let key: PendingKey = (ctx.project_name.clone(), ctx.instance_key.clone());

    match &envelope.event_type {
        EventType::SessionStart => session_start(deps, ctx, &key).await,
        EventType::SessionEnd => session_end(deps, &key).await,
        EventType::SessionError => session_error(deps, ctx, envelope, &key).await,
        EventType::SessionNotification => session_notification(deps, ctx, envelope).await,
        EventType::SessionIdle => session_idle(deps, &key).await,
        EventType::ThinkingStart => thinking_start(deps, ctx, &key).await,
        EventType::ThinkingStop => thinking_stop(deps, ctx, &key).await,
        EventType::ToolActivity => tool_activity(deps, ctx, envelope, &key).await,
        EventType::ToolFailure => tool_failure(deps, ctx, envelope).await,
        EventType::PermissionRequest => permission_request(deps, ctx, envelope).await,
        EventType::TaskCompleted => task_completed(deps, ctx, envelope, &key).await,
        EventType::PromptSubmit => prompt_submit(deps, ctx, envelope, &key).await,
        EventType::TeammateIdle => teammate_idle(deps, &key).await,
        // Unknown types pass validation but never reach dispatch behavior
        // other than a no-op acknowledgement.
        EventType::Unrecognized(_) => Ok(()),
    }
}

async fn send(deps: &Deps, ctx: &EventContext, text: String) {
    if let Err(err) = deps.messaging.send_to_channel(&ctx.channel_id, &text).await {
        tracing::warn!(channel = %ctx.channel_id, error = %err, "chat send failed, dropping side effect");
    }
}

async fn session_start(deps: &Deps, ctx: &EventContext, key: &PendingKey) -> Result<(), String> {
    deps.pending.mark_completed(key);
    send(deps, ctx, "🚀 session started".to_string()).await;
    arm_idle_timer(deps, ctx, key);
    Ok(())
}

async fn session_end(deps: &Deps, key: &PendingKey) -> Result<(), String> {
    deps.streaming.finalize(key, deps.messaging.as_ref()).await;
    deps.pending.mark_completed(key);
    deps.tasks.clear(key);
    deps.timers.cancel(key);
    Ok(())
}

async fn session_error(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope, key: &PendingKey) -> Result<(), String> {
    let text = envelope.text.as_deref().or(envelope.message.as_deref()).unwrap_or("");
    send(deps, ctx, format!("⚠️ error: {text}")).await;
    deps.pending.mark_error(key);
    deps.streaming.discard(key);
    deps.timers.cancel(key);
    Ok(())
}

async fn session_notification(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope) -> Result<(), String> {
    let text = envelope.text.clone().unwrap_or_default();
    send(deps, ctx, text).await;
    Ok(())
}

async fn session_idle(deps: &Deps, key: &PendingKey) -> Result<(), String> {
    deps.streaming.finalize(key, deps.messaging.as_ref()).await;
    deps.pending.mark_completed(key);
    deps.timers.cancel(key);
    Ok(())
}

async fn thinking_start(deps: &Deps, ctx: &EventContext, key: &PendingKey) -> Result<(), String> {
    if let Some(snapshot) = &ctx.pending_snapshot {
        if let Err(err) = deps
            .messaging
            .add_reaction_to_message(&snapshot.channel_id, &snapshot.message_id, "🧠")
            .await
        {
            tracing::warn!(error = %err, "failed to add thinking reaction");
        }
    }
    arm_thinking_timer(deps, ctx, key);
    Ok(())
}

async fn thinking_stop(deps: &Deps, ctx: &EventContext, key: &PendingKey) -> Result<(), String> {
    deps.timers.cancel(key);
    if let Some(snapshot) = &ctx.pending_snapshot {
        if let Err(err) = deps
            .messaging
            .replace_own_reaction_on_message(&snapshot.channel_id, &snapshot.message_id, "🧠", "✅")
            .await
        {
            tracing::warn!(error = %err, "failed to replace thinking reaction");
        }
    }
    Ok(())
}

async fn tool_activity(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope, key: &PendingKey) -> Result<(), String> {
    let text = envelope.text.as_deref().unwrap_or("");

    if let Some(event) = structured::parse(text) {
        handle_structured(deps, ctx, key, event).await;
        return Ok(());
    }

    if !deps.streaming.has(key) {
        deps.streaming
            .start(key.clone(), deps.messaging.as_ref(), ctx.channel_id.clone(), "...")
            .await;
    }
    deps.streaming.append(key, deps.messaging.as_ref(), text).await;
    Ok(())
}

async fn handle_structured(deps: &Deps, ctx: &EventContext, key: &PendingKey, event: StructuredEvent) {
    match event {
        StructuredEvent::TaskCreate { subject } => {
            deps.tasks.create(key.clone(), &subject);
            sync_checklist_message(deps, ctx, key).await;
        }
        StructuredEvent::TaskUpdate { task_id, status, subject } => {
            deps.tasks.update(key, task_id, status.as_deref(), subject.as_deref());
            sync_checklist_message(deps, ctx, key).await;
        }
        StructuredEvent::GitCommit { message, stat } => {
            send(deps, ctx, structured::render_git_commit(&message, stat.as_deref())).await;
        }
        StructuredEvent::GitPush { remote_ref, to_hash } => {
            send(deps, ctx, structured::render_git_push(&remote_ref, &to_hash)).await;
        }
        StructuredEvent::SubagentDone { subagent_type, summary } => {
            if let Some(text) = structured::render_subagent_done(&subagent_type, &summary) {
                send(deps, ctx, text).await;
            }
        }
    }
}

/// Rebuild a task checklist message: send a new one on first render, edit
/// in place on every subsequent mutation.
async fn sync_checklist_message(deps: &Deps, ctx: &EventContext, key: &PendingKey) {
    let Some(text) = deps.tasks.render(key) else {
        return;
    };

    match deps.tasks.message_id(key) {
        Some(message_id) => {
            if let Err(err) = deps.messaging.update_message(&ctx.channel_id, &message_id, &text).await {
                tracing::warn!(error = %err, "failed to edit task checklist");
            }
        }
        None => match deps.messaging.send_to_channel_with_id(&ctx.channel_id, &text).await {
            Ok(message_id) => deps.tasks.set_message(key.clone(), ctx.channel_id.clone(), message_id),
            Err(err) => tracing::warn!(error = %err, "failed to post task checklist"),
        },
    }
}

async fn tool_failure(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope) -> Result<(), String> {
    let text = envelope.text.as_deref().unwrap_or("tool call failed");
    send(deps, ctx, format!("❌ {text}")).await;

    if let Some(task_id) = envelope.extra_str("taskId").and_then(|s| s.parse::<u64>().ok()) {
        let key = (ctx.project_name.clone(), ctx.instance_key.clone());
        deps.tasks.demote_in_progress(&key, task_id);
        sync_checklist_message(deps, ctx, &key).await;
    }
    Ok(())
}

async fn permission_request(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope) -> Result<(), String> {
    let tool_name = envelope.extra_str("toolName").filter(|s| !s.is_empty()).unwrap_or("unknown");
    let tool_input = envelope.extra_str("toolInput").filter(|s| !s.is_empty());

    let text = match tool_input {
        Some(input) => format!("🔐 *Permission needed:* `{tool_name}` — `{input}`"),
        None => format!("🔐 *Permission needed:* `{tool_name}`"),
    };
    send(deps, ctx, text).await;
    Ok(())
}

async fn task_completed(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope, key: &PendingKey) -> Result<(), String> {
    let subject = envelope.extra_str("subject").unwrap_or("");
    let text = match envelope.extra_str("teammate") {
        Some(teammate) if !teammate.is_empty() => format!("[{teammate}] ✅ Task completed: {subject}"),
        _ => format!("✅ Task completed: {subject}"),
    };
    send(deps, ctx, text).await;

    if let Some(task_id) = envelope.extra_str("taskId").and_then(|s| s.parse::<u64>().ok()) {
        deps.tasks.update(key, task_id, Some("completed"), None);
        sync_checklist_message(deps, ctx, key).await;
    }
    Ok(())
}

async fn prompt_submit(deps: &Deps, ctx: &EventContext, envelope: &HookEnvelope, key: &PendingKey) -> Result<(), String> {
    let message_id = envelope
        .extra_str("messageId")
        .map(MessageId::from)
        .unwrap_or_else(|| MessageId::from(format!("prompt-{}", key.1)));
    deps.pending.open_turn(key.clone(), ctx.channel_id.clone(), message_id);
    Ok(())
}

async fn teammate_idle(deps: &Deps, key: &PendingKey) -> Result<(), String> {
    deps.streaming.finalize(key, deps.messaging.as_ref()).await;
    deps.timers.cancel(key);
    Ok(())
}

/// Arm an idle timer for a freshly started session: if no further event
/// cancels it within the configured question timeout, mark the turn
/// errored so a stuck session doesn't leave a pending turn open forever.
fn arm_idle_timer(deps: &Deps, ctx: &EventContext, key: &PendingKey) {
    let token = deps.timers.arm(key.clone());
    let pending = deps.pending.clone();
    let duration = Duration::from_millis(deps.timeouts.question_timeout_ms);
    let key = key.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(duration) => {
                pending.mark_error(&key);
            }
        }
    });
    let _ = ctx;
}

/// Arm a timer that posts a "still thinking" placeholder if `thinking.stop`
/// doesn't arrive within the configured question timeout.
fn arm_thinking_timer(deps: &Deps, ctx: &EventContext, key: &PendingKey) {
    let token = deps.timers.arm(key.clone());
    let messaging = deps.messaging.clone();
    let channel_id = ctx.channel_id.clone();
    let duration = Duration::from_millis(deps.timeouts.question_timeout_ms);
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(duration) => {
                if let Err(err) = messaging.send_to_channel(&channel_id, "⏳ still thinking…").await {
                    tracing::warn!(error = %err, "failed to post thinking placeholder");
                }
            }
        }
    });
}
