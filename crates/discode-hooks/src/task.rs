//! Per-instance task checklist: a chat message rebuilt in place every time
//! a task is created or updated. IDs are small monotonic integers; a
//! completed task can never be demoted back to pending/in_progress.

use std::sync::Arc;

use dashmap::DashMap;
use discode_core::types::{ChannelId, InstanceKey, MessageId, ProjectName};

pub type TaskKey = (ProjectName, InstanceKey);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    fn icon(self) -> &'static str {
        match self {
            TaskStatus::Pending => "⬜",
            TaskStatus::InProgress => "🔄",
            TaskStatus::Completed => "☑️",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: u64,
    pub subject: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default)]
struct Checklist {
    channel_id: Option<ChannelId>,
    message_id: Option<MessageId>,
    tasks: Vec<Task>,
    next_id: u64,
}

/// Process-wide table of task checklists, one per `(projectName,
/// instanceKey)`. Cleared wholesale on session end.
#[derive(Debug, Default)]
pub struct TaskChecklists {
    checklists: DashMap<TaskKey, Checklist>,
}

impl TaskChecklists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the channel + message id of a checklist's first render, so
    /// later mutations know where to edit.
    pub fn set_message(&self, key: TaskKey, channel_id: ChannelId, message_id: MessageId) {
        let mut entry = self.checklists.entry(key).or_default();
        entry.channel_id = Some(channel_id);
        entry.message_id = Some(message_id);
    }

    pub fn message_id(&self, key: &TaskKey) -> Option<MessageId> {
        self.checklists.get(key).and_then(|c| c.message_id.clone())
    }

    /// `TASK_CREATE:{subject}` — append a new pending task, return its id.
    pub fn create(&self, key: TaskKey, subject: &str) -> u64 {
        let mut entry = self.checklists.entry(key).or_default();
        let id = entry.next_id + 1;
        entry.next_id = id;
        entry.tasks.push(Task {
            id,
            subject: subject.to_string(),
            status: TaskStatus::Pending,
        });
        id
    }

    /// `TASK_UPDATE:{taskId,status?,subject?}` — mutate the matching task.
    /// A task already `Completed` never gets demoted by a status change;
    /// its subject may still be corrected.
    pub fn update(&self, key: &TaskKey, task_id: u64, status: Option<&str>, subject: Option<&str>) {
        let Some(mut entry) = self.checklists.get_mut(key) else {
            return;
        };
        let Some(task) = entry.tasks.iter_mut().find(|t| t.id == task_id) else {
            return;
        };
        if let Some(subject) = subject {
            task.subject = subject.to_string();
        }
        if task.status == TaskStatus::Completed {
            return;
        }
        if let Some(status) = status.and_then(TaskStatus::parse) {
            task.status = status;
        }
    }

    /// Demote a task from `in_progress` back to `pending`, e.g. when the
    /// tool call that was driving it fails. A no-op on tasks that are
    /// already `pending` or, per the never-demote invariant, `completed`.
    pub fn demote_in_progress(&self, key: &TaskKey, task_id: u64) {
        let Some(mut entry) = self.checklists.get_mut(key) else {
            return;
        };
        let Some(task) = entry.tasks.iter_mut().find(|t| t.id == task_id) else {
            return;
        };
        if task.status == TaskStatus::InProgress {
            task.status = TaskStatus::Pending;
        }
    }

    pub fn clear(&self, key: &TaskKey) {
        self.checklists.remove(key);
    }

    /// Render the current checklist text for `key`, or `None` if no
    /// checklist exists yet.
    pub fn render(&self, key: &TaskKey) -> Option<String> {
        let entry = self.checklists.get(key)?;
        Some(render_tasks(&entry.tasks))
    }
}

fn render_tasks(tasks: &[Task]) -> String {
    let completed = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();
    let mut lines = vec![format!("📋 작업 목록 ({}/{} 완료)", completed, tasks.len())];
    for task in tasks {
        lines.push(format!("{} #{} {}", task.status.icon(), task.id, task.subject));
    }
    lines.join("\n")
}

pub type SharedTaskChecklists = Arc<TaskChecklists>;

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TaskKey {
        (ProjectName::from("p"), InstanceKey::new(&Default::default(), None))
    }

    #[test]
    fn renders_exact_checklist_format_from_scenario() {
        let checklists = TaskChecklists::new();
        let k = key();
        checklists.create(k.clone(), "Fix bug");
        checklists.create(k.clone(), "Write test");
        checklists.update(&k, 1, Some("completed"), None);

        let text = checklists.render(&k).unwrap();
        assert_eq!(text, "📋 작업 목록 (1/2 완료)\n☑️ #1 Fix bug\n⬜ #2 Write test");
    }

    #[test]
    fn completed_task_cannot_be_demoted() {
        let checklists = TaskChecklists::new();
        let k = key();
        checklists.create(k.clone(), "Fix bug");
        checklists.update(&k, 1, Some("completed"), None);
        checklists.update(&k, 1, Some("pending"), None);

        let text = checklists.render(&k).unwrap();
        assert!(text.contains("☑️ #1 Fix bug"));
    }

    #[test]
    fn repeated_identical_update_is_idempotent() {
        let checklists = TaskChecklists::new();
        let k = key();
        checklists.create(k.clone(), "Fix bug");
        checklists.update(&k, 1, Some("in_progress"), None);
        let first = checklists.render(&k).unwrap();
        checklists.update(&k, 1, Some("in_progress"), None);
        let second = checklists.render(&k).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn clear_drops_the_checklist() {
        let checklists = TaskChecklists::new();
        let k = key();
        checklists.create(k.clone(), "Fix bug");
        checklists.clear(&k);
        assert!(checklists.render(&k).is_none());
    }
}
