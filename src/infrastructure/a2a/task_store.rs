use super::rpc::A2aError;
use super::types::{Task, TaskState, TaskStatus};
use crate::constants::DEFAULT_MAX_TASKS;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct StoredTask {
    task: Task,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Table {
    tasks: HashMap<String, StoredTask>,
    order: VecDeque<String>,
}

impl Table {
    /// Drops the oldest finished tasks until one more fits under `capacity`.
    /// Running tasks are never dropped, so the table may exceed its capacity
    /// while every stored task is still in flight.
    fn make_room(&mut self, capacity: usize) {
        while self.tasks.len() >= capacity {
            let Some(position) = self.order.iter().position(|id| {
                self.tasks
                    .get(id)
                    .is_some_and(|stored| stored.task.status.state.is_terminal())
            }) else {
                break;
            };
            if let Some(id) = self.order.remove(position) {
                self.tasks.remove(&id);
                debug!(task_id = %id, "Evicted finished task");
            }
        }
    }
}

/// In-memory task table. Tasks are lost on restart.
pub struct TaskStore {
    table: RwLock<Table>,
    capacity: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_TASKS)
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            capacity: capacity.max(1),
        }
    }

    /// Stores `task` and returns the token that cancels its run.
    pub async fn insert(&self, task: Task) -> Result<CancellationToken, A2aError> {
        let mut table = self.table.write().await;
        if table.tasks.contains_key(&task.id) {
            return Err(A2aError::InvalidParams(format!(
                "task '{}' already exists",
                task.id
            )));
        }
        table.make_room(self.capacity);

        let cancel = CancellationToken::new();
        table.order.push_back(task.id.clone());
        table.tasks.insert(
            task.id.clone(),
            StoredTask {
                task,
                cancel: cancel.clone(),
            },
        );
        Ok(cancel)
    }

    pub async fn count(&self) -> usize {
        self.table.read().await.tasks.len()
    }

    /// The task with its history trimmed to the last `history_length` messages.
    pub async fn get(&self, id: &str, history_length: Option<usize>) -> Result<Task, A2aError> {
        let table = self.table.read().await;
        let stored = table
            .tasks
            .get(id)
            .ok_or_else(|| A2aError::TaskNotFound(id.to_string()))?;
        let mut task = stored.task.clone();
        if let Some(limit) = history_length {
            let skip = task.history.len().saturating_sub(limit);
            task.history.drain(..skip);
        }
        Ok(task)
    }

    /// Applies `change` unless the task already reached a terminal state.
    /// Returns the task as stored afterwards.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<Task, A2aError>
    where
        F: FnOnce(&mut Task),
    {
        let mut table = self.table.write().await;
        let stored = table
            .tasks
            .get_mut(id)
            .ok_or_else(|| A2aError::TaskNotFound(id.to_string()))?;
        if stored.task.status.state.is_terminal() {
            debug!(task_id = id, state = ?stored.task.status.state, "Ignoring update to finished task");
        } else {
            change(&mut stored.task);
        }
        Ok(stored.task.clone())
    }

    pub async fn cancel(&self, id: &str) -> Result<Task, A2aError> {
        let mut table = self.table.write().await;
        let stored = table
            .tasks
            .get_mut(id)
            .ok_or_else(|| A2aError::TaskNotFound(id.to_string()))?;
        if stored.task.status.state.is_terminal() {
            return Err(A2aError::TaskNotCancelable(id.to_string()));
        }
        stored.cancel.cancel();
        stored.task.status = TaskStatus::now(TaskState::Canceled, None);
        Ok(stored.task.clone())
    }
}
