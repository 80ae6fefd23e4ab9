//! Runs `message/send` requests through the extraction service and keeps
//! the task table in step with the run.

use super::presenter::present;
use super::rpc::A2aError;
use super::task_store::TaskStore;
use super::types::{
    Message, MessageSendParams, Part, Task, TaskIdParams, TaskQueryParams, TaskState, TaskStatus,
};
use crate::application::agent::AgentError;
use crate::application::service::ExtractionService;
use crate::infrastructure::model::ModelProvider;
use std::sync::Arc;
use tracing::{error, info, warn};

const WORKING_MESSAGE: &str = "Processing your request...";

pub struct A2aExecutor<P: ModelProvider> {
    service: Arc<ExtractionService<P>>,
    tasks: Arc<TaskStore>,
}

impl<P: ModelProvider> A2aExecutor<P> {
    pub fn new(service: Arc<ExtractionService<P>>, tasks: Arc<TaskStore>) -> Self {
        Self { service, tasks }
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Runs the request carried by `params.message` to completion.
    pub async fn send_message(&self, params: MessageSendParams) -> Result<Task, A2aError> {
        let text = params
            .message
            .text()
            .ok_or_else(|| A2aError::InvalidParams("message has no text part".to_string()))?;

        let task = Task::submitted(&params.message);
        let task_id = task.id.clone();
        let cancel = self.tasks.insert(task).await?;
        info!(task_id = %task_id, "Task submitted");

        self.tasks
            .update(&task_id, |task| {
                let note = Message::agent(vec![Part::text(WORKING_MESSAGE)], task);
                task.status = TaskStatus::now(TaskState::Working, Some(note));
            })
            .await?;

        match self.service.process_message(&text, &cancel).await {
            Ok(response) => {
                let (parts, artifact) = present(&response);
                let state = if response.error.is_some() {
                    TaskState::Failed
                } else {
                    TaskState::Completed
                };
                let task = self
                    .tasks
                    .update(&task_id, |task| {
                        let reply = Message::agent(parts, task);
                        task.history.push(reply.clone());
                        task.artifacts.extend(artifact);
                        task.status = TaskStatus::now(state, Some(reply));
                    })
                    .await?;
                info!(task_id = %task_id, state = ?task.status.state, "Task finished");
                Ok(task)
            }
            Err(AgentError::Cancelled) => {
                warn!(task_id = %task_id, "Task canceled during run");
                self.tasks
                    .update(&task_id, |task| {
                        task.status = TaskStatus::now(TaskState::Canceled, None);
                    })
                    .await
            }
            Err(err) => {
                error!(task_id = %task_id, error = %err, "Task failed");
                let message = err.user_message();
                self.tasks
                    .update(&task_id, |task| {
                        let reply = Message::agent(vec![Part::text(message.clone())], task);
                        task.history.push(reply.clone());
                        task.status = TaskStatus::now(TaskState::Failed, Some(reply));
                    })
                    .await?;
                Err(A2aError::Internal(message))
            }
        }
    }

    pub async fn get_task(&self, params: TaskQueryParams) -> Result<Task, A2aError> {
        self.tasks.get(&params.id, params.history_length).await
    }

    pub async fn cancel_task(&self, params: TaskIdParams) -> Result<Task, A2aError> {
        let task = self.tasks.cancel(&params.id).await?;
        info!(task_id = %params.id, "Task cancel requested");
        Ok(task)
    }
}
