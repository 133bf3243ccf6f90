//! Waiting for asynchronous agent tasks to resolve.

use crate::config::PollingSettings;
use crate::container::{
    domain::{AgentRecord, RemoteTask, TaskId, TaskStatus},
    ports::{AgentApi, AgentClientError},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Errors ending a task wait.
#[derive(Debug, Clone, Error)]
pub enum TaskPollError {
    /// The agent reported the task as failed.
    #[error("agent task {task_id} failed")]
    Failed {
        /// Failed task.
        task_id: TaskId,
    },

    /// The task was still pending when the configured deadline expired.
    #[error("agent task {task_id} still pending after {waited:?}")]
    TimedOut {
        /// Pending task.
        task_id: TaskId,
        /// Time spent waiting.
        waited: Duration,
    },

    /// Reading the task status failed.
    #[error(transparent)]
    Agent(#[from] AgentClientError),
}

/// Re-reads a task at a fixed interval until it succeeds or fails.
///
/// The wait runs on the caller's task; no background scheduling is
/// involved and the only suspension point is the interval sleep.
#[derive(Clone)]
pub struct TaskPoller<A>
where
    A: AgentApi,
{
    agent: Arc<A>,
    settings: PollingSettings,
}

impl<A> TaskPoller<A>
where
    A: AgentApi,
{
    /// Creates a poller reading tasks through `agent`.
    #[must_use]
    pub const fn new(agent: Arc<A>, settings: PollingSettings) -> Self {
        Self { agent, settings }
    }

    /// Waits for `task` to resolve, returning its final representation.
    ///
    /// A pending status causes exactly one more read after the interval.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPollError::Failed`] when the agent reports an error
    /// status, [`TaskPollError::TimedOut`] when the deadline expires first,
    /// and [`TaskPollError::Agent`] when a status read fails.
    pub async fn wait(
        &self,
        agent: &AgentRecord,
        task: RemoteTask,
    ) -> Result<RemoteTask, TaskPollError> {
        let task_id = task.id();
        let started = Instant::now();
        let mut current = task;
        let mut polls = 0_u32;

        loop {
            match current.status() {
                TaskStatus::Success => {
                    debug!(%task_id, polls, "agent task succeeded");
                    return Ok(current);
                }
                TaskStatus::Error => return Err(TaskPollError::Failed { task_id }),
                TaskStatus::Pending => {}
            }

            let waited = started.elapsed();
            if let Some(deadline) = self.settings.deadline
                && waited >= deadline
            {
                return Err(TaskPollError::TimedOut { task_id, waited });
            }

            debug!(
                %task_id,
                status = current.reported_status(),
                "agent task pending"
            );
            sleep(self.settings.interval).await;
            current = self.agent.task_status(agent, task_id).await?;
            polls += 1;
        }
    }
}
