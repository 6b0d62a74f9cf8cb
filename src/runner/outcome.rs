use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// How a unit of work failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The work panicked
    Panicked,
    /// The work returned an error
    Returned,
}

/// An unhandled failure from one scheduled unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task_id: u64,
    pub owner: String,
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub(crate) fn from_panic(task_id: u64, owner: &str, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self {
            task_id,
            owner: owner.to_string(),
            kind: FailureKind::Panicked,
            message,
        }
    }

    pub(crate) fn from_error(task_id: u64, owner: &str, message: String) -> Self {
        Self {
            task_id,
            owner: owner.to_string(),
            kind: FailureKind::Returned,
            message,
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            FailureKind::Panicked => "panicked",
            FailureKind::Returned => "failed",
        };
        write!(
            f,
            "task {} of {} {}: {}",
            self.task_id, self.owner, verb, self.message
        )
    }
}

impl From<TaskFailure> for crate::error::LifescopeError {
    fn from(failure: TaskFailure) -> Self {
        Self::task(failure.to_string())
    }
}

/// Final state of a scheduled unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Ran to completion
    Completed,
    /// Stopped because the owner was destroyed or the task was cancelled
    Cancelled,
    /// Never started because the owner was already destroyed
    Skipped,
    /// Panicked or returned an error
    Failed(TaskFailure),
}

impl TaskOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub const fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Values a unit of work may finish with
pub trait TaskResult {
    /// `Err` carries the rendered error
    fn into_task_result(self) -> Result<(), String>;
}

impl TaskResult for () {
    fn into_task_result(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> TaskResult for Result<(), E> {
    fn into_task_result(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

/// Receives failures no sibling or caller will observe
pub type FailureHandler = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let failure = TaskFailure::from_panic(1, "screen", &*payload);
        assert_eq!(failure.message, "boom");
        assert_eq!(failure.kind, FailureKind::Panicked);

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let failure = TaskFailure::from_panic(2, "screen", &*payload);
        assert_eq!(failure.message, "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(17_u8);
        let failure = TaskFailure::from_panic(3, "screen", &*payload);
        assert_eq!(failure.message, "non-string panic payload");
    }

    #[test]
    fn test_display() {
        let failure = TaskFailure::from_error(4, "screen", "disk full".to_string());
        assert_eq!(failure.to_string(), "task 4 of screen failed: disk full");
    }

    #[test]
    fn test_task_results() {
        assert_eq!(().into_task_result(), Ok(()));
        let ok: Result<(), std::io::Error> = Ok(());
        assert_eq!(ok.into_task_result(), Ok(()));
        let err: Result<(), anyhow::Error> = Err(anyhow::anyhow!("nope"));
        assert_eq!(err.into_task_result(), Err("nope".to_string()));
    }
}
