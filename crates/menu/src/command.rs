//! Action handlers and execution outcomes.
//!
//! The registry stores handlers as opaque values. What a handler does, and
//! whether it succeeds, is the host's business; the registry only reports
//! the outcome of an invocation it was asked to make.

use std::fmt;
use std::sync::Arc;

type HandlerFn = dyn Fn() -> anyhow::Result<()> + Send + Sync;

/// A cloneable, thread-safe invocation handle for an action.
#[derive(Clone)]
pub struct ActionHandler(Arc<HandlerFn>);

impl ActionHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the handler.
    pub fn invoke(&self) -> anyhow::Result<()> {
        (self.0)()
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler(..)")
    }
}

/// Result of asking the registry to execute a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The handler ran and returned `Ok`.
    Success,
    /// No node with that id exists.
    NotFound,
    /// The node exists but has no handler bound.
    NoHandler,
    /// The node is currently disabled.
    Disabled,
    /// The handler ran and returned an error.
    Failed(String),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::NotFound => f.write_str("command not found"),
            Self::NoHandler => f.write_str("command has no handler"),
            Self::Disabled => f.write_str("command is disabled"),
            Self::Failed(msg) => write!(f, "execution failed: {msg}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handler_invokes_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = ActionHandler::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        handler.invoke().unwrap();
        handler.clone().invoke().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_outcome_carries_message() {
        let outcome = ExecutionOutcome::Failed("disk full".to_string());
        assert!(!outcome.is_success());
        assert_eq!(outcome.to_string(), "execution failed: disk full");
    }
}
