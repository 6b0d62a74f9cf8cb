//! Lifecycle owners and their cancellation scope
//!
//! A [`Lifecycle`] tracks the state of a UI-bound component and owns the
//! cancellation token every background task launched against it derives
//! from. Reaching [`LifecycleState::Destroyed`] (or dropping the
//! `Lifecycle`) cancels that token; nothing can leave `Destroyed`.

use crate::error::{LifescopeError, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

/// States of a lifecycle owner, ordered from birth to destruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Constructed but not yet created
    Initialized,
    /// Created, or stopped after being started
    Created,
    /// Visible, or paused after being resumed
    Started,
    /// In the foreground
    Resumed,
    /// Terminal; all scoped work is cancelled
    Destroyed,
}

impl LifecycleState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Created => "created",
            Self::Started => "started",
            Self::Resumed => "resumed",
            Self::Destroyed => "destroyed",
        }
    }

    /// Whether this state is at least `other`
    pub fn is_at_least(self, other: Self) -> bool {
        self >= other
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State holder and cancellation scope for one component lifetime
#[derive(Debug)]
pub struct Lifecycle {
    name: String,
    state: watch::Sender<LifecycleState>,
    scope: CancellationToken,
}

impl Lifecycle {
    /// Create a lifecycle in the `Initialized` state
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Initialized);
        Self {
            name: name.into(),
            state,
            scope: CancellationToken::new(),
        }
    }

    /// Create a lifecycle already in the `Created` state
    pub fn created(name: impl Into<String>) -> Self {
        let lifecycle = Self::new(name);
        lifecycle.state.send_replace(LifecycleState::Created);
        lifecycle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_destroyed(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Move to `next`
    ///
    /// Fails when the lifecycle is already destroyed or when `next` is
    /// `Initialized`, which is only ever the starting state. Moving to the
    /// current state is a no-op. The check and the write happen under the
    /// state lock, so a concurrent destroy is never overwritten.
    pub fn move_to(&self, next: LifecycleState) -> Result<()> {
        let mut transition = Ok(None);
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if *current == LifecycleState::Destroyed {
                transition = Err(LifescopeError::lifecycle(format!(
                    "{} is destroyed and cannot move to {}",
                    self.name, next
                )));
                return false;
            }
            if next == LifecycleState::Initialized {
                transition = Err(LifescopeError::lifecycle(format!(
                    "{} cannot return to {} from {}",
                    self.name, next, current
                )));
                return false;
            }
            transition = Ok(Some(*current));
            *current = next;
            true
        });

        if let Some(from) = transition? {
            debug!(owner = %self.name, from = %from, to = %next, "Lifecycle transition");
        }
        // Reaching Destroyed, by this call or a racing one, always cancels
        if next == LifecycleState::Destroyed {
            self.scope.cancel();
        }
        Ok(())
    }

    /// Destroy the lifecycle, cancelling all scoped work; idempotent
    pub fn destroy(&self) {
        // Moving to Destroyed never fails
        let _ = self.move_to(LifecycleState::Destroyed);
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// A token cancelled when this lifecycle is destroyed
    ///
    /// The token is a child of the lifecycle scope: cancelling it does not
    /// destroy the lifecycle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.scope.child_token()
    }

    /// Resolves once the lifecycle is destroyed
    pub fn destroyed(&self) -> WaitForCancellationFuture<'_> {
        self.scope.cancelled()
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Anything whose lifetime bounds background work
pub trait LifecycleOwner {
    fn lifecycle(&self) -> &Lifecycle;
}

impl LifecycleOwner for Lifecycle {
    fn lifecycle(&self) -> &Lifecycle {
        self
    }
}

impl<T: LifecycleOwner + ?Sized> LifecycleOwner for Arc<T> {
    fn lifecycle(&self) -> &Lifecycle {
        (**self).lifecycle()
    }
}

impl<T: LifecycleOwner + ?Sized> LifecycleOwner for &T {
    fn lifecycle(&self) -> &Lifecycle {
        (**self).lifecycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(LifecycleState::Resumed.is_at_least(LifecycleState::Started));
        assert!(!LifecycleState::Created.is_at_least(LifecycleState::Started));
        assert!(LifecycleState::Destroyed > LifecycleState::Resumed);
        assert_eq!(LifecycleState::Started.to_string(), "started");
    }

    #[test]
    fn test_transitions() {
        let lifecycle = Lifecycle::new("screen");
        assert_eq!(lifecycle.state(), LifecycleState::Initialized);

        lifecycle.move_to(LifecycleState::Created).unwrap();
        lifecycle.move_to(LifecycleState::Resumed).unwrap();
        lifecycle.move_to(LifecycleState::Created).unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Created);
        assert!(lifecycle.move_to(LifecycleState::Initialized).is_err());
        assert!(!lifecycle.is_destroyed());
    }

    #[test]
    fn test_destroyed_is_terminal() {
        let lifecycle = Lifecycle::created("screen");
        let token = lifecycle.cancellation_token();
        lifecycle.move_to(LifecycleState::Destroyed).unwrap();

        assert!(lifecycle.is_destroyed());
        assert!(token.is_cancelled());
        let err = lifecycle.move_to(LifecycleState::Resumed).unwrap_err();
        assert!(matches!(err, LifescopeError::Lifecycle { .. }));

        lifecycle.destroy();
        assert_eq!(lifecycle.state(), LifecycleState::Destroyed);
    }

    #[test]
    fn test_child_token_does_not_destroy() {
        let lifecycle = Lifecycle::created("screen");
        let token = lifecycle.cancellation_token();
        token.cancel();
        assert!(!lifecycle.is_destroyed());
        assert!(!lifecycle.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_drop_cancels_scope() {
        let lifecycle = Lifecycle::created("screen");
        let token = lifecycle.cancellation_token();
        drop(lifecycle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_racing_transition_never_revives_destroyed() {
        use std::sync::Barrier;

        for _ in 0..500 {
            let lifecycle = Arc::new(Lifecycle::created("screen"));
            let barrier = Arc::new(Barrier::new(2));

            let (l, b) = (Arc::clone(&lifecycle), Arc::clone(&barrier));
            let mover = std::thread::spawn(move || {
                b.wait();
                l.move_to(LifecycleState::Resumed).ok();
            });
            barrier.wait();
            lifecycle.destroy();
            mover.join().unwrap();

            assert_eq!(lifecycle.state(), LifecycleState::Destroyed);
            assert!(lifecycle.is_destroyed());
        }
    }

    #[test]
    fn test_destroy_notifies_once() {
        let lifecycle = Lifecycle::created("screen");
        let mut rx = lifecycle.subscribe();
        rx.mark_unchanged();

        lifecycle.destroy();
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();
        lifecycle.destroy();
        assert!(lifecycle.move_to(LifecycleState::Destroyed).is_ok());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscribe_sees_destroy() {
        let lifecycle = Arc::new(Lifecycle::created("screen"));
        let mut rx = lifecycle.subscribe();

        let owner = Arc::clone(&lifecycle);
        tokio::spawn(async move {
            owner.move_to(LifecycleState::Started).ok();
            owner.destroy();
        });

        rx.wait_for(|s| *s == LifecycleState::Destroyed).await.unwrap();
        lifecycle.destroyed().await;
        assert!(lifecycle.is_destroyed());
    }
}
