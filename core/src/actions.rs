//! Typed UI action queue.
//!
//! Button callbacks never mutate engine state directly; they post a
//! [`UiAction`] into a single bounded channel that the tick scheduler drains
//! exactly once per tick. This removes every re-entrancy hazard between a
//! callback and the tick in progress.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::screen::ScreenId;

/// Semantic UI events produced by touch handlers and consumed by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Navigate to a screen. Last request within one tick wins.
    Navigate(ScreenId),
    /// Navigate to the previously active screen.
    Back,
    /// Re-open the tag popup for the currently staged tag, if any.
    ShowPopup,
    /// Close the tag popup without touching staging.
    DismissPopup,
    /// Add the staged spool to the inventory.
    AddSpool,
    /// Drop the staged tag and close the popup.
    ClearStaging,
    /// Close the popup and jump to the scan-result screen.
    ConfigureAms,
}

const ACTION_QUEUE_CAP: usize = 32;

/// Producer half, cloned into every UI callback.
#[derive(Clone)]
pub struct ActionSender(Sender<UiAction>);

impl ActionSender {
    /// Post an action for the next tick. Returns `false` if the queue is
    /// full, in which case the action is dropped (never blocks the caller).
    pub fn post(&self, action: UiAction) -> bool {
        match self.0.try_send(action) {
            Ok(()) => true,
            Err(TrySendError::Full(action)) => {
                tracing::warn!(?action, "action queue full, dropping");
                false
            }
            Err(TrySendError::Disconnected(action)) => {
                tracing::warn!(?action, "action queue disconnected, dropping");
                false
            }
        }
    }
}

/// Consumer half, owned by the tick scheduler.
pub struct ActionQueue {
    tx: Sender<UiAction>,
    rx: Receiver<UiAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        let (tx, rx) = bounded(ACTION_QUEUE_CAP);
        Self { tx, rx }
    }

    pub fn sender(&self) -> ActionSender {
        ActionSender(self.tx.clone())
    }

    /// Drain everything currently queued, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = UiAction> + '_ {
        self.rx.try_iter()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}
