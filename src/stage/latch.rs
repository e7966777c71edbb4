use crate::stage::Button;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Single-fire button subscriptions
///
/// Arming a button hands out a receiver that resolves on the next press.
/// The subscription is removed as soon as it fires, so one press can never
/// trigger two transitions. Pressing a button nobody armed does nothing.
#[derive(Clone, Default)]
pub struct ButtonLatch {
    armed: Arc<Mutex<HashMap<Button, oneshot::Sender<()>>>>,
}

impl ButtonLatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Button, oneshot::Sender<()>>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to the next press of `button`, replacing any earlier subscription
    pub fn arm(&self, button: Button) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(button, tx);
        rx
    }

    #[cfg(test)]
    pub fn is_armed(&self, button: Button) -> bool {
        self.lock().contains_key(&button)
    }

    /// Press `button`; returns whether a subscription consumed the press
    pub fn press(&self, button: Button) -> bool {
        match self.lock().remove(&button) {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Press every armed button, returning the ones that fired
    pub fn press_armed(&self) -> Vec<Button> {
        self.lock()
            .drain()
            .filter_map(|(button, tx)| tx.send(()).is_ok().then_some(button))
            .collect()
    }
}
