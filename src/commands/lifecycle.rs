//! Process lifecycle shared between the dispatcher and the shutdown command
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Default)]
pub struct Lifecycle {
    stopped: AtomicBool,
    terminate: Notify,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether new command invocations may start
    pub fn is_accepting(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    pub fn stop_accepting(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Ask the binary to exit; in-flight invocations are not cancelled
    pub fn request_termination(&self) {
        self.stop_accepting();
        self.terminate.notify_one();
    }

    /// Resolves once termination has been requested
    pub async fn terminated(&self) {
        self.terminate.notified().await;
    }
}
