use crate::error::{ExtractorError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Tracks SIGINT/SIGTERM and wakes anything waiting on [`cancelled`].
///
/// [`cancelled`]: GracefulShutdown::cancelled
#[derive(Clone)]
pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
    shutdown_message_shown: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let shutdown = Self::new_for_test();

        let running = shutdown.running.clone();
        let message_shown = shutdown.shutdown_message_shown.clone();
        let notify = shutdown.notify.clone();

        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
            notify.notify_waiters();

            if !message_shown.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Stopping ffmpeg...");
            } else {
                eprintln!("\n⏳ Still waiting for ffmpeg to exit...");
            }
        })
        .map_err(|e| ExtractorError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(shutdown)
    }

    /// Create a GracefulShutdown instance for testing (no signal handler registration)
    pub fn new_for_test() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            shutdown_message_shown: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(ExtractorError::Interrupted);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolves once shutdown has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_state_management() {
        let shutdown = GracefulShutdown::new_for_test();

        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(!shutdown.is_running());
        assert!(matches!(
            shutdown.check_shutdown(),
            Err(ExtractorError::Interrupted)
        ));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_after_request() {
        let shutdown = GracefulShutdown::new_for_test();
        shutdown.request_shutdown();

        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled())
            .await
            .expect("cancelled() should resolve once shutdown was requested");
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let shutdown = GracefulShutdown::new_for_test();
        let waiter = shutdown.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await });
        tokio::task::yield_now().await;
        shutdown.request_shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should be woken")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_pending_while_running() {
        let shutdown = GracefulShutdown::new_for_test();
        let result = tokio::time::timeout(Duration::from_millis(20), shutdown.cancelled()).await;
        assert!(result.is_err());
    }
}
