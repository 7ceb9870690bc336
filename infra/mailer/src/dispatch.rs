use crate::error::MailerError;
use crate::transport::MailTransport;
use doorstep_domain::notify::Notification;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Observer invoked on every failed delivery, after the failure is logged.
pub type FailureCallback = Arc<dyn Fn(&Notification, &MailerError) + Send + Sync>;

/// A joinable handle to one queued dispatch.
///
/// Await [`DispatchHandle::join`] to observe the transport outcome; dropping the
/// handle keeps the dispatch going fire-and-forget.
#[derive(Debug)]
pub struct DispatchHandle {
    done: oneshot::Receiver<Result<(), MailerError>>,
}

impl DispatchHandle {
    /// Waits for the background delivery to finish and returns its outcome.
    ///
    /// # Errors
    /// Returns the transport error of the dispatch, or [`MailerError::WorkerGone`]
    /// if the dispatcher shut down before completing it.
    pub async fn join(self) -> Result<(), MailerError> {
        self.done.await.map_err(|_| MailerError::WorkerGone)?
    }
}

struct Job {
    notification: Notification,
    done: oneshot::Sender<Result<(), MailerError>>,
}

/// The bounded dispatch queue.
///
/// One background worker owns the transport and drains jobs in order. Each job
/// owns its [`Notification`] exclusively, so the worker needs no locking. A full
/// queue surfaces as [`MailerError::QueueFull`] instead of blocking the caller.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queue: mpsc::Sender<Job>,
    capacity: usize,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("subject", &self.notification.subject).finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Spawns the worker task on the current tokio runtime.
    ///
    /// With `suppress` set, jobs complete successfully without touching the
    /// transport (test and dev environments).
    #[must_use]
    pub fn spawn(
        transport: Arc<dyn MailTransport>,
        capacity: usize,
        suppress: bool,
        on_failure: Option<FailureCallback>,
    ) -> Self {
        let capacity = capacity.max(1);
        let (queue, rx) = mpsc::channel(capacity);

        tokio::spawn(worker(rx, transport, suppress, on_failure));

        Self { queue, capacity }
    }

    /// Enqueues a notification without waiting for delivery.
    ///
    /// # Errors
    /// Returns [`MailerError::QueueFull`] when the queue is at capacity and
    /// [`MailerError::WorkerGone`] after shutdown.
    pub fn enqueue(&self, notification: Notification) -> Result<DispatchHandle, MailerError> {
        let (done_tx, done_rx) = oneshot::channel();
        let job = Job { notification, done: done_tx };

        self.queue.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailerError::QueueFull { capacity: self.capacity },
            mpsc::error::TrySendError::Closed(_) => MailerError::WorkerGone,
        })?;

        Ok(DispatchHandle { done: done_rx })
    }
}

async fn worker(
    mut rx: mpsc::Receiver<Job>,
    transport: Arc<dyn MailTransport>,
    suppress: bool,
    on_failure: Option<FailureCallback>,
) {
    while let Some(job) = rx.recv().await {
        let Job { notification, done } = job;

        let result = if suppress {
            debug!(subject = %notification.subject, "Delivery suppressed by configuration");
            Ok(())
        } else {
            deliver_blocking(Arc::clone(&transport), notification.clone()).await
        };

        match &result {
            Ok(()) => {
                debug!(
                    subject = %notification.subject,
                    recipients = notification.recipients.len(),
                    "Notification delivered"
                );
            },
            Err(err) => {
                error!(
                    subject = %notification.subject,
                    recipients = ?notification.recipients,
                    %err,
                    "Notification delivery failed"
                );
                if let Some(callback) = &on_failure {
                    callback(&notification, err);
                }
            },
        }

        // A dropped handle means the caller chose fire-and-forget.
        let _ = done.send(result);
    }

    info!("Mail dispatcher worker stopped");
}

async fn deliver_blocking(
    transport: Arc<dyn MailTransport>,
    notification: Notification,
) -> Result<(), MailerError> {
    tokio::task::spawn_blocking(move || transport.deliver(&notification))
        .await
        .map_err(|e| MailerError::Transport { message: format!("Delivery task panicked: {e}") })?
}
