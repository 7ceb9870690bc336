/// Errors produced while building or dispatching notifications.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Template pair lookup or rendering failed.
    #[error("Message template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A recipient or sender address could not be parsed.
    #[error("Invalid mail address '{address}': {message}")]
    Address { address: String, message: String },

    /// Back-pressure: the bounded dispatch queue is at capacity.
    #[error("Dispatch queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The dispatcher worker has shut down; nothing can be enqueued or joined.
    #[error("Dispatcher worker is not running")]
    WorkerGone,

    /// Delivery failed inside the transport.
    #[error("Mail transport error: {message}")]
    Transport { message: String },

    /// Invalid mailer configuration (bad host, zero capacity, ...).
    #[error("Invalid mailer configuration: {message}")]
    InvalidConfiguration { message: String },
}
