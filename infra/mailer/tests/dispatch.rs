use doorstep_domain::config::MailConfig;
use doorstep_domain::notify::Notification;
use doorstep_mailer::{MailTransport, Mailer, MailerError};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

fn write_confirm_templates(dir: &Path) {
    fs::write(dir.join("confirm.txt"), "Welcome aboard, {{ recipients[0] }}!\n").unwrap();
    fs::write(
        dir.join("confirm.html"),
        "<p>Welcome aboard, <b>{{ recipients[0] }}</b>!</p>\n",
    )
    .unwrap();
}

fn test_config() -> MailConfig {
    MailConfig { queue_capacity: 4, ..MailConfig::default() }
}

/// A transport that parks every delivery until the gate is opened.
#[derive(Debug, Default)]
struct GatedTransport {
    gate: Mutex<bool>,
    signal: Condvar,
    delivered: Mutex<Vec<Notification>>,
}

impl GatedTransport {
    fn open(&self) {
        *self.gate.lock().unwrap() = true;
        self.signal.notify_all();
    }

    fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap().clone()
    }
}

impl MailTransport for GatedTransport {
    fn deliver(&self, notification: &Notification) -> Result<(), MailerError> {
        let mut open = self.gate.lock().unwrap();
        while !*open {
            open = self.signal.wait(open).unwrap();
        }
        drop(open);

        self.delivered.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct FailingTransport;

impl MailTransport for FailingTransport {
    fn deliver(&self, _notification: &Notification) -> Result<(), MailerError> {
        Err(MailerError::Transport { message: "relay refused".to_owned() })
    }
}

#[derive(Debug, Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

impl MailTransport for CountingTransport {
    fn deliver(&self, _notification: &Notification) -> Result<(), MailerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn mailer_with(transport: Arc<dyn MailTransport>, cfg: MailConfig) -> (Mailer, TempDir) {
    let dir = tempdir().unwrap();
    write_confirm_templates(dir.path());

    let mailer = Mailer::builder()
        .config(cfg)
        .templates_dir(dir.path())
        .transport(transport)
        .build()
        .expect("mailer should build");

    (mailer, dir)
}

#[tokio::test]
async fn send_does_not_wait_for_the_transport() {
    let transport = Arc::new(GatedTransport::default());
    let (mailer, _dir) = mailer_with(transport.clone(),test_config());

    // The transport is blocked, yet send returns immediately.
    let handle = mailer
        .send("Hello, Jane", vec!["janedoe".to_owned()], "confirm")
        .expect("enqueue should succeed while the transport is blocked");

    assert!(transport.delivered().is_empty(), "nothing can be delivered before release");

    transport.open();
    handle.join().await.expect("delivery should succeed after release");

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].subject, "Hello, Jane");
    assert_eq!(delivered[0].recipients, vec!["janedoe"]);
}

#[tokio::test]
async fn notification_bodies_come_from_the_template_pair() {
    let transport = Arc::new(GatedTransport::default());
    transport.open();
    let (mailer, _dir) = mailer_with(transport.clone(),test_config());

    let handle = mailer
        .send("Hello, Jane", vec!["janedoe".to_owned()], "confirm")
        .expect("enqueue");
    handle.join().await.expect("delivery");

    let delivered = transport.delivered();
    assert_eq!(delivered[0].body_text, "Welcome aboard, janedoe!\n");
    assert_eq!(delivered[0].body_html, "<p>Welcome aboard, <b>janedoe</b>!</p>\n");
}

#[tokio::test]
async fn missing_template_is_an_error_and_nothing_is_queued() {
    let transport = Arc::new(GatedTransport::default());
    transport.open();
    let (mailer, _dir) = mailer_with(transport.clone(),test_config());

    let err = mailer
        .send("Hello", vec!["janedoe".to_owned()], "no-such-template")
        .expect_err("unknown template must fail");
    assert!(matches!(err, MailerError::Template(_)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn full_queue_applies_back_pressure() {
    let transport = Arc::new(GatedTransport::default());
    let cfg = MailConfig { queue_capacity: 1, ..MailConfig::default() };
    let (mailer, _dir) = mailer_with(transport.clone(),cfg);

    // First job is picked up by the worker and parks on the gate; the second
    // occupies the single queue slot.
    let first = mailer.send("one", vec!["a@example.com".to_owned()], "confirm").expect("first");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = mailer.send("two", vec!["b@example.com".to_owned()], "confirm").expect("second");

    let err = mailer
        .send("three", vec!["c@example.com".to_owned()], "confirm")
        .expect_err("third enqueue must hit the bound");
    assert!(matches!(err, MailerError::QueueFull { capacity: 1 }));

    transport.open();
    first.join().await.expect("first delivery");
    second.join().await.expect("second delivery");
}

#[tokio::test]
async fn failures_reach_the_callback_and_the_handle() {
    let dir = tempdir().unwrap();
    write_confirm_templates(dir.path());

    let observed: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);

    let mailer = Mailer::builder()
        .config(test_config())
        .templates_dir(dir.path())
        .transport(Arc::new(FailingTransport))
        .on_failure(Arc::new(move |notification, err| {
            sink.lock().unwrap().push((notification.subject.clone(), err.to_string()));
        }))
        .build()
        .expect("mailer should build");

    let handle = mailer.send("Hello, Jane", vec!["janedoe".to_owned()], "confirm").expect("enqueue");

    let err = handle.join().await.expect_err("delivery must fail");
    assert!(matches!(err, MailerError::Transport { .. }));

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].0, "Hello, Jane");
    assert!(observed[0].1.contains("relay refused"));
}

#[tokio::test]
async fn suppress_send_skips_the_transport() {
    let transport = Arc::new(CountingTransport::default());
    let cfg = MailConfig { suppress_send: true, ..test_config() };
    let (mailer, _dir) = mailer_with(transport.clone(),cfg);

    let handle = mailer.send("Hello", vec!["janedoe".to_owned()], "confirm").expect("enqueue");
    handle.join().await.expect("suppressed dispatch reports success");

    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}
