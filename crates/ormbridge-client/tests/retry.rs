//! Connection bootstrap: retry, escalation, and notification behaviour.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use ormbridge_client::proto::FieldMap;
use ormbridge_client::{
    ConnectOutcome, ConnectionConfig, ConnectionManager, Error, LogNotifier, Notification,
    NotificationConfig, Notifier, RemoteClient, RemoteSession, RetryPolicy, SessionContext,
};

/// Fails the first `failures` connection attempts, then succeeds.
struct ScriptedClient {
    failures: u32,
    attempts: AtomicU32,
}

impl ScriptedClient {
    fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures,
            attempts: AtomicU32::new(0),
        })
    }

    fn always_failing() -> Arc<Self> {
        Self::failing(u32::MAX)
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl RemoteClient for ScriptedClient {
    fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn RemoteSession>, Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(Error::Connection(format!("connection refused (attempt {})", attempt)));
        }
        Ok(Box::new(EmptySession))
    }
}

struct EmptySession;

impl RemoteSession for EmptySession {
    fn describe_fields(
        &self,
        _model: &str,
        _fields: &BTreeSet<String>,
        _context: &SessionContext,
    ) -> Result<FieldMap, Error> {
        Ok(FieldMap::new())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Notification("smtp unavailable".into()));
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// Counts WARN and ERROR events.
#[derive(Clone, Default)]
struct LevelCounter {
    warnings: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        } else if level == Level::ERROR {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct Harness {
    client: Arc<ScriptedClient>,
    notifier: Arc<RecordingNotifier>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
    manager: ConnectionManager,
}

impl Harness {
    fn new(client: Arc<ScriptedClient>, config: ConnectionConfig, retry: RetryPolicy) -> Self {
        Self::with_notifier(client, config, retry, Arc::new(RecordingNotifier::default()))
    }

    fn with_notifier(
        client: Arc<ScriptedClient>,
        config: ConnectionConfig,
        retry: RetryPolicy,
        notifier: Arc<RecordingNotifier>,
    ) -> Self {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sleeps);
        let manager = ConnectionManager::new(client.clone(), config)
            .with_retry_policy(retry)
            .with_notification(NotificationConfig::new(["ops@example.com"]), notifier.clone())
            .with_sleeper(Arc::new(move |delay: Duration| recorded.lock().push(delay)));

        Self {
            client,
            notifier,
            sleeps,
            manager,
        }
    }

    fn establish(&self) -> (ConnectOutcome, LevelCounter) {
        let counter = LevelCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let outcome = tracing::subscriber::with_default(subscriber, || self.manager.establish())
            .expect("host is configured");
        (outcome, counter)
    }
}

fn scenario_config() -> ConnectionConfig {
    ConnectionConfig::new("x")
        .with_port(1)
        .with_database("d")
        .with_credentials("u", "p")
}

#[test]
fn test_scenario_succeeds_on_third_attempt() {
    let harness = Harness::new(
        ScriptedClient::failing(2),
        scenario_config(),
        RetryPolicy::new(3, Duration::ZERO),
    );

    let (outcome, counter) = harness.establish();

    assert!(outcome.is_connected());
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.failures.len(), 2);
    assert!(!outcome.notified);
    assert_eq!(counter.warnings.load(Ordering::SeqCst), 2);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 0);
    assert!(harness.notifier.sent.lock().is_empty());
    assert_eq!(harness.client.attempts(), 3);
}

#[test]
fn test_scenario_always_fails() {
    let harness = Harness::new(
        ScriptedClient::always_failing(),
        scenario_config(),
        RetryPolicy::new(3, Duration::ZERO),
    );

    let (outcome, counter) = harness.establish();

    assert!(!outcome.is_connected());
    assert!(outcome.notified);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(counter.warnings.load(Ordering::SeqCst), 3);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 1);

    let sent = harness.notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    let notification = &sent[0];
    assert_eq!(notification.recipients, vec!["ops@example.com"]);
    assert!(notification.plain_body.contains("HOST: x"));
    assert!(notification.html_body.contains("HOST: x"));
    assert!(!notification.plain_body.contains("PASSWORD"));
    assert!(notification
        .plain_body
        .contains("connection refused (attempt 3)"));
}

#[test]
fn test_log_notifier_keeps_warning_count() {
    let manager = ConnectionManager::new(ScriptedClient::always_failing(), scenario_config())
        .with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
        .with_notification(NotificationConfig::new(["ops@example.com"]), Arc::new(LogNotifier))
        .with_sleeper(Arc::new(|_: Duration| {}));

    let counter = LevelCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let outcome = tracing::subscriber::with_default(subscriber, || manager.establish()).unwrap();

    assert!(outcome.notified);
    assert_eq!(counter.warnings.load(Ordering::SeqCst), 3);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_password_never_reported() {
    let config = ConnectionConfig::new("erp.internal").with_credentials("admin", "s3cr3t-pass");
    let harness = Harness::new(
        ScriptedClient::always_failing(),
        config,
        RetryPolicy::new(2, Duration::ZERO),
    );

    let (outcome, _) = harness.establish();
    assert!(outcome.notified);

    let sent = harness.notifier.sent.lock();
    assert!(!sent[0].plain_body.contains("s3cr3t-pass"));
    assert!(!sent[0].html_body.contains("s3cr3t-pass"));
}

#[test]
fn test_permanent_failure_uses_every_attempt() {
    for max_attempts in 1..=5 {
        let delay = Duration::from_millis(250);
        let harness = Harness::new(
            ScriptedClient::always_failing(),
            scenario_config(),
            RetryPolicy::new(max_attempts, delay),
        );

        let (outcome, _) = harness.establish();

        assert!(outcome.session.is_none());
        assert_eq!(harness.client.attempts(), max_attempts);
        assert_eq!(outcome.attempts, max_attempts);
        assert_eq!(
            *harness.sleeps.lock(),
            vec![delay; (max_attempts - 1) as usize]
        );
        assert_eq!(harness.notifier.sent.lock().len(), 1);
    }
}

#[test]
fn test_success_stops_retrying() {
    for max_attempts in 1..=4u32 {
        for succeed_on in 1..=max_attempts {
            let harness = Harness::new(
                ScriptedClient::failing(succeed_on - 1),
                scenario_config(),
                RetryPolicy::new(max_attempts, Duration::from_secs(5)),
            );

            let (outcome, _) = harness.establish();

            assert!(outcome.is_connected());
            assert_eq!(harness.client.attempts(), succeed_on);
            assert_eq!(harness.sleeps.lock().len(), (succeed_on - 1) as usize);
            assert!(harness.notifier.sent.lock().is_empty());
        }
    }
}

#[test]
fn test_missing_host_is_not_retried() {
    let client = ScriptedClient::always_failing();
    let manager = ConnectionManager::new(client.clone(), ConnectionConfig::default());

    let result = manager.establish();

    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(client.attempts(), 0);
}

#[test]
fn test_notifier_failure_is_absorbed() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let harness = Harness::with_notifier(
        ScriptedClient::always_failing(),
        scenario_config(),
        RetryPolicy::new(1, Duration::ZERO),
        notifier,
    );

    let (outcome, _) = harness.establish();

    assert!(!outcome.is_connected());
    assert!(!outcome.notified);
}

#[test]
fn test_no_notification_without_recipients() {
    let client = ScriptedClient::always_failing();
    let notifier = Arc::new(RecordingNotifier::default());
    let manager = ConnectionManager::new(client, scenario_config())
        .with_retry_policy(RetryPolicy::new(1, Duration::ZERO))
        .with_notification(NotificationConfig::new(Vec::<String>::new()), notifier.clone());

    let outcome = manager.establish().unwrap();

    assert!(!outcome.notified);
    assert!(notifier.sent.lock().is_empty());
}

#[test]
fn test_session_carries_language() {
    let harness = Harness::new(
        ScriptedClient::failing(0),
        scenario_config().with_language("fr_BE"),
        RetryPolicy::default(),
    );

    let (outcome, _) = harness.establish();
    let session = outcome.session.unwrap();

    assert_eq!(session.context().lang(), Some("fr_BE"));
    assert_eq!(session.endpoint(), "x:1");
    assert!(session
        .describe_fields("res.partner", &BTreeSet::new())
        .unwrap()
        .is_empty());
}
