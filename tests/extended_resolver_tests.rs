use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vordr::dns::{Message, Name, RecordType};
use vordr::resolver::{ExtendedResolver, ResolveError, Resolver};

/// A scripted transport: succeeds or fails per a fixed plan, records every
/// send into a shared log.
#[derive(Debug)]
struct ScriptedResolver {
    tag: &'static str,
    /// number of leading sends that fail before the resolver succeeds
    failures_before_success: usize,
    sends: AtomicUsize,
    log: Arc<Mutex<Vec<&'static str>>>,
    last_port: AtomicU16,
    delay: Option<Duration>,
}

impl ScriptedResolver {
    fn new(tag: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
        Arc::new(Self {
            tag,
            failures_before_success: 0,
            sends: AtomicUsize::new(0),
            log,
            last_port: AtomicU16::new(0),
            delay: None,
        })
    }

    fn failing_first(
        tag: &'static str,
        failures: usize,
        log: Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tag,
            failures_before_success: failures,
            sends: AtomicUsize::new(0),
            log,
            last_port: AtomicU16::new(0),
            delay: None,
        })
    }

    fn slow(tag: &'static str, delay: Duration, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            tag,
            failures_before_success: failures,
            sends: AtomicUsize::new(0),
            log: Arc::new(Mutex::new(Vec::new())),
            last_port: AtomicU16::new(0),
            delay: Some(delay),
        })
    }

    fn sends(&self) -> usize {
        self.sends.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Resolver for ScriptedResolver {
    async fn send_async(&self, query: Message) -> Result<Message, ResolveError> {
        let attempt = self.sends.fetch_add(1, Ordering::Relaxed);
        self.log.lock().push(self.tag);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if attempt < self.failures_before_success {
            Err(ResolveError::Io(format!("{} unreachable", self.tag)))
        } else {
            Ok(Message {
                id: query.id,
                ..Default::default()
            })
        }
    }

    fn set_port(&self, port: u16) {
        self.last_port.store(port, Ordering::Relaxed);
    }
}

fn query(id: u16) -> Message {
    Message::query(id, Name::parse("example.com").unwrap(), RecordType::A)
}

fn as_resolvers(list: &[Arc<ScriptedResolver>]) -> Vec<Arc<dyn Resolver>> {
    list.iter()
        .map(|r| r.clone() as Arc<dyn Resolver>)
        .collect()
}

#[tokio::test]
async fn test_load_balance_rotates_first_resolver() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let children = [
        ScriptedResolver::new("r0", log.clone()),
        ScriptedResolver::new("r1", log.clone()),
        ScriptedResolver::new("r2", log.clone()),
    ];
    let eres = ExtendedResolver::new(as_resolvers(&children));
    eres.set_load_balance(true);

    for id in 0..6 {
        eres.send_async(query(id)).await.unwrap();
    }

    // the rotation counter pre-increments, so the cycle starts at r1
    assert_eq!(*log.lock(), vec!["r1", "r2", "r0", "r1", "r2", "r0"]);
}

#[tokio::test]
async fn test_failure_count_ordering_prefers_reliable_servers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let flaky = ScriptedResolver::failing_first("flaky", usize::MAX, log.clone());
    let steady = ScriptedResolver::new("steady", log.clone());
    let eres = ExtendedResolver::new(as_resolvers(&[flaky.clone(), steady.clone()]));

    // first query: tie on failures, list order applies; flaky fails once
    eres.send_async(query(1)).await.unwrap();
    assert_eq!(flaky.sends(), 1);
    assert_eq!(steady.sends(), 1);

    // second query: flaky now carries a failure and sorts last
    eres.send_async(query(2)).await.unwrap();
    assert_eq!(flaky.sends(), 1);
    assert_eq!(steady.sends(), 2);
}

#[tokio::test]
async fn test_retry_budget_bounds_total_sends() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let children = [
        ScriptedResolver::failing_first("a", usize::MAX, log.clone()),
        ScriptedResolver::failing_first("b", usize::MAX, log.clone()),
    ];
    let eres = ExtendedResolver::new(as_resolvers(&children));
    eres.set_retries(2);

    let err = eres.send_async(query(1)).await.unwrap_err();
    assert!(matches!(err, ResolveError::Io(_)));

    // N * retries sends in total, alternating between the two servers
    assert_eq!(children[0].sends(), 2);
    assert_eq!(children[1].sends(), 2);
}

#[tokio::test]
async fn test_last_error_is_surfaced() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let children = [
        ScriptedResolver::failing_first("first", usize::MAX, log.clone()),
        ScriptedResolver::failing_first("second", usize::MAX, log.clone()),
    ];
    let eres = ExtendedResolver::new(as_resolvers(&children));
    eres.set_retries(1);

    let err = eres.send_async(query(9)).await.unwrap_err();
    assert_eq!(err, ResolveError::Io("second unreachable".to_string()));
}

#[tokio::test]
async fn test_failover_to_working_server() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let children = [
        ScriptedResolver::failing_first("down", usize::MAX, log.clone()),
        ScriptedResolver::new("up", log.clone()),
    ];
    let eres = ExtendedResolver::new(as_resolvers(&children));

    let response = eres.send_async(query(77)).await.unwrap();
    assert_eq!(response.id, 77);
    assert_eq!(*log.lock(), vec!["down", "up"]);
}

#[tokio::test]
async fn test_success_decays_failure_counter() {
    // twenty failures, then success: the counter decays to floor(ln 20)
    let resolver = ScriptedResolver::slow("flaky", Duration::ZERO, 20);
    let eres = ExtendedResolver::new(as_resolvers(&[resolver.clone()]));
    eres.set_retries(21);

    eres.send_async(query(5)).await.unwrap();
    assert_eq!(resolver.sends(), 21);
    assert_eq!(eres.failures(0), Some(2));
}

#[tokio::test]
async fn test_decay_stays_at_zero_after_repeated_successes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let resolver = ScriptedResolver::new("ok", log);
    let eres = ExtendedResolver::new(as_resolvers(&[resolver.clone()]));

    for id in 0..3 {
        eres.send_async(query(id)).await.unwrap();
    }
    assert_eq!(eres.failures(0), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_retrying() {
    let slow = ScriptedResolver::slow("slow", Duration::from_secs(2), usize::MAX);
    let eres = ExtendedResolver::new(as_resolvers(&[slow.clone()]));
    eres.set_timeout(Duration::from_secs(3));
    eres.set_retries(100);

    let err = eres.send_async(query(0xbeef)).await.unwrap_err();
    match err {
        ResolveError::DeadlineExceeded { name, rtype, id } => {
            assert_eq!(name, Name::parse("example.com").unwrap());
            assert_eq!(rtype, RecordType::A);
            assert_eq!(id, 0xbeef);
        }
        other => panic!("expected deadline error, got {other}"),
    }

    // the deadline stopped scheduling long before the retry budget ran out
    assert!(slow.sends() < 100);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_does_not_abort_inflight_send() {
    // a response that arrives after the deadline is still delivered; the
    // deadline only stops further scheduling
    let slow = ScriptedResolver::slow("slow-ok", Duration::from_secs(5), 0);
    let eres = ExtendedResolver::new(as_resolvers(&[slow]));
    eres.set_timeout(Duration::from_secs(1));

    let response = eres.send_async(query(1)).await.unwrap();
    assert_eq!(response.id, 1);
}

#[tokio::test]
async fn test_empty_resolver_list_errors() {
    let eres = ExtendedResolver::new(Vec::new());
    let err = eres.send_async(query(1)).await.unwrap_err();
    assert_eq!(err, ResolveError::NoResolvers);
}

#[tokio::test]
async fn test_add_and_delete_resolvers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = ScriptedResolver::new("first", log.clone());
    let second = ScriptedResolver::new("second", log.clone());

    let eres = ExtendedResolver::new(as_resolvers(&[first.clone()]));
    assert_eq!(eres.resolvers().len(), 1);

    eres.add_resolver(second.clone() as Arc<dyn Resolver>);
    assert_eq!(eres.resolvers().len(), 2);
    assert!(eres.resolver(1).is_some());

    let handle = eres.resolver(0).unwrap();
    eres.delete_resolver(&handle);
    assert_eq!(eres.resolvers().len(), 1);

    eres.send_async(query(3)).await.unwrap();
    assert_eq!(first.sends(), 0);
    assert_eq!(second.sends(), 1);
}

#[tokio::test]
async fn test_setters_broadcast_to_children() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let children = [
        ScriptedResolver::new("a", log.clone()),
        ScriptedResolver::new("b", log.clone()),
    ];
    let eres = ExtendedResolver::new(as_resolvers(&children));

    eres.set_port(5353);
    for child in &children {
        assert_eq!(child.last_port.load(Ordering::Relaxed), 5353);
    }
}

#[tokio::test]
async fn test_timeout_accessors() {
    let eres = ExtendedResolver::new(Vec::new());
    assert_eq!(eres.timeout(), Duration::from_secs(10));
    eres.set_timeout(Duration::from_secs(30));
    assert_eq!(eres.timeout(), Duration::from_secs(30));

    assert!(!eres.load_balance());
    eres.set_load_balance(true);
    assert!(eres.load_balance());

    assert_eq!(eres.retries(), 3);
    eres.set_retries(5);
    assert_eq!(eres.retries(), 5);
}
