use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::dns::{EdnsOpt, Message, Name, RecordType};

/// Default deadline for a whole multi-server resolution
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Suggested timeout for each individual child resolver; the extended
/// resolver's own timeout must stay strictly larger to have any effect
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of tries each resolver gets per query
pub const DEFAULT_RETRIES: usize = 3;

/// Errors surfaced by resolvers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("I/O error: {0}")]
    Io(String),

    /// A single resolver's own timeout expired
    #[error("operation timed out")]
    Timeout,

    /// The extended resolver's whole-operation deadline expired
    #[error("timed out while trying to resolve {name}/{rtype}, id={id}")]
    DeadlineExceeded {
        name: Name,
        rtype: RecordType,
        id: u16,
    },

    #[error("no resolvers configured")]
    NoResolvers,

    #[error("server failure: {0}")]
    ServerFailure(String),
}

/// A TSIG signing key handed down to transports that support it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TsigKey {
    pub name: Name,
    pub algorithm: Name,
    pub secret: Vec<u8>,
}

/// A transport capable of sending one DNS query and returning the response.
///
/// The setters configure the transport where they make sense; transports
/// without a concept of e.g. TCP fallback may ignore them.
#[async_trait]
pub trait Resolver: Send + Sync + fmt::Debug {
    /// Send a query and await the response
    async fn send_async(&self, query: Message) -> Result<Message, ResolveError>;

    fn set_port(&self, _port: u16) {}

    fn set_tcp(&self, _flag: bool) {}

    fn set_ignore_truncation(&self, _flag: bool) {}

    fn set_edns(&self, _opt: EdnsOpt) {}

    fn set_tsig_key(&self, _key: TsigKey) {}

    fn set_timeout(&self, _timeout: Duration) {}

    fn timeout(&self) -> Duration {
        DEFAULT_RESOLVER_TIMEOUT
    }
}

/// A child resolver plus its running failure count
#[derive(Debug)]
struct ResolverEntry {
    resolver: Arc<dyn Resolver>,
    failures: AtomicU64,
}

impl ResolverEntry {
    fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            failures: AtomicU64::new(0),
        }
    }

    /// Forgive part of the failure history after a success. Gradual decay
    /// keeps a formerly flaky server from being shunned forever. Competing
    /// updates may land between the load and the store; an occasional lost
    /// decay is recoverable.
    fn decay_failures(&self) {
        let mut current = self.failures.load(Ordering::Relaxed);
        loop {
            let decayed = if current > 0 {
                (current as f64).ln().floor() as u64
            } else {
                0
            };
            match self.failures.compare_exchange_weak(
                current,
                decayed,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(seen) => current = seen,
            }
        }
    }
}

/// Per-query resolution state: the snapshot of resolvers to try, the
/// per-resolver attempt counts, and the absolute deadline. Lives exactly as
/// long as one `send_async` call.
struct Resolution {
    query: Message,
    attempts: Vec<usize>,
    retries: usize,
    deadline: Instant,
    resolvers: Vec<Arc<ResolverEntry>>,
    current: usize,
}

impl Resolution {
    fn new(eres: &ExtendedResolver, query: Message) -> Self {
        let mut resolvers = eres.entries.read().clone();
        let deadline = Instant::now() + *eres.timeout.read();

        if eres.load_balance.load(Ordering::Relaxed) && !resolvers.is_empty() {
            // round-robin across queries; the counter pre-increments, so
            // the very first query starts at entry 1
            let start = (eres.lb_start.fetch_add(1, Ordering::Relaxed) + 1) % resolvers.len();
            resolvers.rotate_left(start);
        } else {
            // prefer historically reliable servers
            resolvers.sort_by_key(|entry| entry.failures.load(Ordering::Relaxed));
        }

        Self {
            attempts: vec![0; resolvers.len()],
            retries: eres.retries.load(Ordering::Relaxed),
            deadline,
            resolvers,
            current: 0,
            query,
        }
    }

    fn deadline_error(&self) -> ResolveError {
        let (name, rtype) = match &self.query.question {
            Some(q) => (q.name.clone(), q.qtype),
            None => (Name::root(), RecordType::Unknown(0)),
        };
        ResolveError::DeadlineExceeded {
            name,
            rtype,
            id: self.query.id,
        }
    }

    /// Drive the query to completion: sequential dispatch, advancing
    /// through the resolver list on failure until every (resolver, attempt)
    /// slot is exhausted or the deadline passes.
    async fn run(mut self) -> Result<Message, ResolveError> {
        if self.resolvers.is_empty() {
            return Err(ResolveError::NoResolvers);
        }

        loop {
            if Instant::now() >= self.deadline {
                return Err(self.deadline_error());
            }

            let entry = &self.resolvers[self.current];
            self.attempts[self.current] += 1;
            if let Some(question) = &self.query.question {
                debug!(
                    "sending {}/{}, id={} to resolver {} ({:?}), attempt {} of {}",
                    question.name,
                    question.qtype,
                    self.query.id,
                    self.current,
                    entry.resolver,
                    self.attempts[self.current],
                    self.retries
                );
            }

            match entry.resolver.send_async(self.query.clone()).await {
                Ok(response) => {
                    entry.decay_failures();
                    return Ok(response);
                }
                Err(error) => {
                    debug!(
                        "failed to resolve id={} with resolver {} on attempt {} of {}: {error}",
                        self.query.id, self.current, self.attempts[self.current], self.retries
                    );
                    entry.failures.fetch_add(1, Ordering::Relaxed);

                    // move to the next resolver until every slot is used up
                    self.current = (self.current + 1) % self.resolvers.len();
                    if self.attempts[self.current] >= self.retries {
                        return Err(error);
                    }
                }
            }
        }
    }
}

/// A resolver that multiplexes queries over several child resolvers,
/// retrying each of them until a response arrives, the per-resolver retry
/// budget runs out, or the overall deadline passes.
///
/// The child list may be mutated while queries are in flight; running
/// queries keep working on the snapshot taken when they started.
pub struct ExtendedResolver {
    entries: RwLock<Vec<Arc<ResolverEntry>>>,
    lb_start: AtomicUsize,
    load_balance: AtomicBool,
    retries: AtomicUsize,
    timeout: RwLock<Duration>,
}

impl ExtendedResolver {
    /// Create an extended resolver over pre-initialized child resolvers
    pub fn new<I>(resolvers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Resolver>>,
    {
        let entries = resolvers
            .into_iter()
            .map(|r| Arc::new(ResolverEntry::new(r)))
            .collect();
        Self {
            entries: RwLock::new(entries),
            lb_start: AtomicUsize::new(0),
            load_balance: AtomicBool::new(false),
            retries: AtomicUsize::new(DEFAULT_RETRIES),
            timeout: RwLock::new(DEFAULT_TIMEOUT),
        }
    }

    /// Add a child resolver; visible to queries started afterwards
    pub fn add_resolver(&self, resolver: Arc<dyn Resolver>) {
        self.entries
            .write()
            .push(Arc::new(ResolverEntry::new(resolver)));
    }

    /// Remove a child resolver by identity
    pub fn delete_resolver(&self, resolver: &Arc<dyn Resolver>) {
        self.entries
            .write()
            .retain(|entry| !Arc::ptr_eq(&entry.resolver, resolver));
    }

    /// The nth child resolver, if present
    pub fn resolver(&self, n: usize) -> Option<Arc<dyn Resolver>> {
        self.entries.read().get(n).map(|e| e.resolver.clone())
    }

    /// All child resolvers
    pub fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        self.entries
            .read()
            .iter()
            .map(|e| e.resolver.clone())
            .collect()
    }

    /// Current failure counter of the nth child, for monitoring
    pub fn failures(&self, n: usize) -> Option<u64> {
        self.entries
            .read()
            .get(n)
            .map(|e| e.failures.load(Ordering::Relaxed))
    }

    pub fn load_balance(&self) -> bool {
        self.load_balance.load(Ordering::Relaxed)
    }

    /// When enabled, servers are rotated round-robin across queries instead
    /// of being tried in failure-count order
    pub fn set_load_balance(&self, flag: bool) {
        self.load_balance.store(flag, Ordering::Relaxed);
    }

    pub fn retries(&self) -> usize {
        self.retries.load(Ordering::Relaxed)
    }

    /// Number of tries each child resolver gets per query
    pub fn set_retries(&self, retries: usize) {
        self.retries.store(retries, Ordering::Relaxed);
    }
}

#[async_trait]
impl Resolver for ExtendedResolver {
    async fn send_async(&self, query: Message) -> Result<Message, ResolveError> {
        Resolution::new(self, query).run().await
    }

    fn set_port(&self, port: u16) {
        for entry in self.entries.read().iter() {
            entry.resolver.set_port(port);
        }
    }

    fn set_tcp(&self, flag: bool) {
        for entry in self.entries.read().iter() {
            entry.resolver.set_tcp(flag);
        }
    }

    fn set_ignore_truncation(&self, flag: bool) {
        for entry in self.entries.read().iter() {
            entry.resolver.set_ignore_truncation(flag);
        }
    }

    fn set_edns(&self, opt: EdnsOpt) {
        for entry in self.entries.read().iter() {
            entry.resolver.set_edns(opt.clone());
        }
    }

    fn set_tsig_key(&self, key: TsigKey) {
        for entry in self.entries.read().iter() {
            entry.resolver.set_tsig_key(key.clone());
        }
    }

    /// Set the whole-operation deadline. This only bounds the extended
    /// resolver's scheduling of further sends; a send already in flight
    /// finishes (or times out) under its own resolver's timeout, so this
    /// value must be larger than any child's timeout to have an effect.
    fn set_timeout(&self, timeout: Duration) {
        *self.timeout.write() = timeout;
    }

    fn timeout(&self) -> Duration {
        *self.timeout.read()
    }
}

impl fmt::Debug for ExtendedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        write!(f, "ExtendedResolver of ")?;
        f.debug_list()
            .entries(entries.iter().map(|e| &e.resolver))
            .finish()
    }
}

impl fmt::Display for ExtendedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
