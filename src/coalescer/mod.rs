//! Throttled request coalescing for search-as-you-type.
//!
//! [`RequestCoalescer`] sits between a keystroke stream and a [`RemoteSearch`]
//! backend. Calls are rate limited on the leading edge; calls that land inside
//! the throttle window collapse into a single trailing dispatch carrying the
//! newest query. Every dispatched call is tracked in a [`CallSequence`], and a
//! finished call always answers with the *newest* record of that sequence, so a
//! slow response for an old keyword can never overwrite the view of a newer one.
//!
//! An empty query clears the sequence on the spot. The sequence is also
//! cleared once no call has resolved for `idle_clear`.
//!
//! All state lives behind one mutex that is never held across an await; remote
//! calls and timers run as spawned tokio tasks, so [`RequestCoalescer::submit`]
//! must be called from within a tokio runtime.

mod sequence;
mod throttle;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, trace};

use crate::api::RemoteSearch;
use crate::error::ApiError;

pub use sequence::{CallRecord, CallSequence, RecordState};
pub use throttle::{Decision, MAX_INTERVAL, Throttle, decide};

/// Snapshot handed to a caller: the newest record at the time its call finished.
pub type Delivery<R> = CallRecord<R>;

/// What a [`Submission`] resolves to. `Ok(None)` means "nothing to show".
pub type Reply<R> = Result<Option<Delivery<R>>, ApiError>;

type Waiter<R> = oneshot::Sender<Reply<R>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescerConfig {
    /// Minimum spacing between two dispatched calls.
    pub min_interval: Duration,
    /// Quiet period after the last successful resolution before the sequence is cleared.
    pub idle_clear: Duration,
    /// Coalesce calls made inside the window into one trailing dispatch.
    /// When false such calls are dropped.
    pub trailing: bool,
    /// Upper bound on tracked records; the oldest is evicted first.
    pub max_records: usize,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            idle_clear: Duration::from_millis(2000),
            trailing: true,
            max_records: 64,
        }
    }
}

pub struct RequestCoalescer<S: RemoteSearch> {
    shared: Arc<Shared<S>>,
}

impl<S: RemoteSearch> Clone for RequestCoalescer<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: RemoteSearch> fmt::Debug for RequestCoalescer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("RequestCoalescer")
            .field("config", &self.shared.config)
            .field("tracked", &state.sequence.len())
            .field("in_flight", &state.in_flight.len())
            .field("trailing_pending", &state.trailing.is_some())
            .field("dispatched", &state.dispatched)
            .finish_non_exhaustive()
    }
}

struct Shared<S: RemoteSearch> {
    remote: S,
    config: CoalescerConfig,
    state: Mutex<State<S::Output>>,
}

struct State<R> {
    sequence: CallSequence<R>,
    throttle: Throttle,
    /// Waiters per dispatched call that has not finished yet.
    in_flight: HashMap<u64, Vec<Waiter<R>>>,
    trailing: Option<TrailingCall<R>>,
    idle_clear: Option<JoinHandle<()>>,
    /// Bumped whenever the idle timer is re-armed or cancelled.
    idle_epoch: u64,
    dispatched: u64,
}

struct TrailingCall<R> {
    query: String,
    waiters: Vec<Waiter<R>>,
    timer: JoinHandle<()>,
}

impl<R> Drop for State<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.idle_clear.take() {
            handle.abort();
        }
        if let Some(trailing) = self.trailing.take() {
            trailing.timer.abort();
        }
    }
}

impl<S: RemoteSearch> RequestCoalescer<S> {
    pub fn new(remote: S, config: CoalescerConfig) -> Self {
        let config = CoalescerConfig {
            min_interval: config.min_interval.min(MAX_INTERVAL),
            ..config
        };
        let state = State {
            sequence: CallSequence::new(config.max_records),
            throttle: Throttle::new(config.min_interval),
            in_flight: HashMap::new(),
            trailing: None,
            idle_clear: None,
            idle_epoch: 0,
            dispatched: 0,
        };
        Self {
            shared: Arc::new(Shared {
                remote,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Submit a query.
    ///
    /// An empty query clears everything before this returns and yields a
    /// ready `Ok(None)`. Anything else is dispatched now, folded into the
    /// pending trailing dispatch, or (with trailing disabled) answered
    /// immediately with the current newest record.
    pub fn submit(&self, query: impl Into<String>) -> Submission<S::Output> {
        let query = query.into();
        if query.is_empty() {
            self.shared.clear_now();
            return Submission::ready(Ok(None));
        }

        let (tx, rx) = oneshot::channel();
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        let now = Instant::now();

        match state.throttle.decide(now) {
            Decision::DispatchNow => {
                let mut waiters = vec![tx];
                // The trailing timer may be due but not yet polled; this newer
                // query supersedes it.
                if let Some(trailing) = state.trailing.take() {
                    trailing.timer.abort();
                    waiters.extend(trailing.waiters);
                }
                self.shared.dispatch(state, now, query, waiters);
            }
            Decision::DeferUntil(at) => {
                if !self.shared.config.trailing {
                    trace!(query, "throttled; dropping call");
                    return Submission::ready(Ok(state.sequence.latest()));
                }
                if let Some(trailing) = state.trailing.as_mut() {
                    trace!(query, replaces = %trailing.query, "coalescing into trailing dispatch");
                    trailing.query = query;
                    trailing.waiters.push(tx);
                } else {
                    trace!(query, "scheduling trailing dispatch");
                    let timer = self.shared.spawn_trailing_timer(at);
                    state.trailing = Some(TrailingCall {
                        query,
                        waiters: vec![tx],
                        timer,
                    });
                }
            }
        }

        Submission::waiting(rx)
    }

    /// Number of records currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.shared.state.lock().sequence.len()
    }

    /// Copies of the tracked records, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CallRecord<S::Output>> {
        self.shared.state.lock().sequence.records().cloned().collect()
    }

    /// Number of remote calls issued so far.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.shared.state.lock().dispatched
    }

    #[must_use]
    pub fn config(&self) -> &CoalescerConfig {
        &self.shared.config
    }
}

impl<S: RemoteSearch> Shared<S> {
    fn clear_now(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.sequence.clear();
        state.idle_epoch += 1;
        if let Some(handle) = state.idle_clear.take() {
            handle.abort();
        }
        let cancelled = state
            .trailing
            .take()
            .map(|trailing| {
                trailing.timer.abort();
                trailing.waiters
            })
            .unwrap_or_default();
        drop(guard);

        debug!(cancelled = cancelled.len(), "empty query; call sequence cleared");
        send_all(cancelled, &Ok(None));
    }

    fn dispatch(
        self: &Arc<Self>,
        state: &mut State<S::Output>,
        now: Instant,
        query: String,
        waiters: Vec<Waiter<S::Output>>,
    ) {
        state.throttle.mark_dispatched(now);
        let seq = state.sequence.append(query.clone());
        state.in_flight.insert(seq, waiters);
        state.dispatched += 1;
        debug!(seq, query, "dispatching search call");

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.remote.search(&query).await;
            shared.complete(seq, outcome);
        });
    }

    fn spawn_trailing_timer(self: &Arc<Self>, at: Instant) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            sleep_until(at).await;
            if let Some(shared) = weak.upgrade() {
                shared.fire_trailing();
            }
        })
    }

    fn fire_trailing(self: &Arc<Self>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(TrailingCall { query, waiters, .. }) = state.trailing.take() else {
            return;
        };

        let newest = state
            .sequence
            .latest_record()
            .filter(|record| record.query == query)
            .map(|record| (record.seq, record.is_resolved()));

        if let Some((seq, resolved)) = newest {
            if let Some(pending) = state.in_flight.get_mut(&seq) {
                trace!(seq, query, "trailing query already in flight; joining it");
                pending.extend(waiters);
                return;
            }
            if resolved {
                trace!(seq, query, "trailing query already resolved; reusing result");
                let reply = Ok(state.sequence.latest());
                drop(guard);
                send_all(waiters, &reply);
                return;
            }
        }

        self.dispatch(state, Instant::now(), query, waiters);
    }

    fn complete(self: &Arc<Self>, seq: u64, outcome: Result<S::Output, ApiError>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let waiters = state.in_flight.remove(&seq).unwrap_or_default();

        let reply = match outcome {
            Ok(value) => {
                if state.sequence.resolve(seq, value) {
                    debug!(seq, "search call resolved");
                } else {
                    trace!(seq, "record no longer tracked; result dropped");
                }
                self.arm_idle_clear(state);
                Ok(state.sequence.latest())
            }
            Err(err) => {
                debug!(seq, error = %err, "search call failed");
                Err(err)
            }
        };
        drop(guard);

        send_all(waiters, &reply);
    }

    fn arm_idle_clear(self: &Arc<Self>, state: &mut State<S::Output>) {
        if let Some(handle) = state.idle_clear.take() {
            handle.abort();
        }
        state.idle_epoch += 1;
        let epoch = state.idle_epoch;
        let delay = self.config.idle_clear;
        let weak: Weak<Self> = Arc::downgrade(self);

        state.idle_clear = Some(tokio::spawn(async move {
            sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut state = shared.state.lock();
            if state.idle_epoch == epoch {
                debug!(cleared = state.sequence.len(), "idle timeout; call sequence cleared");
                state.sequence.clear();
                state.idle_clear = None;
            }
        }));
    }
}

fn send_all<R>(waiters: Vec<Waiter<R>>, reply: &Reply<R>) {
    for waiter in waiters {
        // A dropped Submission is not an error.
        let _ = waiter.send(reply.clone());
    }
}

/// Pending answer to one [`RequestCoalescer::submit`] call.
#[must_use = "a submission does nothing unless awaited"]
pub struct Submission<R> {
    inner: SubmissionInner<R>,
}

enum SubmissionInner<R> {
    Ready(Option<Reply<R>>),
    Waiting(oneshot::Receiver<Reply<R>>),
}

impl<R> Submission<R> {
    const fn ready(reply: Reply<R>) -> Self {
        Self {
            inner: SubmissionInner::Ready(Some(reply)),
        }
    }

    const fn waiting(rx: oneshot::Receiver<Reply<R>>) -> Self {
        Self {
            inner: SubmissionInner::Waiting(rx),
        }
    }

    /// True when the answer was decided inside `submit` (empty or dropped query).
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.inner, SubmissionInner::Ready(_))
    }
}

impl<R> fmt::Debug for Submission<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<R> Future for Submission<R> {
    type Output = Reply<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            SubmissionInner::Ready(reply) => {
                Poll::Ready(reply.take().unwrap_or(Err(ApiError::Abandoned)))
            }
            // The sender is dropped only when the coalescer goes away first.
            SubmissionInner::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| received.unwrap_or(Err(ApiError::Abandoned))),
        }
    }
}
