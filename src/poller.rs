//! The Poller / `FailureDetector`: runs a bounded
//! multi-iteration round of parallel probes, adapts per-peer timeouts, and
//! fuses the iterations into one `PollReport`.
//!
//! `poll()` looks synchronous to its caller: it returns a `PollReport`,
//! not a future of one, but internally chains `futures` 0.1 combinators:
//! one `future::join_all` per iteration, each probe raced against a
//! `tokio_timer::Timer::sleep(period)` the same way
//! `balancer::selector::Select` races a `oneshot::Receiver` against
//! cancellation. `Poller` owns a `tokio_core::reactor::Core`
//! exactly as `main` owns one to drive `proxies.run()`; `poll()` calls
//! `self.core.run(..)`. Because `Core` isn't `Send`, this keeps "at most
//! one active `poll()` per instance, single-threaded" structurally true.

use std::cell::{Cell, RefCell};
use std::cmp;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use futures::{future, Future};
use tokio_core::reactor::{Core, Handle};
use tokio_timer::Timer;

use aggregator::ClusterStateAggregator;
use cluster_state::ClusterState;
use collector::ClusterStateCollector;
use endpoint::Endpoint;
use epoch::Epoch;
use error::{ModelError, ProbeError};
use heartbeat::HeartbeatCounter;
use node_state::NodeState;
use peer_client::{Layout, PeerClient, Runtime};
use sequencer::SequencerMetrics;

/// One round's outcome. `wrong_epochs[e] = k` means peer `e`
/// responded but advertised epoch `k != poll_epoch`. `responsive_servers`
/// is `layout.active_layout_servers()` at the moment the round started.
///
/// A caller that persists rounds onto a replicated log (e.g. appending
/// one entry per `PollReport` to a durable queue) owns that decision
/// entirely; this type carries no log offset or transaction markers of
/// its own.
#[derive(Clone, Debug)]
pub struct PollReport {
    poll_epoch: Epoch,
    responsive_servers: BTreeSet<Endpoint>,
    wrong_epochs: BTreeMap<Endpoint, Epoch>,
    cluster_state: ClusterState,
}

impl PollReport {
    pub fn poll_epoch(&self) -> Epoch {
        self.poll_epoch
    }

    pub fn responsive_servers(&self) -> &BTreeSet<Endpoint> {
        &self.responsive_servers
    }

    pub fn wrong_epochs(&self) -> &BTreeMap<Endpoint, Epoch> {
        &self.wrong_epochs
    }

    pub fn cluster_state(&self) -> &ClusterState {
        &self.cluster_state
    }

    /// Peers whose probe yielded a usable `NodeState` within its timeout
    /// this iteration, read off the local endpoint's own connectivity row
    /// ("Reachable node": a peer a probe to which succeeded within the
    /// timeout this iteration.)
    pub fn reachable_nodes(&self) -> BTreeSet<Endpoint> {
        self.cluster_state
            .nodes()
            .get(self.cluster_state.local_endpoint())
            .map(|n| n.connectivity().connected_nodes())
            .unwrap_or_default()
    }

    /// Peers the local endpoint's row marks `FAILED`, used by
    /// `modify_iteration_timeouts`.
    pub fn failed_nodes(&self) -> BTreeSet<Endpoint> {
        self.cluster_state
            .nodes()
            .get(self.cluster_state.local_endpoint())
            .map(|n| n.connectivity().failed_nodes())
            .unwrap_or_default()
    }
}

/// Tunable timeouts. All mutable only before the first call to `poll`;
/// in practice nothing stops a later mutation, but doing so mid-round
/// would contradict the single-active-round discipline the caller is
/// expected to uphold.
#[derive(Clone, Copy, Debug)]
pub struct PollerConfig {
    pub failure_threshold: u32,
    pub init_period_duration_ms: u64,
    pub max_period_duration_ms: u64,
    pub period_delta_ms: u64,
    pub initial_poll_interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> PollerConfig {
        PollerConfig {
            failure_threshold: 3,
            init_period_duration_ms: 2000,
            max_period_duration_ms: 5000,
            period_delta_ms: 1000,
            initial_poll_interval_ms: 1000,
        }
    }
}

fn millis(d: Duration) -> u64 {
    d.as_secs()
        .saturating_mul(1000)
        .saturating_add(u64::from(d.subsec_nanos() / 1_000_000))
}

pub struct Poller<R: Runtime> {
    local_endpoint: Endpoint,
    runtime: R,
    config: PollerConfig,
    period: Cell<u64>,
    heartbeat: HeartbeatCounter,
    core: RefCell<Core>,
    timer: Timer,
}

impl<R: Runtime> Poller<R> {
    /// `build_runtime` receives the handle of the reactor this poller will
    /// use to drive every probe future (`poll_iteration` runs everything
    /// through `self.core`): a `Runtime` that opens real sockets (e.g.
    /// `TcpRuntime`) must build its `PeerClient`s against that exact
    /// handle, or they would never be polled.
    pub fn new<F>(local_endpoint: Endpoint, build_runtime: F) -> io::Result<Poller<R>>
    where
        F: FnOnce(Handle) -> R,
    {
        Poller::with_config(local_endpoint, build_runtime, PollerConfig::default())
    }

    pub fn with_config<F>(local_endpoint: Endpoint, build_runtime: F, config: PollerConfig) -> io::Result<Poller<R>>
    where
        F: FnOnce(Handle) -> R,
    {
        let core = Core::new()?;
        let runtime = build_runtime(core.handle());
        Ok(Poller {
            local_endpoint: local_endpoint,
            runtime: runtime,
            period: Cell::new(config.init_period_duration_ms),
            config: config,
            heartbeat: HeartbeatCounter::new(),
            core: RefCell::new(core),
            timer: Timer::default(),
        })
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// The reactor handle driving this poller's own probe futures. A
    /// `Runtime` whose `PeerClient`s open real sockets (e.g. `TcpRuntime`)
    /// must build them against this same handle, since `poll_iteration`
    /// drives everything through `self.core`, so a socket bound to a
    /// different reactor would never be polled.
    pub fn handle(&self) -> Handle {
        self.core.borrow().handle()
    }

    pub fn set_config(&mut self, config: PollerConfig) {
        self.config = config;
        self.period.set(config.init_period_duration_ms);
    }

    /// Current adaptive per-peer timeout, milliseconds (the `period`
    /// state machine below).
    pub fn period(&self) -> u64 {
        self.period.get()
    }

    /// Runs one bounded polling round. The only error that can ever
    /// escape `poll` is `InvalidConfiguration`, raised when
    /// `failureThreshold < 1`. Every per-peer failure is folded into the
    /// returned `PollReport` instead of propagating.
    pub fn poll<L: Layout>(&self, layout: &L, sequencer_metrics: SequencerMetrics) -> Result<PollReport, ModelError> {
        if self.config.failure_threshold < 1 {
            return Err(ModelError::InvalidConfiguration("failureThreshold must be >= 1"));
        }

        let all_servers = layout.all_servers();
        let epoch = layout.epoch();

        let mut clients = BTreeMap::new();
        for server in &all_servers {
            let client = self.runtime.get_router(server);
            client.set_timeout_response(self.period.get());
            clients.insert(server.clone(), client);
        }

        Ok(self.poll_round(epoch, &all_servers, &clients, sequencer_metrics, layout))
    }

    fn poll_round<L: Layout>(
        &self,
        epoch: Epoch,
        all_servers: &BTreeSet<Endpoint>,
        clients: &BTreeMap<Endpoint, Rc<R::Client>>,
        sequencer_metrics: SequencerMetrics,
        layout: &L,
    ) -> PollReport {
        let mut reports = Vec::with_capacity(self.config.failure_threshold as usize);

        for _ in 0..self.config.failure_threshold {
            let t0 = Instant::now();
            let report = self.poll_iteration(epoch, all_servers, clients, sequencer_metrics, layout);
            let interval_ms = self.modify_iteration_timeouts(&report, t0, clients);
            reports.push(report);
            self.sleep(interval_ms);
        }

        self.finish_round(epoch, &reports, clients, layout)
    }

    /// One fan-out of probes across every server in the layout.
    fn poll_iteration<L: Layout>(
        &self,
        epoch: Epoch,
        all_servers: &BTreeSet<Endpoint>,
        clients: &BTreeMap<Endpoint, Rc<R::Client>>,
        sequencer_metrics: SequencerMetrics,
        layout: &L,
    ) -> PollReport {
        let futures = all_servers.iter().map(|server| {
            let server = server.clone();
            let client = clients
                .get(&server)
                .expect("runtime must return a client for every server in the layout")
                .clone();
            client
                .send_node_state_request(epoch)
                .then(move |result| Ok::<(Endpoint, Result<NodeState, ProbeError>), ()>((server, result)))
        });

        let joined = future::join_all(futures);
        let settled = self.core
            .borrow_mut()
            .run(joined)
            .expect("join_all over infallible futures cannot itself fail");

        let probes: BTreeMap<Endpoint, Result<NodeState, ProbeError>> = settled.into_iter().collect();

        let collector = ClusterStateCollector::new(self.local_endpoint.clone(), &self.heartbeat);
        let cluster_state = collector.collect_cluster_state(epoch, sequencer_metrics, &probes);
        let wrong_epochs = collector.collect_wrong_epochs(&probes);

        PollReport {
            poll_epoch: epoch,
            responsive_servers: layout.active_layout_servers(),
            wrong_epochs: wrong_epochs,
            cluster_state: cluster_state,
        }
    }

    /// Returns the sleep interval
    /// before the next iteration and, as a side effect, advances `period`
    /// and pushes it to the reachable clients' timeouts when any node
    /// failed this iteration.
    fn modify_iteration_timeouts(
        &self,
        report: &PollReport,
        t0: Instant,
        clients: &BTreeMap<Endpoint, Rc<R::Client>>,
    ) -> u64 {
        if report.failed_nodes().is_empty() {
            return self.config.initial_poll_interval_ms;
        }

        let elapsed = millis(t0.elapsed());
        let poll_interval = cmp::max(
            self.config.initial_poll_interval_ms,
            self.period.get().saturating_sub(elapsed),
        );
        let new_period = cmp::min(self.config.max_period_duration_ms, self.period.get() + self.config.period_delta_ms);
        self.period.set(new_period);

        for endpoint in report.reachable_nodes() {
            if let Some(client) = clients.get(&endpoint) {
                client.set_timeout_response(new_period);
            }
        }

        poll_interval
    }

    /// Post-aggregation steps, run once after the iteration loop.
    fn finish_round<L: Layout>(
        &self,
        epoch: Epoch,
        reports: &[PollReport],
        clients: &BTreeMap<Endpoint, Rc<R::Client>>,
        layout: &L,
    ) -> PollReport {
        let mut wrong_epochs_aggregated: BTreeMap<Endpoint, Epoch> = BTreeMap::new();
        let mut ever_reachable: BTreeSet<Endpoint> = BTreeSet::new();
        let mut failed_aggregated: BTreeSet<Endpoint> = BTreeSet::new();

        for report in reports {
            wrong_epochs_aggregated.extend(report.wrong_epochs().iter().map(|(e, k)| (e.clone(), *k)));
            ever_reachable.extend(report.reachable_nodes());
            failed_aggregated.extend(report.failed_nodes());
        }

        // Step 1: a node reachable at any iteration doesn't belong in the
        // final wrong-epoch report, even if it went silent afterward.
        wrong_epochs_aggregated.retain(|endpoint, _| !ever_reachable.contains(endpoint));

        // Step 2/3: connected wins over failed when a node was reachable
        // in one iteration and failed in another within the same round.
        let connected_aggregated = ever_reachable;
        let failed_aggregated: BTreeSet<Endpoint> =
            failed_aggregated.difference(&connected_aggregated).cloned().collect();

        // Step 4.
        let mut all_connected = connected_aggregated;
        all_connected.extend(wrong_epochs_aggregated.keys().cloned());

        // Step 5: timeout decay, once per completed round.
        let new_period = cmp::max(
            self.config.init_period_duration_ms,
            self.period.get().saturating_sub(self.config.period_delta_ms),
        );
        self.period.set(new_period);
        for endpoint in &all_connected {
            if let Some(client) = clients.get(endpoint) {
                client.set_timeout_response(new_period);
            }
        }
        for endpoint in &failed_aggregated {
            if let Some(client) = clients.get(endpoint) {
                client.set_timeout_response(self.config.max_period_duration_ms);
            }
        }

        // Step 6.
        let cluster_states: Vec<ClusterState> = reports.iter().map(|r| r.cluster_state().clone()).collect();
        let aggregated = ClusterStateAggregator::aggregate(self.local_endpoint.clone(), &cluster_states);

        // Step 7.
        PollReport {
            poll_epoch: epoch,
            responsive_servers: layout.active_layout_servers(),
            wrong_epochs: wrong_epochs_aggregated,
            cluster_state: aggregated,
        }
    }

    fn sleep(&self, interval_ms: u64) {
        let sleep = self.timer.sleep(Duration::from_millis(interval_ms));
        // A timer error here would mean the timer thread died; there is
        // no recovery available mid-round, and no peer health depends on
        // the sleep succeeding, so we simply proceed.
        let _ = self.core.borrow_mut().run(sleep);
    }
}
