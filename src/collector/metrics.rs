//! The twelve gauges published for one pool

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, Opts};

use crate::constants::metrics::{GAUGES_PER_POOL, NAMESPACE, POOL_LABEL};
use crate::status::PoolStatus;

/// Gauges for one pool, each carrying the const label `pool="<address>"`
///
/// Values only change through [`PoolMetrics::update`], which always writes
/// all twelve together.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub start_time: IntGauge,
    pub start_since: IntGauge,
    pub accepted_conn: IntGauge,
    pub listen_queue: IntGauge,
    pub max_listen_queue: IntGauge,
    pub listen_queue_len: IntGauge,
    pub idle_processes: IntGauge,
    pub active_processes: IntGauge,
    pub total_processes: IntGauge,
    pub max_active_processes: IntGauge,
    pub max_children_reached: IntGauge,
    pub slow_requests: IntGauge,
}

impl PoolMetrics {
    /// Create the gauges for the pool at `address`
    ///
    /// Fails only if the label value is rejected by the prometheus crate.
    pub fn new(address: &str) -> prometheus::Result<Self> {
        let g = |name: &str, help: &str| {
            IntGauge::with_opts(
                Opts::new(name, help)
                    .namespace(NAMESPACE)
                    .const_label(POOL_LABEL, address),
            )
        };

        Ok(Self {
            start_time: g("start_time", "Pool start time")?,
            start_since: g("start_since", "Time since pool start")?,
            accepted_conn: g("accepted_conn", "Num accepted connections")?,
            listen_queue: g("listen_queue", "Listen queue")?,
            max_listen_queue: g("max_listen_queue", "Max listen queue")?,
            listen_queue_len: g("listen_queue_len", "Listen Queue Len")?,
            idle_processes: g("idle_processes", "Idle Processes")?,
            active_processes: g("active_processes", "Active Processes")?,
            total_processes: g("total_processes", "Total Processes")?,
            max_active_processes: g("max_active_processes", "Max Active Processes")?,
            max_children_reached: g("max_children_reached", "Max Children Reached Times")?,
            slow_requests: g("slow_requests", "Slow Requests Count")?,
        })
    }

    /// Overwrite every gauge from `status`
    pub fn update(&self, status: &PoolStatus) {
        self.start_time.set(status.start_time);
        self.start_since.set(status.start_since);
        self.accepted_conn.set(status.accepted_conn);
        self.listen_queue.set(status.listen_queue);
        self.max_listen_queue.set(status.max_listen_queue);
        self.listen_queue_len.set(status.listen_queue_len);
        self.idle_processes.set(status.idle_processes);
        self.active_processes.set(status.active_processes);
        self.total_processes.set(status.total_processes);
        self.max_active_processes.set(status.max_active_processes);
        self.max_children_reached.set(status.max_children_reached);
        self.slow_requests.set(status.slow_requests);
    }

    /// All gauges in publication order
    #[must_use]
    pub fn gauges(&self) -> [&IntGauge; GAUGES_PER_POOL] {
        [
            &self.start_time,
            &self.start_since,
            &self.accepted_conn,
            &self.listen_queue,
            &self.max_listen_queue,
            &self.listen_queue_len,
            &self.idle_processes,
            &self.active_processes,
            &self.total_processes,
            &self.max_active_processes,
            &self.max_children_reached,
            &self.slow_requests,
        ]
    }

    pub fn descs(&self) -> Vec<&Desc> {
        self.gauges().into_iter().flat_map(|g| g.desc()).collect()
    }

    pub fn collect(&self) -> Vec<MetricFamily> {
        self.gauges().into_iter().flat_map(|g| g.collect()).collect()
    }
}
