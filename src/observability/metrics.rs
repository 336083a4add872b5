use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub notifies_total: IntCounterVec,
    pub notifies_in_queue: IntGauge,
    pub notify_latency_seconds: HistogramVec,
    pub geocode_resolutions_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let notifies_total = IntCounterVec::new(
            Opts::new("notifies_total", "Total notify deliveries by outcome"),
            &["outcome"],
        )
        .expect("valid notifies_total metric");

        let notifies_in_queue =
            IntGauge::new("notifies_in_queue", "Current number of queued notify requests")
                .expect("valid notifies_in_queue metric");

        let notify_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "notify_latency_seconds",
                "Latency of notify delivery in seconds",
            ),
            &["outcome"],
        )
        .expect("valid notify_latency_seconds metric");

        let geocode_resolutions_total = IntCounterVec::new(
            Opts::new(
                "geocode_resolutions_total",
                "Reverse geocode resolutions by answering source",
            ),
            &["source"],
        )
        .expect("valid geocode_resolutions_total metric");

        registry
            .register(Box::new(notifies_total.clone()))
            .expect("register notifies_total");
        registry
            .register(Box::new(notifies_in_queue.clone()))
            .expect("register notifies_in_queue");
        registry
            .register(Box::new(notify_latency_seconds.clone()))
            .expect("register notify_latency_seconds");
        registry
            .register(Box::new(geocode_resolutions_total.clone()))
            .expect("register geocode_resolutions_total");

        Self {
            registry,
            notifies_total,
            notifies_in_queue,
            notify_latency_seconds,
            geocode_resolutions_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
