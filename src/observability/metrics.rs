use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub requests_total: IntCounterVec,
    pub cache_hits_total: IntCounter,
    pub inflight_joins_total: IntCounter,
    pub invalidations_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Network requests by outcome"),
            &["outcome"],
        )
        .expect("valid requests_total metric");

        let cache_hits_total =
            IntCounter::new("cache_hits_total", "Reads served from a fresh cache entry")
                .expect("valid cache_hits_total metric");

        let inflight_joins_total = IntCounter::new(
            "inflight_joins_total",
            "Reads that joined an identical in-flight request",
        )
        .expect("valid inflight_joins_total metric");

        let invalidations_total = IntCounterVec::new(
            Opts::new("invalidations_total", "Tag invalidations by tag"),
            &["tag"],
        )
        .expect("valid invalidations_total metric");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("register requests_total");
        registry
            .register(Box::new(cache_hits_total.clone()))
            .expect("register cache_hits_total");
        registry
            .register(Box::new(inflight_joins_total.clone()))
            .expect("register inflight_joins_total");
        registry
            .register(Box::new(invalidations_total.clone()))
            .expect("register invalidations_total");

        Self {
            registry,
            requests_total,
            cache_hits_total,
            inflight_joins_total,
            invalidations_total,
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

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
