use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for the lookup service
// ============================================================================
//
// Provides metrics for:
// - HTTP requests (count by route and status, latency by route)
// - gRPC requests (count by method and status code)
//
// Everything is registered on one registry and exposed via GET /metrics
// ============================================================================

/// Central metrics registry shared by both listeners
pub struct Metrics {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // RPC Metrics
    pub rpc_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        let rpc_requests_total = IntCounterVec::new(
            Opts::new("rpc_requests_total", "Total gRPC requests handled"),
            &["method", "code"],
        )?;
        registry.register(Box::new(rpc_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            rpc_requests_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a finished HTTP request
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
        self.http_request_duration
            .with_label_values(&[route])
            .observe(duration_secs);
    }

    /// Helper to record a finished gRPC call
    pub fn record_rpc_request(&self, method: &str, code: tonic::Code) {
        let code = format!("{code:?}");
        self.rpc_requests_total
            .with_label_values(&[method, code.as_str()])
            .inc();
    }

    /// Text exposition of every registered metric
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
