use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref CONDITIONS_RECEIVED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_conditions_received_total",
        "Total condition reports accepted for insertion"
    ))
    .unwrap();
    pub static ref INVALID_CONDITION_POSTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_invalid_condition_posts_total",
        "Total condition posts rejected as malformed"
    ))
    .unwrap();
    pub static ref DB_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_db_failures_total",
        "Total database insert failures"
    ))
    .unwrap();
    pub static ref INGEST_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "isucondition_ingest_latency_seconds",
            "Time taken to insert a condition batch into DB"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
    pub static ref BATCH_SIZE: Gauge = Gauge::with_opts(Opts::new(
        "isucondition_batch_size",
        "Current condition batch size being processed"
    ))
    .unwrap();
    pub static ref CONDITIONS_DROPPED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_conditions_dropped_total",
        "Total accepted conditions dropped after persistent DB failure"
    ))
    .unwrap();
    pub static ref CHANNEL_FULL_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_channel_full_total",
        "Total number of times the ingestion queue was full"
    ))
    .unwrap();
    pub static ref GRAPH_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "isucondition_graph_failures_total",
        "Total graph aggregations aborted by malformed conditions"
    ))
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(CONDITIONS_RECEIVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INVALID_CONDITION_POSTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DB_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INGEST_LATENCY_SECONDS.clone()))?;
    REGISTRY.register(Box::new(BATCH_SIZE.clone()))?;
    REGISTRY.register(Box::new(CONDITIONS_DROPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CHANNEL_FULL_TOTAL.clone()))?;
    REGISTRY.register(Box::new(GRAPH_FAILURES_TOTAL.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
