//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

use catalog_app::imports::{ImportError, ImportSummary};

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    import_runs_total: IntCounterVec,
    import_rows_merged_total: IntCounterVec,
    import_rows_rejected_total: IntCounter,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

/// How an import request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportOutcome {
    Completed,
    Rejected,
    Failed,
    TimedOut,
    Cancelled,
}

impl ImportOutcome {
    fn of(result: &Result<ImportSummary, ImportError>) -> Self {
        match result {
            Ok(summary) if summary.is_rejected() => Self::Rejected,
            Ok(_) => Self::Completed,
            Err(ImportError::Timeout(_)) => Self::TimedOut,
            Err(ImportError::Cancelled) => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count one import run and the rows it merged or rejected.
pub(crate) fn observe_import(result: &Result<ImportSummary, ImportError>) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics
        .import_runs_total
        .with_label_values(&[ImportOutcome::of(result).as_str()])
        .inc();

    let Ok(summary) = result else {
        return;
    };

    metrics
        .import_rows_merged_total
        .with_label_values(&["inserted"])
        .inc_by(summary.merged.inserted);

    metrics
        .import_rows_merged_total
        .with_label_values(&["updated"])
        .inc_by(summary.merged.updated);

    metrics
        .import_rows_rejected_total
        .inc_by(u64::try_from(summary.errors.len()).unwrap_or(u64::MAX));
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn register<M>(registry: &Registry, name: &str, metric: prometheus::Result<M>) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    let metric = match metric {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create {name} metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(metric.clone())) {
        error!("failed to register {name} metric: {source}");
        return None;
    }

    Some(metric)
}

fn build_metrics() -> Option<Metrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        "requests_total",
        IntCounterVec::new(
            Opts::new(
                "catalog_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "request_duration",
        HistogramVec::new(
            HistogramOpts::new(
                "catalog_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                30.0, 60.0, 300.0,
            ]),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "in-flight gauge",
        IntGauge::with_opts(Opts::new(
            "catalog_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        )),
    )?;

    let import_runs_total = register(
        &registry,
        "import_runs_total",
        IntCounterVec::new(
            Opts::new(
                "catalog_json_import_runs_total",
                "Product import runs partitioned by outcome.",
            ),
            &["outcome"],
        ),
    )?;

    let import_rows_merged_total = register(
        &registry,
        "import_rows_merged_total",
        IntCounterVec::new(
            Opts::new(
                "catalog_json_import_rows_merged_total",
                "Imported product rows written, partitioned by inserted or updated.",
            ),
            &["kind"],
        ),
    )?;

    let import_rows_rejected_total = register(
        &registry,
        "import_rows_rejected_total",
        IntCounter::with_opts(Opts::new(
            "catalog_json_import_rows_rejected_total",
            "Imported product rows that failed validation.",
        )),
    )?;

    Some(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        import_runs_total,
        import_rows_merged_total,
        import_rows_rejected_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
