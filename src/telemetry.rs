//! Console logging with optional OpenTelemetry export
//!
//! Logs always go to stderr, filtered by `RUST_LOG`. When
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans and metrics are also exported
//! over OTLP/HTTP.

use anyhow::anyhow;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{MetricExporter, SpanExporter};
use opentelemetry_sdk::{metrics::SdkMeterProvider, trace::SdkTracerProvider, Resource};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

const SERVICE_NAME: &str = "sitechat";
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn resource() -> Resource {
    Resource::builder().with_service_name(SERVICE_NAME).build()
}

fn init_traces() -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .build()
        .map_err(|e| anyhow!("Failed to create trace exporter: {e:?}"))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource())
        .build())
}

fn init_metrics() -> anyhow::Result<SdkMeterProvider> {
    let exporter = MetricExporter::builder()
        .with_http()
        .build()
        .map_err(|e| anyhow!("Failed to create metric exporter: {e:?}"))?;

    Ok(SdkMeterProvider::builder()
        .with_periodic_exporter(exporter)
        .with_resource(resource())
        .build())
}

/// Initialize the global tracing subscriber
///
/// Keep the returned guard alive for the whole run; dropping it flushes and
/// shuts down the exporters.
pub fn init_tracing_subscriber() -> anyhow::Result<OtelGuard> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    if std::env::var_os(OTLP_ENDPOINT_VAR).is_none() {
        tracing_subscriber::registry().with(console_layer).init();
        return Ok(OtelGuard { providers: None });
    }

    let tracer_provider = init_traces()?;
    let meter_provider = init_metrics()?;
    let tracer = tracer_provider.tracer(SERVICE_NAME);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(MetricsLayer::new(meter_provider.clone()))
        .with(OpenTelemetryLayer::new(tracer))
        .init();

    Ok(OtelGuard {
        providers: Some((tracer_provider, meter_provider)),
    })
}

/// Shuts the OpenTelemetry providers down when dropped
pub struct OtelGuard {
    providers: Option<(SdkTracerProvider, SdkMeterProvider)>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some((tracer_provider, meter_provider)) = self.providers.take() {
            if let Err(err) = tracer_provider.shutdown() {
                eprintln!("{err:?}");
            }
            if let Err(err) = meter_provider.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}
