//! # Cash Desk Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter (and optionally seed demo data)
//! - Create the payment service
//! - Start the HTTP server

mod config;
mod seed;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cashdesk_hex::{PaymentService, inbound::HttpServer};
use cashdesk_repo::build_repo;

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("cashdesk-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let (telemetry, otel_provider) = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let (tracer, provider) = init_tracer(endpoint)?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(provider),
            )
        }
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cashdesk_app=debug,cashdesk_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting cash desk server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!("Exporting spans to {}", endpoint);
    }

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    if config.seed_demo_data {
        seed::seed_demo_data(&repo).await?;
    }

    // Create the payment service
    let service = PaymentService::new(repo);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
