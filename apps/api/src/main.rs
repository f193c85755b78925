mod artifacts;
mod config;
mod errors;
mod jobs;
mod models;
mod render_client;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::artifacts::local::LocalFileReader;
use crate::artifacts::object_store::S3ArtifactReader;
use crate::artifacts::{ArtifactLocator, ArtifactResolver};
use crate::config::Config;
use crate::jobs::store::PgJobStore;
use crate::render_client::LatexServiceClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ApplAI API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let jobs = PgJobStore::connect(&config.database_url, 10).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LaTeX compile service client
    let renderer = LatexServiceClient::new(config.latex_service_url.clone(), config.render_timeout)?;
    info!("Render service client initialized ({})", config.latex_service_url);

    info!(
        "Legacy artifacts served from {}",
        config.files_base_path.display()
    );
    let resolver = ArtifactResolver::new(
        ArtifactLocator::new(config.locator_config()),
        Arc::new(S3ArtifactReader::new(s3, config.s3_bucket.clone())),
        LocalFileReader::new(config.files_base_path.clone()),
        Arc::new(renderer),
    );

    // Build app state
    let state = AppState {
        jobs: Arc::new(jobs),
        resolver: Arc::new(resolver),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
/// Without explicit keys the default credential chain is used.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "applai-static",
        ));
    }

    let s3_config = match &config.s3_endpoint {
        Some(endpoint) => {
            let shared = loader.endpoint_url(endpoint).load().await;
            // MinIO serves buckets by path, not by virtual host.
            aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(true)
                .build()
        }
        None => aws_sdk_s3::config::Builder::from(&loader.load().await).build(),
    };

    aws_sdk_s3::Client::from_conf(s3_config)
}
