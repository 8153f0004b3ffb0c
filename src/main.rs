use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kongbridge::kong::KongClient;
use kongbridge::store::PgStore;
use kongbridge::sync::Synchronizer;
use kongbridge::{api, cli, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional OpenTelemetry (OTLP) export; enabled when the endpoint is set.
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "kongbridge"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "kongbridge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Migrate) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            db.migrate().await?;
            println!("migrations applied");
            Ok(())
        }
        Some(cli::Commands::Api { command }) => {
            let state = build_state(cfg).await?;
            api_command(&state, command).await
        }
        Some(cli::Commands::Consumer { command }) => {
            let state = build_state(cfg).await?;
            consumer_command(&state, command).await
        }
        Some(cli::Commands::Plugin { command }) => {
            let state = build_state(cfg).await?;
            plugin_command(&state, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    }
}

async fn build_state(cfg: config::Config) -> anyhow::Result<AppState> {
    let db = PgStore::connect(&cfg.database_url).await?;
    let kong = KongClient::new(
        &cfg.kong_admin_url,
        Duration::from_secs(cfg.kong_timeout_secs),
    )
    .context("failed to build kong admin client")?;
    Ok(AppState::new(db, kong, cfg))
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(build_state(cfg).await?);
    state.db.migrate().await?;

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/v1", api::api_router(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("kongbridge management API listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn api_command(state: &AppState, command: cli::RefCommands) -> anyhow::Result<()> {
    match command {
        cli::RefCommands::List => {
            for r in state.db.list_apis().await? {
                println!(
                    "{}  {}  {}  synchronized={}",
                    r.id,
                    r.public_dns.as_deref().unwrap_or("-"),
                    r.target_url,
                    r.synchronized()
                );
            }
        }
        cli::RefCommands::Sync { id } => {
            let mut reference = state
                .db
                .get_api(id)
                .await?
                .with_context(|| format!("no api reference {id}"))?;
            state
                .api_engine
                .synchronize(&state.kong, &mut reference)
                .await?;
            println!("synchronized: kong_id={:?}", reference.kong_id);
        }
        cli::RefCommands::Withdraw { id } => {
            let mut reference = state
                .db
                .get_api(id)
                .await?
                .with_context(|| format!("no api reference {id}"))?;
            state
                .api_engine
                .withdraw(&state.kong, &mut reference)
                .await?;
            println!("withdrawn");
        }
    }
    Ok(())
}

async fn consumer_command(state: &AppState, command: cli::RefCommands) -> anyhow::Result<()> {
    match command {
        cli::RefCommands::List => {
            for r in state.db.list_consumers().await? {
                println!(
                    "{}  {}  synchronized={}",
                    r.id,
                    r.username
                        .as_deref()
                        .or(r.custom_id.as_deref())
                        .unwrap_or("-"),
                    r.synchronized()
                );
            }
        }
        cli::RefCommands::Sync { id } => {
            let mut reference = state
                .db
                .get_consumer(id)
                .await?
                .with_context(|| format!("no consumer reference {id}"))?;
            state
                .consumer_engine
                .synchronize(&state.kong, &mut reference)
                .await?;
            println!("synchronized: kong_id={:?}", reference.kong_id);
        }
        cli::RefCommands::Withdraw { id } => {
            let mut reference = state
                .db
                .get_consumer(id)
                .await?
                .with_context(|| format!("no consumer reference {id}"))?;
            state
                .consumer_engine
                .withdraw(&state.kong, &mut reference)
                .await?;
            println!("withdrawn");
        }
    }
    Ok(())
}

async fn plugin_command(state: &AppState, command: cli::RefCommands) -> anyhow::Result<()> {
    match command {
        cli::RefCommands::List => {
            for r in state.db.list_plugins(None).await? {
                println!(
                    "{}  {}  api={}  synchronized={}",
                    r.id,
                    r.name,
                    r.api_id,
                    r.synchronized()
                );
            }
        }
        cli::RefCommands::Sync { id } => {
            let mut reference = state
                .db
                .get_plugin(id)
                .await?
                .with_context(|| format!("no plugin reference {id}"))?;
            state
                .plugin_engine
                .synchronize(&state.kong, &mut reference)
                .await?;
            println!("synchronized: kong_id={:?}", reference.kong_id);
        }
        cli::RefCommands::Withdraw { id } => {
            let mut reference = state
                .db
                .get_plugin(id)
                .await?
                .with_context(|| format!("no plugin reference {id}"))?;
            state
                .plugin_engine
                .withdraw(&state.kong, &mut reference)
                .await?;
            println!("withdrawn");
        }
    }
    Ok(())
}
