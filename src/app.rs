/*
 * Responsibility
 * - load Config -> build dependencies -> assemble the Router
 * - apply middleware (gate per route group, CORS / HTTP layers globally)
 * - serve with axum::serve() until Ctrl-C / SIGTERM
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    i18n::Catalog,
    middleware::{self, auth::AccessGate, http::HttpLimits},
    services::{
        auth::{JwtIssuer, OtpPolicy, PasswordHasher},
        mail::LettreMailer,
        upload::UploadStore,
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,polyglot_users=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let catalog = Arc::new(match &config.messages_dir {
        Some(dir) => Catalog::from_dir(dir, &config.default_locale)?,
        None => Catalog::builtin(&config.default_locale)?,
    });
    tracing::info!(
        locales = ?catalog.locales(),
        default = catalog.default_locale(),
        "message catalog loaded"
    );

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to run migrations")?;

    let mailer = LettreMailer::new(&config.mail)?;
    tracing::info!(backend = ?mailer, "mailer ready");

    let uploads = UploadStore::new(&config.upload);
    uploads.ensure_dir().await?;

    Ok(AppState {
        db,
        gate: AccessGate::new(&config.auth, catalog.clone()),
        catalog,
        issuer: Arc::new(JwtIssuer::new(&config.auth)),
        hasher: PasswordHasher::new(config.auth.bcrypt_cost),
        otp: OtpPolicy::new(&config.otp),
        mailer: Arc::new(mailer),
        uploads: Arc::new(uploads),
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.gate.clone()))
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, HttpLimits::from_config(config))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
