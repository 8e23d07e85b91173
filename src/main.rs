// src/main.rs
use anyhow::Result;
use change_audit::{
    application::{
        capture::CaptureSettings,
        ports::{actor::ActorContext, time::Clock},
        services::AuditServices,
    },
    config::AuditConfig,
    domain::{audit::AuditStore, schema::AuditTableRegistry},
    infrastructure::{
        actor::ScopedActorContext, database, model::StaticModelMetadata,
        stores::PostgresAuditStore, time::SystemClock,
    },
    presentation::http::{routes::build_router, state::HttpState},
    telemetry::init_tracing,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    init_tracing();

    let config = AuditConfig::from_env()?;

    let metadata = match config.model_path() {
        Some(path) => StaticModelMetadata::from_file(path)?,
        None => {
            tracing::warn!("AUDIT_MODEL_PATH not set; no entity types are declared");
            StaticModelMetadata::new()
        }
    };
    let declared = metadata.entities();

    let audit_tables = Arc::new(AuditTableRegistry::new());
    let store = Arc::new(PostgresAuditStore::new(Arc::clone(&audit_tables)));
    store.register_pool(
        config.default_schema(),
        database::init_pool(config.database_url()).await?,
    );
    for (schema, url) in config.schema_databases() {
        store.register_pool(schema, database::init_lazy_pool(url)?);
    }

    let actor: Arc<dyn ActorContext> = Arc::new(ScopedActorContext);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = CaptureSettings {
        default_schema: config.default_schema().to_string(),
        save_timeout: config.save_timeout(),
    };

    let services = Arc::new(AuditServices::new(
        Arc::new(metadata),
        Arc::clone(&audit_tables),
        Arc::clone(&store) as Arc<dyn AuditStore>,
        actor,
        clock,
        settings,
    ));

    for entity_type in &declared {
        let info = services.register_entity(entity_type)?;
        tracing::info!(entity_type = %entity_type, table = %info.qualified_name(), "entity registered for auditing");
    }
    store.ensure_audit_tables().await?;

    let app = build_router(HttpState::new(Arc::clone(&services)));

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    let address: SocketAddr = listener.local_addr()?;
    tracing::info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
