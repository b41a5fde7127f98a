use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use fleet_scheduling::config::environment::EnvironmentConfig;
use fleet_scheduling::database;
use fleet_scheduling::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use fleet_scheduling::routes;
use fleet_scheduling::services::task_runner;
use fleet_scheduling::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 Fleet Scheduling - Horarios y pagos de flota");
    info!("===============================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let app_state = AppState::new(pool, config.clone());

    // Lanzar los lazos de conciliación (expiración + pagos diarios)
    let _background = task_runner::spawn_reconciliation_tasks(&app_state);

    // CORS: permisivo en desarrollo, orígenes explícitos en producción
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    // Crear router de la API
    let app = Router::new()
        .route("/test", get(test_endpoint))
        .merge(routes::create_api_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("📅 Endpoints - Schedule:");
    info!("   POST /api/schedule - Crear horario");
    info!("   GET  /api/schedule - Listar horarios");
    info!("   GET  /api/schedule/current - Horarios activos");
    info!("   GET  /api/schedule/future - Horarios futuros");
    info!("   GET  /api/schedule/driver/:id - Horarios por conductor");
    info!("   GET  /api/schedule/vehicle/:id - Horarios por vehículo");
    info!("   GET  /api/schedule/date/:date - Horarios en una fecha");
    info!("   GET  /api/schedule/period - Horarios en un período");
    info!("   GET  /api/schedule/conflicts - Enumerar conflictos de ventana");
    info!("   PUT  /api/schedule/:id - Actualizar horario");
    info!("   PUT  /api/schedule/:id/status - Cambiar estado");
    info!("   DELETE /api/schedule/:id - Eliminar horario (cascada de pagos)");
    info!("   POST /api/schedule/check-expired - Barrido de expiración manual");
    info!("💰 Endpoints - Payment:");
    info!("   POST /api/payment - Registrar pago");
    info!("   GET  /api/payment/schedule/:id - Pagos de un horario");
    info!("   GET  /api/payment/schedule/:id/missing - Días impagos");
    info!("   PUT  /api/payment/:id - Actualizar pago");
    info!("   POST /api/payment/:id/status - Confirmar/rechazar pago");
    info!("   DELETE /api/payment/:id - Eliminar pago");
    info!("🧑 Endpoints - Driver:");
    info!("   POST /api/driver - Registrar conductor");
    info!("   GET  /api/driver - Listar conductores");
    info!("   PUT  /api/driver/:id/departure - Registrar salida");
    info!("🚗 Endpoints - Vehicle:");
    info!("   POST /api/vehicle - Registrar vehículo");
    info!("   GET  /api/vehicle - Listar vehículos");
    info!("   PUT  /api/vehicle/:id/status - Cambiar estado");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Fleet Scheduling API funcionando correctamente",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
