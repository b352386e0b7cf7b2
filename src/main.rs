use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use contact_relay::{
    graceful_shutdown::shutdown_signal,
    middlewares::cors::{CorsHeaders, CorsPolicy},
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => {
            init_tracing(cfg.is_production());
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = web::Data::new(AppState::new(&config)?);
    let cors_origins = config.cors_origins();
    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(CorsHeaders::new(CorsPolicy::new(cors_origins.clone())))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
