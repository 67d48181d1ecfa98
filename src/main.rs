use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use todo_api::routes::{self, health};
use todo_api::store::{PgCredentialStore, PgTaskStore};
use todo_api::{AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    if config.uses_default_secret() {
        log::warn!("JWT_SECRET is not set; signing tokens with the built-in default secret");
    }

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|e| {
                    log::error!("failed to connect to database: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    log::error!("failed to run migrations: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            AppState::new(
                &config,
                Arc::new(PgCredentialStore::new(pool.clone())),
                Arc::new(PgTaskStore::new(pool)),
            )
        }
        None => {
            log::warn!("DATABASE_URL is not set; using in-memory stores");
            AppState::in_memory(&config)
        }
    };

    log::info!("Starting server at {}", config.server_url());

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(|cfg| state.configure(cfg))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
