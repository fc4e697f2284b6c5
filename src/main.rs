#[macro_use]
extern crate lazy_static;
use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};

use std::{collections::HashMap, str::FromStr};
use tera::{Tera, Value};

use actix_files::Files;
use actix_web::{
    middleware,
    web::{self, Data},
    App, HttpServer,
};
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};

mod config;
mod dates;
mod db;
mod entity;
mod errors;
mod forms;
mod gateway;
mod reconcile;
mod resolver;
mod routes;
mod structs;
mod utils;

use config::Config;
use errors::AppError;
use gateway::ApiClient;

#[derive(Debug, Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    api: ApiClient,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera.register_filter("byte_size", byte_size_filter);
        tera
    };
}

/// `{{ tenant.addressProff | byte_size }}`
fn byte_size_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_str() {
        Some(data) => Ok(Value::String(utils::byte_size(data))),
        None => Ok(Value::String(String::new())),
    }
}

async fn connect(config: &Config) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(std::time::Duration::from_secs(5));

    let db_pool = SqlitePool::connect_with(opts).await?;
    sqlx::migrate!().run(&db_pool).await?;
    info!("Database migrated successfully");

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        db::ensure_admin(&db_pool, email, password).await?;
    }
    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: {}", e);
        e
    })?;

    let db_pool = connect(&config).await?;
    let api = ApiClient::new(&config.api_url, config.api_token.as_deref())
        .map_err(AppError::from)?;
    info!("Using rent management API at {}", config.api_url);

    // fail on broken templates before accepting requests
    lazy_static::initialize(&TEMPLATES);

    let state = AppState { db_pool, api };
    let session_key = config.cookie_key();

    info!(
        "Starting HTTP server on http://{}:{}/",
        config.bind_addr, config.port
    );

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .app_data(Data::new(state.clone()))
            .configure(routes::configure)
            .default_service(web::to(routes::default_handler))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
