#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc, unreachable_pub)]
use messageboard_server::adapters::database::{self, DbPool};
use messageboard_server::api::{MgmtState, app_router, mgmt_router};
use messageboard_server::config::{
    Config, DatabaseConfig, GridConfig, HealthConfig, LogFormat, ServerConfig, TelemetryConfig,
};
use serde_json::Value;
use std::sync::Once;
use tokio::net::TcpListener;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("messageboard_server=debug".parse().unwrap())
            .add_directive("sqlx=warn".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // 0 means let OS choose
            mgmt_port: 0,
            shutdown_timeout_secs: 1,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 5,
        },
        grid: GridConfig { default_page_length: 15 },
        health: HealthConfig { db_timeout_ms: 2000 },
        telemetry: TelemetryConfig { log_level: "warn".to_string(), log_format: LogFormat::Text },
    }
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub pool: DbPool,
    pub config: Config,
}

impl TestApp {
    pub async fn spawn() -> Self {
        setup_tracing();
        let config = get_test_config();

        let pool = database::init_pool(&config.database).await.expect("Failed to open in-memory database");
        messageboard_server::run_migrations(&pool).await.expect("Failed to run migrations");

        let services = messageboard_server::build_services(&config, pool.clone()).unwrap();
        let mgmt = mgmt_router(MgmtState { health_service: services.health_service.clone() });
        let app = app_router(config.clone(), services);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self { server_url, mgmt_url, client, pool, config }
    }

    /// POSTs a form to `path` and parses the JSON reply.
    pub async fn post_json(&self, path: &str, pairs: &[(&str, &str)]) -> Value {
        let mut form: Vec<(&str, &str)> = vec![("format", "json")];
        form.extend_from_slice(pairs);
        let resp = self.client.post(format!("{}{}", self.server_url, path)).form(&form).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        resp.json().await.unwrap()
    }

    pub async fn add_message(&self, author: &str, message: &str) -> Value {
        self.post_json("/add", &[("author", author), ("message", message)]).await
    }

    /// Sends a grid request declaring `author` (searchable), `message` (searchable) and `created` columns.
    pub async fn grid(&self, extra: &[(&str, &str)]) -> Value {
        let mut pairs: Vec<(&str, &str)> = vec![
            ("draw", "1"),
            ("columns[0][data]", "author"),
            ("columns[0][searchable]", "true"),
            ("columns[1][data]", "message"),
            ("columns[1][searchable]", "true"),
            ("columns[2][data]", "created"),
            ("columns[2][searchable]", "false"),
        ];
        pairs.extend_from_slice(extra);
        self.grid_raw(&pairs).await
    }

    pub async fn grid_raw(&self, pairs: &[(&str, &str)]) -> Value {
        let resp = self.client.post(format!("{}/", self.server_url)).form(pairs).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        resp.json().await.unwrap()
    }
}

pub fn authors(grid: &Value) -> Vec<String> {
    grid["data"].as_array().unwrap().iter().map(|row| row["author"].as_str().unwrap().to_string()).collect()
}

pub fn seqs(grid: &Value) -> Vec<u64> {
    grid["data"].as_array().unwrap().iter().map(|row| row["_seq"].as_u64().unwrap()).collect()
}
