#![allow(non_snake_case)]

#[cfg(feature = "ssr")]
mod config {
    use serde::Deserialize;
    use voyage_api::middleware::auth::Account;

    #[derive(Deserialize, Clone, Debug)]
    pub struct Config {
        pub server: ServerConfig,
        #[serde(default)]
        pub api: ApiConfig,
        #[serde(default)]
        pub accounts: Vec<Account>,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct ServerConfig {
        pub bind: String,
        pub port: u16,
    }

    #[derive(Deserialize, Clone, Debug, Default)]
    pub struct ApiConfig {
        /// Extra origins (other than this server) allowed to call the API
        /// with credentials.
        #[serde(default)]
        pub cors_origins: Vec<String>,
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                server: ServerConfig {
                    bind: "0.0.0.0".into(),
                    port: 3000,
                },
                api: ApiConfig::default(),
                accounts: Vec::new(),
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &str) -> Config {
        match std::fs::read_to_string(path) {
            Ok(contents) => match parse(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse config {path}: {e}, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to read config {path}: {e}, using defaults");
                Config::default()
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_accounts_and_cors() {
            let config = parse(
                r#"
                [server]
                bind = "127.0.0.1"
                port = 8080

                [api]
                cors_origins = ["https://admin.voyage.test"]

                [[accounts]]
                email = "ops@voyage.test"
                password = "letmein"
                token = "ops-token"

                [accounts.user]
                id = "1"
                name = "Ops"
                email = "ops@voyage.test"
                role = "admin"
                "#,
            )
            .unwrap();

            assert_eq!(config.server.port, 8080);
            assert_eq!(config.api.cors_origins.len(), 1);
            assert!(config.accounts[0].user.is_admin());
        }

        #[test]
        fn api_and_accounts_are_optional() {
            let config = parse("[server]\nbind = \"0.0.0.0\"\nport = 3000\n").unwrap();
            assert!(config.accounts.is_empty());
            assert!(config.api.cors_origins.is_empty());
        }
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use axum::Router;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::trace::TraceLayer;
    use tracing_subscriber::{fmt, EnvFilter};
    use voyage_api::middleware::auth::AppState;
    use voyage_ui::{shell, App};

    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse config path from args
    let args: Vec<String> = std::env::args().collect();
    let configPath = if let Some(idx) = args.iter().position(|a| a == "--config") {
        args.get(idx + 1)
            .cloned()
            .unwrap_or_else(|| "config.example.toml".into())
    } else {
        "config.example.toml".into()
    };

    let appConfig = config::load(&configPath);
    tracing::info!(
        "loaded config from {configPath}: bind={}:{} accounts={}",
        appConfig.server.bind,
        appConfig.server.port,
        appConfig.accounts.len()
    );
    if appConfig.accounts.is_empty() {
        tracing::warn!("no accounts configured, every login will be rejected");
    }

    let appState = AppState::new(appConfig.accounts.clone());

    let conf = get_configuration(None).expect("failed to load Leptos configuration");
    let leptosOptions = conf.leptos_options;
    let addr = format!("{}:{}", appConfig.server.bind, appConfig.server.port);

    let routes = generate_route_list(App);

    // The API router carries its own AppState; CORS only applies to it.
    let mut apiRouter = voyage_api::api_router(appState);
    if let Some(cors) = voyage_api::cors_layer(&appConfig.api.cors_origins) {
        apiRouter = apiRouter.layer(cors);
    }

    let app = Router::new()
        .leptos_routes(&leptosOptions, routes, {
            let leptosOptions = leptosOptions.clone();
            move || shell(leptosOptions.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptosOptions)
        .merge(apiRouter)
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server exited with error");
}

#[cfg(not(feature = "ssr"))]
fn main() {}
