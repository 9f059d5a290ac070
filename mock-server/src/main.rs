use mock_server::{AuthConfig, DEFAULT_API_KEY};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mock_server=debug".into()))
        .with(fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let auth = AuthConfig {
        api_key: std::env::var("API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
        accept_query_key: !matches!(
            std::env::var("MOCK_HEADER_ONLY").as_deref(),
            Ok("1") | Ok("true")
        ),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, header_only = !auth.accept_query_key, "listening");
    mock_server::run(listener, auth).await
}
