use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use api::{clients::image_host::S3ImageHost, serve, Config};
use aws_sdk_s3::config::Credentials;
use repository::{ConnectionManager, Repository};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use util::{load_config, Secrets};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config::<Config>("Config.toml")?;
    let secrets = Secrets::load()?;

    let conn_string = secrets.require("DATABASE_URL")?;
    let connection =
        Arc::new(ConnectionManager::new(conn_string, config.database.clone()));
    let repository = Repository::new(connection);

    let access_key_id = secrets.require("AWS_ACCESS_KEY_ID")?;
    let secret_access_key = secrets.require("AWS_SECRET_ACCESS_KEY")?;
    let aws_url = secrets.require("AWS_URL")?;
    let bucket = secrets.require("BUCKET")?;
    let credentials =
        Credentials::new(access_key_id, secret_access_key, None, None, "");
    let cfg = aws_config::from_env()
        .endpoint_url(aws_url)
        .region("auto")
        .credentials_provider(credentials)
        .load()
        .await;
    let s3 = aws_sdk_s3::Client::new(&cfg);
    let images = Arc::new(S3ImageHost::new(s3, bucket, config.media.clone()));

    let router = serve(repository, images, &config)?;

    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(task = "listening", address = %address);

    Ok(axum::serve(listener, router).await?)
}
