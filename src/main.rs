use boardsignal_auth::api;
use boardsignal_auth::logger::*;
use boardsignal_auth::server::*;
use boardsignal_auth::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::install();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.apply(&project_settings.log.filter)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;
    let tls = match (&project_settings.http.cert_path, &project_settings.http.key_path) {
        (Some(cert_path), Some(key_path)) => {
            if !fs::metadata(cert_path)?.is_file() {
                return Err(anyhow::anyhow!("TLS cert is not a regular file: {:?}", cert_path));
            }
            if !fs::metadata(key_path)?.is_file() {
                return Err(anyhow::anyhow!("TLS key is not a regular file: {:?}", key_path));
            }
            Some((cert_path.clone(), key_path.clone()))
        }
        (None, None) => None,
        _ => return Err(anyhow::anyhow!("http.cert_path and http.key_path must be set together")),
    };

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let routes = api::filter(server.clone());

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not register SIGINT: {}", e);
        }
    };

    match tls {
        Some((cert_path, key_path)) => {
            let (bound, serving) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown_signal);
            info!(%bound, "listening (tls)");
            serving.await;
        }
        None => {
            let (bound, serving) =
                warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown_signal)?;
            info!(%bound, "listening");
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
