use cadence::api;
use cadence::logger::*;
use cadence::server::*;
use cadence::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let project_settings = parse_settings(cli.settings.as_deref())?;

    let logger = Logger::new_bootstrap(project_settings.log.json);
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let routes = api::v1::routes(server.clone())
        .recover(api::v1::recover_error)
        .with(warp::trace::request());

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not register SIGINT: {}", e);
        }
    };

    match (&project_settings.http.cert_path, &project_settings.http.key_path) {
        (Some(cert_path), Some(key_path)) => {
            for path in [cert_path, key_path] {
                if !fs::metadata(path)?.is_file() {
                    return Err(anyhow::anyhow!("TLS file is not a regular file: {:?}", path));
                }
            }
            let (bound, serving) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown);
            info!(%bound, "listening with TLS");
            serving.await;
        }
        (None, None) => {
            let (bound, serving) = warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown)?;
            info!(%bound, "listening");
            serving.await;
        }
        _ => return Err(anyhow::anyhow!("cert_path and key_path must be set together")),
    }

    info!("server shutdown successfully");
    Ok(())
}
