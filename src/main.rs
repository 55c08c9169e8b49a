//! slirc - Straylight IRC client
//!
//! Connects with a TOML config, joins the configured channels and logs
//! channel traffic until interrupted.

use slirc_client::callback::{WILDCARD, handler_fn};
use slirc_client::{Client, Config, config};
use slirc_proto::response::{ERR_NOMOTD, RPL_ENDOFMOTD};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.address(),
        nick = %config.identity.nick,
        tls = config.server.tls.enabled,
        "Starting slirc"
    );

    let channels = config.channels.clone();
    let client = Client::new(config);

    // Join once the MOTD is over (or absent).
    for numeric in [RPL_ENDOFMOTD, ERR_NOMOTD] {
        let channels = channels.clone();
        client.add_handler(
            numeric,
            handler_fn(move |client, _| {
                let channels = channels.clone();
                async move {
                    for channel in &channels {
                        if let Err(e) = client.join(channel).await {
                            warn!(channel = %channel, error = %e, "Join failed");
                        }
                    }
                }
            }),
        );
    }

    client.add_handler(
        WILDCARD,
        handler_fn(|_, event| async move {
            if matches!(event.command.as_str(), "PRIVMSG" | "NOTICE") {
                info!(
                    from = event.source_nick().unwrap_or("*"),
                    to = event.param(0).unwrap_or("*"),
                    "{}",
                    event.trailing.as_deref().unwrap_or_default()
                );
            }
        }),
    );

    client.connect().await?;

    let runner = client.clone();
    let dispatch = tokio::spawn(async move { runner.run().await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, quitting");
            client.quit("Leaving").await;
            client.stop();
        }
        result = dispatch => {
            result??;
            return Ok(());
        }
    }

    Ok(())
}
