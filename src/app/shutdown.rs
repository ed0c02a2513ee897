use tokio::signal;
use tracing::{error, info};

/// Block until SIGINT or SIGTERM arrives.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        let mut sigterm = match unix_signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!(error = %e, "couldn't install SIGTERM handler, falling back to SIGINT only");
                if let Err(e) = signal::ctrl_c().await {
                    error!(error = %e, "couldn't listen for SIGINT");
                }
                return;
            }
        };

        tokio::select! {
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("received SIGINT, initiating graceful shutdown"),
                    Err(e) => error!(error = %e, "couldn't listen for SIGINT"),
                }
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, initiating graceful shutdown"),
            Err(e) => error!(error = %e, "couldn't listen for Ctrl+C"),
        }
    }
}
