//! Graceful shutdown

use tokio::signal;

/// Wait for Ctrl+C
async fn ctrl_c() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}

/// Wait for SIGTERM
#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut terminate) => {
            terminate.recv().await;
        }
        Err(err) => {
            tracing::error!("Could not listen for SIGTERM: {err}");
            std::future::pending::<()>().await;
        }
    }
}

/// Wait for SIGTERM, never happens on this platform
#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// Handler for graceful shutdown
///
/// In-flight requests, including their posts on the social account, are finished first
pub async fn handler() {
    tokio::select! {
        () = ctrl_c() => {},
        () = terminate() => {},
    }

    tracing::info!("Terminate signal received, starting graceful shutdown");
}
