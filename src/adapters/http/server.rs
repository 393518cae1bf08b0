//! Serving the router with a bounded shutdown drain.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::adapters::realtime::BroadcastHub;

const CLOSE_INTERVAL: Duration = Duration::from_millis(100);

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// Once the signal fires axum stops accepting connections and the hub's
/// event streams are closed every [`CLOSE_INTERVAL`] until axum reports
/// that every connection has finished. Streams registered during the
/// drain are closed on the next tick. Connections still open after
/// `drain_timeout` are abandoned.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    hub: Arc<BroadcastHub>,
    shutdown: impl Future<Output = ()>,
    drain_timeout: Duration,
) -> std::io::Result<()> {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stop_rx.wait_for(|stop| *stop).await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        () = shutdown => {}
    }

    tracing::info!("Shutdown requested, draining connections");
    stop_tx.send_replace(true);

    let drain = async {
        let mut ticker = tokio::time::interval(CLOSE_INTERVAL);
        loop {
            tokio::select! {
                result = &mut server => return result,
                _ = ticker.tick() => {
                    hub.close_all();
                }
            }
        }
    };

    match tokio::time::timeout(drain_timeout, drain).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                timeout_secs = drain_timeout.as_secs_f64(),
                "Connections still open after drain timeout"
            );
            Ok(())
        }
    }
}
