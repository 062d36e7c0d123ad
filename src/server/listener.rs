use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::http::router::Router;

/// Pause after an accept failure that is not tied to a single peer, such as
/// running out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accepts connections forever, one task per connection.
///
/// A failing connection is logged and dropped; it never affects the others.
pub async fn run(cfg: &Config, router: Router<TcpStream>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, router).await
}

/// Like [`run`], on an already bound listener. Only returns if the task is
/// cancelled.
pub async fn serve(listener: TcpListener, router: Router<TcpStream>) -> anyhow::Result<()> {
    let router = Arc::new(router);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                match accept_backoff(&e) {
                    None => debug!(error = %e, "accept failed for one peer"),
                    Some(pause) => {
                        error!(error = %e, "accept failed, backing off");
                        tokio::time::sleep(pause).await;
                    }
                }
                continue;
            }
        };
        debug!(%peer, "accepted connection");

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            if let Err(e) = router.handle_connection(socket).await {
                error!(%peer, error = %e, "connection failed");
            }
        });
    }
}

/// How long to wait before accepting again. `None` for failures caused by a
/// single peer going away, which leave the listener healthy.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}
