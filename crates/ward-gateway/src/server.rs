//! Server lifecycle: bind, serve, shut down on signal.

use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use ward_core::WorkspaceRoot;

use crate::routes::router;
use crate::state::AppState;

/// The gateway server for one workspace.
pub struct Gateway {
    addr: SocketAddr,
    state: AppState,
}

impl Gateway {
    /// Create a gateway bound to a workspace.
    #[must_use]
    pub fn new(workspace: &WorkspaceRoot, addr: SocketAddr) -> Self {
        Self {
            addr,
            state: AppState::for_workspace(workspace),
        }
    }

    /// Serve until interrupted (Ctrl+C or SIGTERM).
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn serve(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "ward gateway listening");
        if self.state.token().is_some() {
            tracing::info!("dashboard token required for all requests");
        }

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("ward gateway shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("received terminate signal, shutting down");
        }
    }
}
