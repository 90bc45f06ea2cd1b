//! Interrupt handling
//!
//! A run is raced against Ctrl-C (and SIGTERM on unix). When the signal wins,
//! the run future is dropped where it stands: the in-flight request or sleep
//! is abandoned, any `.part` file stays behind, and the caller gets
//! `AppError::Interrupted`.

use std::future::Future;

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::{AppError, Result};

/// Which signal ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Waits for the first termination signal
///
/// If a handler cannot be installed, that signal source is treated as never
/// firing and the failure is logged.
pub async fn wait_for_signal() -> ShutdownSignal {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C signal received");
            ShutdownSignal::Interrupt
        },
        _ = terminate => {
            info!("SIGTERM signal received");
            ShutdownSignal::Terminate
        },
    }
}

/// Broadcasts the first termination signal to subscribers
pub struct SignalHandler {
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl SignalHandler {
    /// Create a new signal handler with the given shutdown broadcaster
    pub fn new(shutdown_tx: broadcast::Sender<ShutdownSignal>) -> Self {
        Self { shutdown_tx }
    }

    /// Spawn the task that waits for a signal and broadcasts it
    pub fn setup(&self) -> JoinHandle<()> {
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            let received = wait_for_signal().await;
            let _ = shutdown_tx.send(received);
        })
    }
}

/// Create a shutdown signal broadcaster
pub fn create_shutdown_channel() -> (
    broadcast::Sender<ShutdownSignal>,
    broadcast::Receiver<ShutdownSignal>,
) {
    broadcast::channel(1)
}

/// Run `work` until it finishes or a shutdown is broadcast
///
/// # Errors
///
/// Returns `AppError::Interrupted` if the shutdown arrives first, otherwise
/// whatever `work` returns.
pub async fn run_until_shutdown<F, T>(
    work: F,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        result = work => result,
        received = next_signal(&mut shutdown_rx) => {
            info!("Stopping run after {:?}", received);
            Err(AppError::Interrupted)
        }
    }
}

/// Next broadcast signal; a closed channel never fires
async fn next_signal(shutdown_rx: &mut broadcast::Receiver<ShutdownSignal>) -> ShutdownSignal {
    loop {
        match shutdown_rx.recv().await {
            Ok(received) => return received,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}
