use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use botbrain_store::Transport;

use crate::error::BrainError;

/// Lifecycle of the single store connection.
///
/// `Connecting → Connected → (Authenticating → Authenticated | AuthFailed)
/// → Ready`, with `Failed` when the initial connect errors and `Closed` as
/// the terminal teardown state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Authenticating,
    Authenticated,
    AuthFailed,
    Ready,
    Failed,
    Closed,
}

/// One-time readiness gate all operations await before touching the store.
///
/// [`establish`](ReadyGate::establish) drives the handshake (connect,
/// then auth iff a credential is configured) on a background task.
/// Failures are logged and leave the gate unresolved:
/// [`ReadyGate::ready`] then pends forever, so dependent operations stay
/// pending rather than racing an unready connection. There is no built-in
/// timeout; callers impose their own.
#[derive(Debug)]
pub struct ReadyGate {
    tx: watch::Sender<ConnectionState>,
    rx: watch::Receiver<ConnectionState>,
}

/// Publish `next` unless the gate has already been closed. `Closed` is
/// terminal: a handshake step losing this race must not revive the gate.
fn advance(tx: &watch::Sender<ConnectionState>, next: ConnectionState) -> bool {
    tx.send_if_modified(|state| {
        if *state == ConnectionState::Closed {
            return false;
        }
        *state = next;
        true
    })
}

impl ReadyGate {
    /// Start the handshake against `transport`. Must be called from
    /// within a Tokio runtime.
    pub fn establish(transport: Arc<dyn Transport>, password: Option<String>) -> Self {
        let (tx, rx) = watch::channel(ConnectionState::Connecting);
        let task_tx = tx.clone();
        tokio::spawn(async move {
            match transport.connect().await {
                Ok(()) => {
                    info!("connected to store");
                    if !advance(&task_tx, ConnectionState::Connected) {
                        return;
                    }
                }
                Err(err) => {
                    let err = BrainError::Connection(err.to_string());
                    error!(%err, "failed to connect to store");
                    advance(&task_tx, ConnectionState::Failed);
                    return;
                }
            }

            if let Some(password) = password {
                if !advance(&task_tx, ConnectionState::Authenticating) {
                    return;
                }
                match transport.auth(&password).await {
                    Ok(()) => {
                        info!("authenticated to store");
                        if !advance(&task_tx, ConnectionState::Authenticated) {
                            return;
                        }
                    }
                    Err(err) => {
                        let err = BrainError::Auth(err.to_string());
                        error!(%err, "failed to authenticate to store");
                        advance(&task_tx, ConnectionState::AuthFailed);
                        return;
                    }
                }
            }

            advance(&task_tx, ConnectionState::Ready);
        });
        Self { tx, rx }
    }

    /// Resolve once the connection is ready. Never resolves after a
    /// connect or auth failure, or once closed.
    pub async fn ready(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() == ConnectionState::Ready {
                return;
            }
            if rx.changed().await.is_err() {
                // Handshake task is gone without reaching Ready; stay
                // pending per the failure policy.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.rx.borrow()
    }

    /// Mark the connection closed. Terminal.
    pub(crate) fn publish_closed(&self) {
        self.tx.send_replace(ConnectionState::Closed);
    }
}
