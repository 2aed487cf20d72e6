// External crates
use tokio::{signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Cancels `token` on the first Ctrl-C. The task also ends once `token` is cancelled
/// by anyone else, so the runtime can join it after a normal finish.
#[instrument(
    name = "event_watch_shutdown_listener",
    target = "helpers::shutdown",
    skip_all,
    level = "trace"
)]
pub fn spawn_ctrl_c_listener(token: CancellationToken) -> JoinHandle<()> {
    tracing::trace!("Installing Ctrl-C listener");

    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::trace!("Watch finished before any interrupt");
            }
            signal = signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        eprintln!("Interrupted, stopping the watch.");
                        tracing::info!("Interrupt received, stopping the watch");
                        token.cancel();
                    }
                    Err(e) => tracing::error!(error = %e, "Unable to listen for Ctrl-C"),
                }
            }
        }
    })
}
