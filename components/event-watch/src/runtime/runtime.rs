// Local crates
use crate::{
    cli::cli::WatchArgs,
    helpers::{load_config::Config, shutdown::spawn_ctrl_c_listener},
    instrumentation::tracing::init_tracing,
    output::sink::OutputSink,
    poller::{clock::SystemClock, error::WatchError, poller::Poller},
    source::http::HttpEventSource,
};

// External crates
use anyhow::Result;
use chrono::Utc;
use is_terminal::IsTerminal;
use std::io;
use terminal_size::{Width, terminal_size};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Table width used when standard output is not a terminal.
pub const FALLBACK_TERMINAL_WIDTH: usize = 80;

/// Watch runtime initialization and setup.
///
/// Option validation happens before anything else so that bad flags fail fast,
/// without credentials and without touching the network.
#[instrument(
    name = "event_watch_runtime",
    target = "runtime::runtime",
    skip_all,
    level = "debug"
)]
pub async fn run_watch(args: WatchArgs) -> Result<()> {
    let options = args.options();
    let properties = options.validate(Utc::now())?;

    // Load event-watch configurations
    let cfg = Config::load(&args.config)?;
    let _log_guard = init_tracing(&cfg.logging);

    let source = HttpEventSource::new(&cfg.account, &cfg.api).map_err(WatchError::Fetch)?;

    let stdout = io::stdout();
    let is_tty = stdout.is_terminal();
    let width = if is_tty {
        terminal_size()
            .map(|(Width(w), _)| usize::from(w))
            .unwrap_or(FALLBACK_TERMINAL_WIDTH)
    } else {
        FALLBACK_TERMINAL_WIDTH
    };
    let format = args.output.unwrap_or(cfg.output.format);
    let mut sink = OutputSink::new(
        stdout,
        format,
        properties,
        width,
        cfg.output.color.enabled(is_tty),
    );

    // Initialize CancellationToken
    let cancel = CancellationToken::new();
    let listener = spawn_ctrl_c_listener(cancel.clone());

    info!(
        streaming = options.streaming,
        format = ?format,
        width,
        "Starting event watch"
    );

    let mut poller = Poller::new(source, SystemClock);
    let result = poller
        .run(&options, |batch| sink.emit(batch), &cancel)
        .await;

    cancel.cancel();
    let _ = listener.await;

    match result {
        Ok(()) => {
            info!("Event watch finished");
            Ok(())
        }
        Err(e) => {
            // Reported once on stderr by main.
            tracing::debug!(error = %e, exit_code = e.exit_code(), "Event watch failed");
            Err(e.into())
        }
    }
}
