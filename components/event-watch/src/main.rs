use event_watch::{cli, instrumentation, poller::error::WatchError};

#[tokio::main]
async fn main() {
    instrumentation::tracing::init_panic_handler();

    // Main entrypoint simply delegates control to CLI layer.
    if let Err(err) = cli::cli::run().await {
        let code = match err.downcast_ref::<WatchError>() {
            Some(watch_err) => {
                eprintln!("{watch_err}");
                watch_err.exit_code()
            }
            None => {
                eprintln!("Error: {err:#}");
                1
            }
        };
        std::process::exit(code);
    }
}
