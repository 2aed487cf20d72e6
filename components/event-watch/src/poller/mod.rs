pub mod clock;
pub mod error;
pub mod options;
#[allow(clippy::module_inception)]
pub mod poller;
