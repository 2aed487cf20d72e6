//! Watch a telephony account's debugger alerts, messages and calls as one merged,
//! time ordered event stream.

pub mod cli;
pub mod dedup;
pub mod helpers;
pub mod instrumentation;
pub mod normalizer;
pub mod output;
pub mod poller;
pub mod runtime;
pub mod source;
