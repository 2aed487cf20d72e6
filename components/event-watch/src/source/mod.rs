pub mod http;
pub mod models;
#[allow(clippy::module_inception)]
pub mod source;
