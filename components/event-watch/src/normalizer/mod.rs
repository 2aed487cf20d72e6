pub mod models;
#[allow(clippy::module_inception)]
pub mod normalizer;
