pub mod columns;
pub mod sink;
