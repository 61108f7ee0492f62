pub mod comparison;
pub mod functions;
pub mod operations;
pub mod runtime;
pub mod types;
