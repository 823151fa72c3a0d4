pub mod capture_provider;
pub mod control_inputs;
pub mod filesystem;
pub mod persistence;
pub mod status_sink;
