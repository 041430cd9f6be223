//! Infrastructure wiring: building shared state from configuration.

pub mod state;
