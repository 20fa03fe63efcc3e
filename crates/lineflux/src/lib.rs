//! Top-level facade crate for lineflux.
//!
//! Re-exports the core primitives and the agent so users can depend on a single crate.

pub mod core {
    pub use lineflux_core::*;
}

pub mod agent {
    pub use lineflux_agent::*;
}
