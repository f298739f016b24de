//! Types library for the priority-auction settlement layer
//!
//! This library provides the identity and rate primitives shared across the
//! settlement contracts, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Key-derived identities (`Address`, `NodeId`)
//! - `rate`: Basis-point rates with floor-division application

pub mod ids;
pub mod rate;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::rate::*;
}
