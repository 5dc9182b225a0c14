//! Domain models for HerbChain

pub mod batch;
pub mod identity;

pub use batch::*;
pub use identity::*;
