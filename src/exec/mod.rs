// src/exec/mod.rs

pub mod connector;
pub mod invocation;

pub use connector::{PackConnector, RealConnector, ServicePack};
pub use invocation::{Invocation, build_invocation};
