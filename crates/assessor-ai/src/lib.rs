//! Property assessment decision support: a message envelope, the master control router,
//! and the validation and valuation agents it dispatches to.

pub mod agents;
pub mod assessment;
pub mod config;
pub mod error;
pub mod mcp;
pub mod repository;
pub mod service;
pub mod telemetry;
