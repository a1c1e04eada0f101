//! Access control for the Civic Assistant.
//!
//! Every request passes through [`AccessGate::check`] before it may touch a
//! tenant's corpus. The gate combines three inputs:
//!
//! - the tenant registry (case-insensitive key lookup, per-tenant token),
//! - each tenant's optional activation window,
//! - the process-wide [`AccessSwitch`] an operator can flip at runtime.
//!
//! Evaluation order is fixed: tenant lookup, switch, token, window. The switch
//! is consulted before the token so a suspended service says nothing about
//! whether a token would have been accepted.

pub mod gate;
pub mod switch;
pub mod tenant;

pub use gate::{AccessGate, GatePass};
pub use switch::AccessSwitch;
pub use tenant::{ActiveWindow, Tenant, TenantRegistry};
