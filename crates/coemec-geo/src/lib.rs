//! Location acquisition for the field survey form.
//!
//! [`LocationAcquirer`] drives an injected [`LocationProvider`] through
//! permission check, request and result mapping, and falls back to
//! user-typed coordinates when manual mode is on.

pub mod acquirer;
pub mod error;
pub mod provider;
pub mod state;

pub use acquirer::{LocationAcquirer, RequestTicket};
pub use error::{AcquisitionError, PermissionQueryError, PositionError};
pub use provider::{LocationProvider, PermissionState, PositionOptions};
pub use state::{Advisory, LocationState};
