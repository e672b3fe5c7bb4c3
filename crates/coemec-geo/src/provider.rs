//! The device location capability, injected so tests can swap in a fake.

use std::future::Future;
use std::time::Duration;

use coemec_core::{AppConfig, Coordinate};

use crate::error::{PermissionQueryError, PositionError};

/// Answer from the permission facility for the location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not decided yet; requesting will prompt the user.
    Prompt,
}

/// Options passed with every position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// How old a cached fix may be. Zero forces a fresh reading.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

impl PositionOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            high_accuracy: config.geo_high_accuracy,
            timeout: config.geo_timeout(),
            maximum_age: config.geo_maximum_age(),
        }
    }
}

/// A source of device positions.
///
/// Implementations enforce `options.timeout` themselves and report it as
/// [`PositionError::TIMEOUT`].
pub trait LocationProvider {
    /// Whether the runtime offers a location capability at all.
    fn is_supported(&self) -> bool;

    /// Current permission for the location capability.
    ///
    /// Return [`PermissionQueryError::Unavailable`] when there is no
    /// permission facility to ask.
    fn query_permission(
        &self,
    ) -> impl Future<Output = Result<PermissionState, PermissionQueryError>> + Send;

    /// Issue a single position request.
    fn request_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinate, PositionError>> + Send;
}
