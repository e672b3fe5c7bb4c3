use thiserror::Error;

/// Why an acquisition ended without a coordinate.
///
/// The `Display` text is what the location panel shows the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("Location not supported by this browser.")]
    CapabilityUnsupported,

    #[error("Permission denied. Enable location for this site.")]
    PermissionDenied,

    #[error("Could not determine location (no signal or service).")]
    PositionUnavailable,

    #[error("Location request timed out.")]
    Timeout,

    /// Any provider code outside 1..=3. The code is kept for diagnostics only.
    #[error("Error obtaining location.")]
    Unknown(u16),
}

impl AcquisitionError {
    /// Map a provider error code (1 denied, 2 unavailable, 3 timeout).
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Unknown(other),
        }
    }
}

/// Raw failure reported by a [`crate::LocationProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("position error {code}: {message}")]
pub struct PositionError {
    pub code: u16,
    pub message: String,
}

impl PositionError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<PositionError> for AcquisitionError {
    fn from(err: PositionError) -> Self {
        Self::from_code(err.code)
    }
}

/// The permission facility could not give an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionQueryError {
    #[error("permission query facility is unavailable")]
    Unavailable,

    #[error("permission query failed: {0}")]
    Failed(String),
}
