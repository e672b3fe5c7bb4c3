use coemec_core::Coordinate;

use crate::error::AcquisitionError;

/// Where the device acquisition currently stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LocationState {
    /// Nothing requested yet (also where a denied permission leaves us).
    #[default]
    Idle,
    Loading,
    Resolved(Coordinate),
    Failed(AcquisitionError),
}

impl LocationState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved(c) => Some(*c),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&AcquisitionError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Inline notice shown when acquisition failed. It always offers retry and
/// the manual-entry toggle; `manual_mode` tells which way the toggle reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub message: String,
    pub manual_mode: bool,
}
