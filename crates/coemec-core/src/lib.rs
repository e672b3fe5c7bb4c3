pub mod aggregator;
pub mod app_config;
pub mod config;
pub mod form;
pub mod geo;
pub mod manual;
pub mod record;

use thiserror::Error;

pub use aggregator::{FormAggregator, SubmissionPayload};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use form::{
    AlertLevel, ChecklistOption, EducationLevel, Enrollment, FormDraft, Need, RelocationSpace,
    Service,
};
pub use geo::{embed_url, maps_url, Coordinate, LocationSource, MapLinks, DEFAULT_MAP_ZOOM};
pub use manual::{ManualCoordinateInput, ManualParsePolicy};
pub use record::{FieldEvent, FieldValue, FileHandle, FormFieldRecord, InputKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while folding field events into a typed [`FormDraft`].
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("unknown option '{label}' for checklist '{group}'")]
    UnknownOption { group: &'static str, label: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
