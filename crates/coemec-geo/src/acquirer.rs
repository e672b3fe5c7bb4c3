//! Device location acquisition with manual fallback.
//!
//! Each request is stamped with a generation number. Starting a new request
//! or calling [`LocationAcquirer::cancel`] bumps the generation, so a
//! completion that arrives for an older request is dropped instead of
//! overwriting newer state.

use coemec_core::{
    AppConfig, Coordinate, LocationSource, ManualCoordinateInput, ManualParsePolicy, MapLinks,
    DEFAULT_MAP_ZOOM,
};

use crate::error::{AcquisitionError, PermissionQueryError, PositionError};
use crate::provider::{LocationProvider, PermissionState, PositionOptions};
use crate::state::{Advisory, LocationState};

/// Proof that a request was issued. Hand it back to
/// [`LocationAcquirer::complete`] with the provider's answer.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a request ticket must be completed or it leaves the acquirer loading"]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct LocationAcquirer<P> {
    provider: P,
    options: PositionOptions,
    policy: ManualParsePolicy,
    map_zoom: u8,
    state: LocationState,
    last_fix: Option<Coordinate>,
    generation: u64,
    initialized: bool,
    manual_mode: bool,
    manual: ManualCoordinateInput,
}

impl<P: LocationProvider> LocationAcquirer<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, PositionOptions::default(), ManualParsePolicy::default())
    }

    #[must_use]
    pub fn with_options(provider: P, options: PositionOptions, policy: ManualParsePolicy) -> Self {
        Self {
            provider,
            options,
            policy,
            map_zoom: DEFAULT_MAP_ZOOM,
            state: LocationState::Idle,
            last_fix: None,
            generation: 0,
            initialized: false,
            manual_mode: false,
            manual: ManualCoordinateInput::default(),
        }
    }

    #[must_use]
    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        Self::with_options(
            provider,
            PositionOptions::from_config(config),
            config.manual_coordinate_policy,
        )
        .with_map_zoom(config.map_zoom)
    }

    #[must_use]
    pub fn with_map_zoom(mut self, zoom: u8) -> Self {
        self.map_zoom = zoom;
        self
    }

    /// Session start: check permission and request a fix when allowed.
    ///
    /// Runs once; later calls are no-ops. A `Denied` answer leaves the state
    /// `Idle` until the user retries. If the permission facility is missing
    /// or its query fails, a request is issued directly.
    pub async fn initialize(&mut self) -> &LocationState {
        if self.initialized {
            tracing::debug!("location acquirer already initialized");
            return &self.state;
        }
        self.initialized = true;

        if !self.provider.is_supported() {
            self.fail(AcquisitionError::CapabilityUnsupported);
            return &self.state;
        }

        match self.provider.query_permission().await {
            Ok(PermissionState::Granted | PermissionState::Prompt) => self.request().await,
            Ok(PermissionState::Denied) => {
                tracing::info!("location permission denied; waiting for user retry");
                &self.state
            }
            Err(PermissionQueryError::Unavailable) => {
                tracing::debug!("no permission facility; requesting location directly");
                self.request().await
            }
            Err(err @ PermissionQueryError::Failed(_)) => {
                tracing::warn!(error = %err, "permission query failed; requesting location directly");
                self.request().await
            }
        }
    }

    /// Issue one position request and wait for it.
    ///
    /// This is also the user-triggered retry.
    pub async fn request(&mut self) -> &LocationState {
        let Some(ticket) = self.begin_request() else {
            return &self.state;
        };
        let result = self.provider.request_position(&self.options).await;
        self.complete(ticket, result);
        &self.state
    }

    /// Move to `Loading` and hand out a ticket for the new request.
    ///
    /// Any ticket issued earlier becomes stale. Returns `None` (and fails with
    /// [`AcquisitionError::CapabilityUnsupported`]) when the runtime has no
    /// location capability.
    pub fn begin_request(&mut self) -> Option<RequestTicket> {
        if !self.provider.is_supported() {
            self.fail(AcquisitionError::CapabilityUnsupported);
            return None;
        }
        self.generation += 1;
        self.state = LocationState::Loading;
        tracing::debug!(generation = self.generation, "location request started");
        Some(RequestTicket {
            generation: self.generation,
        })
    }

    /// Apply a provider answer. Returns `false` if the ticket is stale and
    /// the answer was ignored.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<Coordinate, PositionError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "ignoring stale location completion"
            );
            return false;
        }
        match result {
            Ok(coord) => {
                tracing::debug!(lat = coord.lat, lng = coord.lng, "location resolved");
                self.last_fix = Some(coord);
                self.state = LocationState::Resolved(coord);
            }
            Err(err) => {
                tracing::debug!(code = err.code, message = %err.message, "provider reported error");
                self.fail(AcquisitionError::from(err));
            }
        }
        true
    }

    /// Invalidate any outstanding request, e.g. when the form is torn down.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if self.state.is_loading() {
            self.state = LocationState::Idle;
        }
    }

    fn fail(&mut self, err: AcquisitionError) {
        tracing::warn!(error = ?err, message = %err, "location acquisition failed");
        self.state = LocationState::Failed(err);
    }

    #[must_use]
    pub fn state(&self) -> &LocationState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&AcquisitionError> {
        self.state.error()
    }

    /// Most recent successful fix, kept across later failures and retries.
    #[must_use]
    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    #[must_use]
    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn toggle_manual_mode(&mut self) -> bool {
        self.manual_mode = !self.manual_mode;
        tracing::debug!(manual_mode = self.manual_mode, "manual coordinate mode toggled");
        self.manual_mode
    }

    #[must_use]
    pub fn manual_mode(&self) -> bool {
        self.manual_mode
    }

    pub fn set_manual_lat(&mut self, lat: impl Into<String>) {
        self.manual.lat = lat.into();
    }

    pub fn set_manual_lng(&mut self, lng: impl Into<String>) {
        self.manual.lng = lng.into();
    }

    #[must_use]
    pub fn manual_input(&self) -> &ManualCoordinateInput {
        &self.manual
    }

    /// Manual pair when manual mode is on and it resolves under the policy,
    /// otherwise the last device fix, otherwise `None`.
    #[must_use]
    pub fn effective_coordinate(&self) -> Option<Coordinate> {
        if self.manual_mode {
            if let Some(coord) = self.manual.resolve(self.policy) {
                return Some(coord);
            }
        }
        self.last_fix
    }

    /// Search and embed links for the effective coordinate.
    #[must_use]
    pub fn map_links(&self) -> Option<MapLinks> {
        self.effective_coordinate()
            .map(|c| MapLinks::for_coordinate(c, Some(self.map_zoom)))
    }

    /// The notice to show while the last acquisition stands failed.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        self.state.error().map(|err| Advisory {
            message: err.to_string(),
            manual_mode: self.manual_mode,
        })
    }
}

impl<P: LocationProvider> LocationSource for LocationAcquirer<P> {
    fn effective_coordinate(&self) -> Option<Coordinate> {
        LocationAcquirer::effective_coordinate(self)
    }
}
