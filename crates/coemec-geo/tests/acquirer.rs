//! Acquisition flow tests against a scripted in-memory provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use coemec_core::{Coordinate, FieldEvent, FieldValue, FormAggregator, ManualParsePolicy};
use coemec_geo::{
    AcquisitionError, LocationAcquirer, LocationProvider, LocationState, PermissionQueryError,
    PermissionState, PositionError, PositionOptions,
};

struct FakeProvider {
    supported: bool,
    permission: Result<PermissionState, PermissionQueryError>,
    responses: Mutex<VecDeque<Result<Coordinate, PositionError>>>,
    requests: AtomicUsize,
    seen_options: Mutex<Vec<PositionOptions>>,
}

impl FakeProvider {
    fn new(permission: Result<PermissionState, PermissionQueryError>) -> Self {
        Self {
            supported: true,
            permission,
            responses: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
            seen_options: Mutex::new(Vec::new()),
        }
    }

    fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Ok(PermissionState::Granted))
        }
    }

    fn then(self, response: Result<Coordinate, PositionError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl LocationProvider for FakeProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn query_permission(&self) -> Result<PermissionState, PermissionQueryError> {
        self.permission.clone()
    }

    async fn request_position(&self, options: &PositionOptions) -> Result<Coordinate, PositionError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.seen_options.lock().unwrap().push(*options);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PositionError::new(2, "no scripted response")))
    }
}

fn asuncion() -> Coordinate {
    Coordinate::new(-25.2637, -57.5759)
}

#[tokio::test]
async fn granted_permission_requests_and_resolves() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);

    let state = acquirer.initialize().await.clone();

    assert_eq!(state, LocationState::Resolved(asuncion()));
    assert_eq!(acquirer.provider().request_count(), 1);
    assert_eq!(acquirer.effective_coordinate(), Some(asuncion()));
    assert!(acquirer.advisory().is_none());
}

#[tokio::test]
async fn request_uses_fresh_high_accuracy_options() {
    let provider = FakeProvider::new(Ok(PermissionState::Prompt)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    let seen = acquirer.provider().seen_options.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].high_accuracy);
    assert_eq!(seen[0].timeout, Duration::from_secs(10));
    assert_eq!(seen[0].maximum_age, Duration::ZERO);
}

#[tokio::test]
async fn denied_permission_stays_idle_without_requesting() {
    let provider = FakeProvider::new(Ok(PermissionState::Denied));
    let mut acquirer = LocationAcquirer::new(provider);

    let state = acquirer.initialize().await.clone();

    assert_eq!(state, LocationState::Idle);
    assert_eq!(acquirer.provider().request_count(), 0);
    assert_eq!(acquirer.effective_coordinate(), None);
}

#[tokio::test]
async fn missing_permission_facility_requests_directly() {
    let provider =
        FakeProvider::new(Err(PermissionQueryError::Unavailable)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;

    assert_eq!(acquirer.provider().request_count(), 1);
    assert_eq!(acquirer.state().coordinate(), Some(asuncion()));
}

#[tokio::test]
async fn failed_permission_query_requests_directly() {
    let provider = FakeProvider::new(Err(PermissionQueryError::Failed("boom".into())))
        .then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;

    assert_eq!(acquirer.provider().request_count(), 1);
}

#[tokio::test]
async fn unsupported_runtime_fails_immediately() {
    let mut acquirer = LocationAcquirer::new(FakeProvider::unsupported());

    let state = acquirer.initialize().await.clone();

    assert_eq!(
        state,
        LocationState::Failed(AcquisitionError::CapabilityUnsupported)
    );
    assert_eq!(acquirer.provider().request_count(), 0);

    acquirer.request().await;
    assert_eq!(acquirer.provider().request_count(), 0);
    assert_eq!(acquirer.error(), Some(&AcquisitionError::CapabilityUnsupported));
}

#[tokio::test]
async fn initialize_runs_only_once() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted))
        .then(Ok(asuncion()))
        .then(Ok(Coordinate::new(0.0, 0.0)));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;
    acquirer.initialize().await;

    assert_eq!(acquirer.provider().request_count(), 1);
    assert_eq!(acquirer.effective_coordinate(), Some(asuncion()));
}

#[tokio::test]
async fn each_error_code_maps_to_its_message() {
    let cases = [
        (1, "Permission denied. Enable location for this site."),
        (2, "Could not determine location (no signal or service)."),
        (3, "Location request timed out."),
        (7, "Error obtaining location."),
    ];
    for (code, message) in cases {
        let provider = FakeProvider::new(Ok(PermissionState::Granted))
            .then(Err(PositionError::new(code, "provider text")));
        let mut acquirer = LocationAcquirer::new(provider);
        acquirer.initialize().await;

        let advisory = acquirer.advisory().expect("failure should produce an advisory");
        assert_eq!(advisory.message, message, "code {code}");
        assert!(!advisory.manual_mode);
        assert!(!acquirer.is_loading());
    }
}

#[tokio::test]
async fn retry_after_failure_resolves() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted))
        .then(Err(PositionError::new(PositionError::TIMEOUT, "slow")))
        .then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;
    assert_eq!(acquirer.error(), Some(&AcquisitionError::Timeout));

    acquirer.request().await;
    assert_eq!(acquirer.error(), None);
    assert_eq!(acquirer.state(), &LocationState::Resolved(asuncion()));
    assert_eq!(acquirer.provider().request_count(), 2);
}

#[tokio::test]
async fn later_failure_keeps_last_fix_as_effective() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted))
        .then(Ok(asuncion()))
        .then(Err(PositionError::new(2, "tunnel")));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;
    acquirer.request().await;

    assert_eq!(acquirer.error(), Some(&AcquisitionError::PositionUnavailable));
    assert_eq!(acquirer.last_fix(), Some(asuncion()));
    assert_eq!(acquirer.effective_coordinate(), Some(asuncion()));
}

#[tokio::test]
async fn denied_user_switches_to_manual_entry() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted))
        .then(Err(PositionError::new(PositionError::PERMISSION_DENIED, "denied")));
    let mut acquirer = LocationAcquirer::new(provider);

    acquirer.initialize().await;
    assert_eq!(
        acquirer.state(),
        &LocationState::Failed(AcquisitionError::PermissionDenied)
    );

    assert!(acquirer.toggle_manual_mode());
    acquirer.set_manual_lat("-25.29");
    acquirer.set_manual_lng("-57.63");

    assert_eq!(
        acquirer.effective_coordinate(),
        Some(Coordinate::new(-25.29, -57.63))
    );
    assert!(acquirer.advisory().unwrap().manual_mode);
}

#[tokio::test]
async fn complete_manual_pair_beats_device_fix() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    acquirer.toggle_manual_mode();
    acquirer.set_manual_lat("-27.33");
    acquirer.set_manual_lng("-55.86");
    assert_eq!(
        acquirer.effective_coordinate(),
        Some(Coordinate::new(-27.33, -55.86))
    );

    acquirer.toggle_manual_mode();
    assert_eq!(acquirer.effective_coordinate(), Some(asuncion()));
}

#[tokio::test]
async fn incomplete_manual_pair_without_fix_is_none() {
    let provider = FakeProvider::new(Ok(PermissionState::Denied));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    acquirer.toggle_manual_mode();
    acquirer.set_manual_lat("-25.29");

    assert_eq!(acquirer.effective_coordinate(), None);
    assert!(acquirer.map_links().is_none());
}

#[tokio::test]
async fn strict_policy_ignores_non_numeric_manual_text() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    acquirer.toggle_manual_mode();
    acquirer.set_manual_lat("abc");
    acquirer.set_manual_lng("-57.63");

    assert_eq!(acquirer.effective_coordinate(), Some(asuncion()));
}

#[tokio::test]
async fn lenient_policy_passes_nan_through() {
    let provider = FakeProvider::new(Ok(PermissionState::Denied));
    let mut acquirer = LocationAcquirer::with_options(
        provider,
        PositionOptions::default(),
        ManualParsePolicy::Lenient,
    );
    acquirer.initialize().await;

    acquirer.toggle_manual_mode();
    acquirer.set_manual_lat("abc");
    acquirer.set_manual_lng("-57.63");

    let coord = acquirer.effective_coordinate().expect("lenient always resolves");
    assert!(coord.lat.is_nan());
    assert!(acquirer.map_links().unwrap().search.contains("NaN"));
}

#[tokio::test]
async fn map_links_follow_effective_coordinate() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted)).then(Ok(asuncion()));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    let links = acquirer.map_links().expect("resolved fix has links");
    assert_eq!(
        links.search,
        "https://www.google.com/maps/search/?api=1&query=-25.263700,-57.575900"
    );
    assert_eq!(
        links.embed,
        "https://www.google.com/maps?q=-25.263700,-57.575900&z=16&output=embed"
    );

    let mut zoomed = LocationAcquirer::new(
        FakeProvider::new(Ok(PermissionState::Granted)).then(Ok(asuncion())),
    )
    .with_map_zoom(12);
    zoomed.initialize().await;
    assert!(zoomed.map_links().unwrap().embed.contains("&z=12&"));
}

#[test]
fn stale_completion_is_ignored() {
    let mut acquirer = LocationAcquirer::new(FakeProvider::new(Ok(PermissionState::Granted)));

    let first = acquirer.begin_request().expect("supported");
    let second = acquirer.begin_request().expect("supported");
    assert!(second.generation() > first.generation());

    assert!(acquirer.complete(second, Ok(asuncion())));
    assert!(!acquirer.complete(first, Err(PositionError::new(3, "late timeout"))));

    assert_eq!(acquirer.state(), &LocationState::Resolved(asuncion()));
}

#[test]
fn late_completion_after_cancel_is_ignored() {
    let mut acquirer = LocationAcquirer::new(FakeProvider::new(Ok(PermissionState::Granted)));

    let ticket = acquirer.begin_request().expect("supported");
    assert!(acquirer.is_loading());

    acquirer.cancel();
    assert_eq!(acquirer.state(), &LocationState::Idle);

    assert!(!acquirer.complete(ticket, Ok(asuncion())));
    assert_eq!(acquirer.state(), &LocationState::Idle);
    assert_eq!(acquirer.effective_coordinate(), None);
}

#[test]
fn begin_request_clears_previous_error() {
    let mut acquirer = LocationAcquirer::new(FakeProvider::new(Ok(PermissionState::Granted)));
    let ticket = acquirer.begin_request().unwrap();
    acquirer.complete(ticket, Err(PositionError::new(1, "denied")));
    assert!(acquirer.advisory().is_some());

    let _retry = acquirer.begin_request().unwrap();
    assert!(acquirer.is_loading());
    assert!(acquirer.error().is_none());
    assert!(acquirer.advisory().is_none());
}

#[tokio::test]
async fn payload_carries_device_fix_and_fields() {
    let provider = FakeProvider::new(Ok(PermissionState::Granted))
        .then(Ok(Coordinate::new(-25.2637, -57.5759)));
    let mut acquirer = LocationAcquirer::new(provider);
    acquirer.initialize().await;

    let mut form = FormAggregator::new();
    form.on_field_change(&FieldEvent::text("nombreInstitucion", "Escuela A"));
    form.on_field_change(&FieldEvent::number("manana", "40"));
    form.on_field_change(&FieldEvent::text("nombreInstitucion", "Escuela B"));
    form.on_field_change(&FieldEvent::checkbox("servicio_Kit Escolar", true));
    form.on_field_change(&FieldEvent::checkbox("servicio_Merienda Escolar", true));

    let payload = form.build_payload(&acquirer);

    assert_eq!(payload.location, Some(Coordinate::new(-25.2637, -57.5759)));
    assert_eq!(
        payload.fields.get("nombreInstitucion"),
        Some(&FieldValue::Text("Escuela B".into()))
    );
    assert_eq!(payload.fields.get("manana"), Some(&FieldValue::Number(40.0)));
    assert_eq!(
        payload.fields.get("servicio_Kit Escolar"),
        Some(&FieldValue::Bool(true))
    );
    assert_eq!(
        payload.fields.get("servicio_Merienda Escolar"),
        Some(&FieldValue::Bool(true))
    );

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        json["location"],
        serde_json::json!({ "lat": -25.2637, "lng": -57.5759 })
    );
}
