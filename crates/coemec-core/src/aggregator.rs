use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, LocationSource};
use crate::record::{FieldEvent, FieldValue, FormFieldRecord};

/// What gets sent to the backend: every entered field plus the location
/// effective at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub fields: FormFieldRecord,
    pub location: Option<Coordinate>,
}

/// Collects field changes for one form session.
#[derive(Debug, Clone, Default)]
pub struct FormAggregator {
    record: FormFieldRecord,
}

impl FormAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_field_change(&mut self, event: &FieldEvent) {
        let replaced = self.record.apply(event);
        tracing::trace!(
            field = %event.name,
            kind = ?event.kind,
            replaced = replaced.is_some(),
            "form field changed"
        );
    }

    #[must_use]
    pub fn record(&self) -> &FormFieldRecord {
        &self.record
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.record.get(name)
    }

    /// Merge the record with `location`'s effective coordinate.
    #[must_use]
    pub fn build_payload(&self, location: &impl LocationSource) -> SubmissionPayload {
        let payload = SubmissionPayload {
            fields: self.record.clone(),
            location: location.effective_coordinate(),
        };
        match serde_json::to_string(&payload) {
            Ok(json) => tracing::info!(
                fields = payload.fields.len(),
                has_location = payload.location.is_some(),
                payload = %json,
                "submission payload assembled"
            ),
            Err(e) => tracing::warn!(error = %e, "could not render submission payload for logging"),
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::option_key;

    #[test]
    fn payload_without_location_serializes_null() {
        let mut agg = FormAggregator::new();
        agg.on_field_change(&FieldEvent::text("departamento", "Central"));
        let payload = agg.build_payload(&None::<Coordinate>);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "departamento": "Central", "location": null })
        );
    }

    #[test]
    fn payload_merges_fields_with_location_last_write_wins() {
        let mut agg = FormAggregator::new();
        agg.on_field_change(&FieldEvent::text("nombreInstitucion", "Escuela Vieja"));
        agg.on_field_change(&FieldEvent::number("manana", "30"));
        agg.on_field_change(&FieldEvent::text("nombreInstitucion", "Escuela Nueva"));

        let payload = agg.build_payload(&Coordinate::new(-25.2637, -57.5759));
        assert_eq!(payload.location, Some(Coordinate::new(-25.2637, -57.5759)));
        assert_eq!(
            payload.fields.get("nombreInstitucion"),
            Some(&FieldValue::Text("Escuela Nueva".into()))
        );
        assert_eq!(payload.fields.get("manana"), Some(&FieldValue::Number(30.0)));
        assert_eq!(payload.fields.len(), 2);
    }

    #[test]
    fn sibling_checklist_options_do_not_collide() {
        let mut agg = FormAggregator::new();
        for label in ["Agua", "Saneamiento", "Energía eléctrica"] {
            agg.on_field_change(&FieldEvent::checkbox(option_key("necesidad", label), true));
        }
        agg.on_field_change(&FieldEvent::checkbox(option_key("necesidad", "Saneamiento"), false));

        let payload = agg.build_payload(&None::<Coordinate>);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["necesidad_Agua"], serde_json::json!(true));
        assert_eq!(json["necesidad_Saneamiento"], serde_json::json!(false));
        assert_eq!(json["necesidad_Energía eléctrica"], serde_json::json!(true));
    }

    #[test]
    fn building_a_payload_leaves_the_record_untouched() {
        let mut agg = FormAggregator::new();
        agg.on_field_change(&FieldEvent::text("danos", "techo"));
        let _ = agg.build_payload(&Coordinate::new(1.0, 2.0));
        assert_eq!(agg.record().len(), 1);
        assert!(agg.value("location").is_none());
    }
}
