//! Typed view of the adverse-event survey.
//!
//! [`FormDraft`] has one field per input on the form. Checklist groups are
//! sets of enum tags instead of one boolean key per option, and every
//! incoming [`FieldEvent`] is matched against a known field so a typo in a
//! name is an error rather than a silently ignored key.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{FieldEvent, FieldValue, FileHandle, FormFieldRecord, InputKind};
use crate::FormError;

/// A checklist group on the form: a fixed set of labelled options stored
/// under `"{PREFIX}_{label}"` keys.
pub trait ChecklistOption: Sized + Copy + Ord + 'static {
    const PREFIX: &'static str;
    const ALL: &'static [Self];

    fn as_label(self) -> &'static str;

    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.as_label() == label)
    }

    #[must_use]
    fn key(self) -> String {
        crate::record::option_key(Self::PREFIX, self.as_label())
    }
}

macro_rules! checklist {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl ChecklistOption for $name {
            const PREFIX: &'static str = $prefix;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_label())
            }
        }
    };
}

checklist!(
    /// School levels served by the institution.
    EducationLevel, "turno", {
        Inicial => "Inicial",
        Basica => "Básica",
        Media => "Media",
        Permanente => "Permanente",
        Inclusiva => "Inclusiva",
    }
);

checklist!(
    /// Alternative spaces available for relocating classes.
    RelocationSpace, "espacio", {
        Classrooms => "Escuelas/aulas",
        CommunityCentre => "Centro Comunitario",
        ReligiousVenue => "Locales religiosos",
        Shed => "Tinglado",
        Other => "Otras",
    }
);

checklist!(
    /// Basic services the institution needs restored.
    Need, "necesidad", {
        Water => "Agua",
        Sanitation => "Saneamiento",
        Electricity => "Energía eléctrica",
        Internet => "Conexión a internet",
        Telephone => "Conexión telefónica",
    }
);

checklist!(
    /// Student services offered at the institution.
    Service, "servicio", {
        Snack => "Merienda Escolar",
        Lunch => "Almuerzo Escolar",
        SchoolKit => "Kit Escolar",
        StudentTicket => "Boleto Estudiantil",
        PsychosocialSupport => "Apoyo Psicosocial",
    }
);

/// Alert colour chosen with the `tipoAlerta` radio group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    #[serde(rename = "Amarillo")]
    Yellow,
    #[serde(rename = "Naranja")]
    Orange,
    #[serde(rename = "Rojo")]
    Red,
}

impl AlertLevel {
    #[must_use]
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Yellow => "Amarillo",
            Self::Orange => "Naranja",
            Self::Red => "Rojo",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Amarillo" => Some(Self::Yellow),
            "Naranja" => Some(Self::Orange),
            "Rojo" => Some(Self::Red),
            _ => None,
        }
    }
}

/// Head counts per shift. `None` means the box was left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub morning: Option<u32>,
    pub afternoon: Option<u32>,
    pub night: Option<u32>,
    pub extended_day: Option<u32>,
}

/// Names of the inputs marked `required` on the form.
pub const REQUIRED_FIELDS: &[&str] = &[
    "fechaEvento",
    "nombreInstitucion",
    "departamento",
    "localidad",
    "codigoInstitucion",
    "nombreDirector",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    pub event_date: Option<NaiveDate>,
    pub institution_name: String,
    pub department: String,
    pub locality: String,
    pub institution_code: String,
    pub director_name: String,
    pub director_contact: String,
    pub enrollment: Enrollment,
    pub levels: BTreeSet<EducationLevel>,
    pub event_type: String,
    pub relocation_spaces: BTreeSet<RelocationSpace>,
    pub needs: BTreeSet<Need>,
    pub other_needs: String,
    pub damage: String,
    pub alert: Option<AlertLevel>,
    pub services: BTreeSet<Service>,
    pub observation: String,
    /// The form labels this "max. 3" but nothing enforces it.
    pub attachments: Vec<FileHandle>,
    pub images: Vec<FileHandle>,
}

impl FormDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one change event into the draft.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for names the form does not have,
    /// [`FormError::UnknownOption`] for checklist or radio labels outside the
    /// fixed option set, and [`FormError::InvalidValue`] for dates and counts
    /// that do not parse.
    pub fn apply(&mut self, event: &FieldEvent) -> Result<(), FormError> {
        let value = FieldValue::coerce(event);
        self.set(&event.name, event.kind, &value)
    }

    /// Build a draft from an open record, rejecting any key it cannot place.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] hit while placing a record entry.
    pub fn from_record(record: &FormFieldRecord) -> Result<Self, FormError> {
        let mut draft = Self::new();
        for (name, value) in record.iter() {
            draft.set(name, kind_of(value), value)?;
        }
        Ok(draft)
    }

    /// Required inputs that are still empty, in form order.
    ///
    /// Mirrors the browser's `required` check: only an empty value counts
    /// as missing, so whitespace satisfies it.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let empty = str::is_empty;
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| match *field {
                "fechaEvento" => self.event_date.is_none(),
                "nombreInstitucion" => empty(&self.institution_name),
                "departamento" => empty(&self.department),
                "localidad" => empty(&self.locality),
                "codigoInstitucion" => empty(&self.institution_code),
                "nombreDirector" => empty(&self.director_name),
                _ => false,
            })
            .collect()
    }

    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.missing_required().is_empty()
    }

    fn set(&mut self, name: &str, kind: InputKind, value: &FieldValue) -> Result<(), FormError> {
        match name {
            "fechaEvento" => self.event_date = parse_date(name, value)?,
            "nombreInstitucion" => self.institution_name = text(name, value)?,
            "departamento" => self.department = text(name, value)?,
            "localidad" => self.locality = text(name, value)?,
            "codigoInstitucion" => self.institution_code = text(name, value)?,
            "nombreDirector" => self.director_name = text(name, value)?,
            "contactoDirector" => self.director_contact = text(name, value)?,
            "manana" => self.enrollment.morning = count(name, value)?,
            "tarde" => self.enrollment.afternoon = count(name, value)?,
            "noche" => self.enrollment.night = count(name, value)?,
            "jornadaExtendida" => self.enrollment.extended_day = count(name, value)?,
            "tipoEvento" => self.event_type = text(name, value)?,
            "otrasNecesidades" => self.other_needs = text(name, value)?,
            "danos" => self.damage = text(name, value)?,
            "observacion" => self.observation = text(name, value)?,
            "tipoAlerta" => self.alert = alert(name, value)?,
            "archivos" => self.attachments = files(name, value)?,
            "imagenes" => self.images = files(name, value)?,
            _ => return self.set_option(name, kind, value),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, kind: InputKind, value: &FieldValue) -> Result<(), FormError> {
        let Some((prefix, label)) = name.split_once('_') else {
            return Err(FormError::UnknownField(name.to_string()));
        };
        let known = [
            EducationLevel::PREFIX,
            RelocationSpace::PREFIX,
            Need::PREFIX,
            Service::PREFIX,
        ];
        if !known.contains(&prefix) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        if kind != InputKind::Checkbox {
            return Err(invalid(name, "checklist options take checkbox input"));
        }

        let checked = value.as_bool().unwrap_or(false);
        if prefix == EducationLevel::PREFIX {
            toggle(&mut self.levels, label, checked)
        } else if prefix == RelocationSpace::PREFIX {
            toggle(&mut self.relocation_spaces, label, checked)
        } else if prefix == Need::PREFIX {
            toggle(&mut self.needs, label, checked)
        } else {
            toggle(&mut self.services, label, checked)
        }
    }
}

fn toggle<T: ChecklistOption>(
    set: &mut BTreeSet<T>,
    label: &str,
    checked: bool,
) -> Result<(), FormError> {
    let option = T::from_label(label).ok_or_else(|| FormError::UnknownOption {
        group: T::PREFIX,
        label: label.to_string(),
    })?;
    if checked {
        set.insert(option);
    } else {
        set.remove(&option);
    }
    Ok(())
}

fn kind_of(value: &FieldValue) -> InputKind {
    match value {
        FieldValue::Bool(_) => InputKind::Checkbox,
        FieldValue::Number(_) | FieldValue::Empty => InputKind::Number,
        FieldValue::Files(_) => InputKind::File,
        FieldValue::Text(_) => InputKind::Text,
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> FormError {
    FormError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn text(field: &str, value: &FieldValue) -> Result<String, FormError> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| invalid(field, "expected text"))
}

fn parse_date(field: &str, value: &FieldValue) -> Result<Option<NaiveDate>, FormError> {
    let raw = text(field, value)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| invalid(field, format!("'{raw}' is not a YYYY-MM-DD date: {e}")))
}

/// A cleared count arrives as `Empty` from a live event, or as `Text("")`
/// once a record has been through JSON.
fn count(field: &str, value: &FieldValue) -> Result<Option<u32>, FormError> {
    match value {
        FieldValue::Empty => Ok(None),
        FieldValue::Text(s) if s.is_empty() => Ok(None),
        FieldValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = *n as u32;
            Ok(Some(whole))
        }
        FieldValue::Number(n) => Err(invalid(field, format!("{n} is not a whole, non-negative count"))),
        _ => Err(invalid(field, "expected a number")),
    }
}

fn alert(field: &str, value: &FieldValue) -> Result<Option<AlertLevel>, FormError> {
    let raw = text(field, value)?;
    if raw.is_empty() {
        return Ok(None);
    }
    AlertLevel::from_label(&raw)
        .map(Some)
        .ok_or(FormError::UnknownOption {
            group: "tipoAlerta",
            label: raw,
        })
}

fn files(field: &str, value: &FieldValue) -> Result<Vec<FileHandle>, FormError> {
    match value {
        FieldValue::Files(files) => Ok(files.clone()),
        _ => Err(invalid(field, "expected a file selection")),
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
