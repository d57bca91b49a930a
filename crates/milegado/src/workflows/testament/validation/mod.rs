mod rut;

pub use rut::is_valid_rut;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{AssetItem, Beneficiary, MaritalStatus, Testator, WillContent};
use super::inheritance::review_distribution;

pub const MINIMUM_AGE: i32 = 18;

/// Wire fields, shared with the persisted schema.
pub mod fields {
    pub const GIVEN_NAMES: &str = "nombre";
    pub const SURNAMES: &str = "apellido";
    pub const NATIONAL_ID: &str = "rut";
    pub const BIRTH_DATE: &str = "fecha_nacimiento";
    pub const MARITAL_STATUS: &str = "estado_civil";
    pub const ADDRESS: &str = "direccion";
    pub const CITY: &str = "ciudad";
    pub const ASSETS: &str = "bienes";
    pub const ASSET_ITEMS: &str = "bienes_detalle";
    pub const BENEFICIARIES: &str = "beneficiarios";
    pub const BENEFICIARY_LIST: &str = "beneficiarios_detalle";
    pub const SPECIAL_INSTRUCTIONS: &str = "instrucciones_especiales";
}

/// Raw wizard payload as posted by the presentation layer.
///
/// Dates and enumerations stay strings here so a bad value becomes a
/// field error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WillSubmission {
    #[serde(rename = "nombre", default)]
    pub given_names: String,
    #[serde(rename = "apellido", default)]
    pub surnames: String,
    #[serde(rename = "rut", default)]
    pub national_id: String,
    #[serde(rename = "fecha_nacimiento", default)]
    pub birth_date: String,
    #[serde(rename = "estado_civil", default)]
    pub marital_status: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "ciudad", default)]
    pub city: String,
    #[serde(rename = "bienes", default)]
    pub assets: String,
    #[serde(rename = "bienes_detalle", default, skip_serializing_if = "Vec::is_empty")]
    pub asset_items: Vec<AssetItem>,
    #[serde(rename = "beneficiarios", default)]
    pub beneficiaries: String,
    #[serde(
        rename = "beneficiarios_detalle",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub beneficiary_list: Vec<Beneficiary>,
    #[serde(
        rename = "instrucciones_especiales",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field-level problem found in a submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors whose field (or list field prefix) is one of `fields`.
    pub fn restricted_to(&self, fields: &[&str]) -> ValidationErrors {
        let errors = self
            .errors
            .iter()
            .filter(|error| fields.iter().any(|field| field_matches(&error.field, field)))
            .cloned()
            .collect();
        ValidationErrors { errors }
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

fn field_matches(error_field: &str, field: &str) -> bool {
    error_field == field
        || error_field
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with('['))
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "invalid submission ({})", rendered.join("; "))
    }
}

/// Converts wizard payloads into typed [`WillContent`] exactly once.
#[derive(Debug, Clone, Default)]
pub struct WillGuard;

impl WillGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        submission: &WillSubmission,
        today: NaiveDate,
    ) -> Result<WillContent, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let given_names = required_text(
            &mut errors,
            fields::GIVEN_NAMES,
            &submission.given_names,
            2,
            "Mínimo 2 caracteres",
        );
        let surnames = required_text(
            &mut errors,
            fields::SURNAMES,
            &submission.surnames,
            2,
            "Mínimo 2 caracteres",
        );

        let national_id = submission.national_id.trim().to_string();
        if !is_valid_rut(&national_id) {
            errors.push(fields::NATIONAL_ID, "RUT inválido");
        }

        let birth_date = match NaiveDate::parse_from_str(submission.birth_date.trim(), "%Y-%m-%d")
        {
            Ok(date) if age_on(date, today) >= MINIMUM_AGE => Some(date),
            Ok(_) => {
                errors.push(fields::BIRTH_DATE, "Debes ser mayor de 18 años");
                None
            }
            Err(_) => {
                errors.push(fields::BIRTH_DATE, "Fecha de nacimiento inválida");
                None
            }
        };

        let marital_status = MaritalStatus::parse(&submission.marital_status);
        if marital_status.is_none() {
            errors.push(fields::MARITAL_STATUS, "Selecciona un estado civil válido");
        }

        let address = required_text(
            &mut errors,
            fields::ADDRESS,
            &submission.address,
            5,
            "Dirección muy corta",
        );
        let city = required_text(
            &mut errors,
            fields::CITY,
            &submission.city,
            2,
            "Ciudad inválida",
        );

        validate_asset_items(&mut errors, &submission.asset_items);
        let assets = text_or_derived(
            &mut errors,
            fields::ASSETS,
            &submission.assets,
            submission.asset_items.iter().map(AssetItem::display_line),
            "Describe tus bienes principales",
        );

        validate_beneficiary_list(&mut errors, &submission.beneficiary_list);
        let beneficiaries = text_or_derived(
            &mut errors,
            fields::BENEFICIARIES,
            &submission.beneficiaries,
            submission
                .beneficiary_list
                .iter()
                .map(Beneficiary::display_line),
            "Describe quiénes recibirán tu herencia",
        );

        let special_instructions = submission
            .special_instructions
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        match (birth_date, marital_status) {
            (Some(birth_date), Some(marital_status)) if errors.is_empty() => Ok(WillContent {
                testator: Testator {
                    given_names,
                    surnames,
                    national_id,
                    birth_date,
                    marital_status,
                    address,
                    city,
                },
                assets,
                beneficiaries,
                special_instructions,
                asset_items: submission.asset_items.clone(),
                beneficiary_list: submission.beneficiary_list.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Completed years between `birth` and `today`; negative for future dates.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
    min_chars: usize,
    message: &str,
) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() < min_chars {
        errors.push(field, message);
    }
    trimmed.to_string()
}

/// Free text wins; a blank text falls back to the structured list, one entry per line.
fn text_or_derived(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
    derived: impl Iterator<Item = String>,
    message: &str,
) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        if trimmed.chars().count() < 10 {
            errors.push(field, message);
        }
        return trimmed.to_string();
    }

    let lines: Vec<String> = derived.collect();
    if lines.is_empty() {
        errors.push(field, message);
    }
    lines.join("\n")
}

fn validate_asset_items(errors: &mut ValidationErrors, items: &[AssetItem]) {
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().chars().count() < 5 {
            errors.push(
                format!("{}[{index}].descripcion", fields::ASSET_ITEMS),
                "La descripción debe tener al menos 5 caracteres",
            );
        }
        if let Some(value) = item.estimated_value {
            if !(value.is_finite() && value > 0.0) {
                errors.push(
                    format!("{}[{index}].valor_estimado", fields::ASSET_ITEMS),
                    "El valor estimado debe ser positivo",
                );
            }
        }
    }
}

fn validate_beneficiary_list(errors: &mut ValidationErrors, beneficiaries: &[Beneficiary]) {
    if beneficiaries.is_empty() {
        return;
    }

    for (index, beneficiary) in beneficiaries.iter().enumerate() {
        let prefix = format!("{}[{index}]", fields::BENEFICIARY_LIST);
        if beneficiary.name.trim().chars().count() < 2 {
            errors.push(format!("{prefix}.nombre"), "Mínimo 2 caracteres");
        }
        if !is_valid_rut(&beneficiary.national_id) {
            errors.push(format!("{prefix}.rut"), "RUT inválido");
        }
        if !(0.0..=100.0).contains(&beneficiary.percentage) {
            errors.push(
                format!("{prefix}.porcentaje"),
                "El porcentaje debe estar entre 0 y 100",
            );
        }
    }

    for violation in review_distribution(beneficiaries).violations {
        errors.push(fields::BENEFICIARY_LIST, violation.to_string());
    }
}
