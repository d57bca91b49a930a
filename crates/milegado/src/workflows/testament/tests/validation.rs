use super::common::*;

use crate::workflows::testament::domain::{AssetCategory, AssetItem, Beneficiary, MaritalStatus};
use crate::workflows::testament::validation::{fields, WillGuard, WillSubmission};

#[test]
fn valid_submission_becomes_typed_content() {
    let content = WillGuard::new()
        .validate(&submission(), today())
        .expect("submission is valid");

    assert_eq!(content.testator.given_names, "Juan");
    assert_eq!(content.testator.marital_status, MaritalStatus::Married);
    assert_eq!(content.testator.birth_date.to_string(), "1970-05-03");
    assert_eq!(content.special_instructions, None);
}

#[test]
fn every_invalid_field_is_reported() {
    let errors = WillGuard::new()
        .validate(
            &WillSubmission {
                given_names: "J".to_string(),
                national_id: "12.345.678-9".to_string(),
                birth_date: "03/05/1970".to_string(),
                marital_status: "conviviente".to_string(),
                address: "Av".to_string(),
                city: "S".to_string(),
                assets: "Casa".to_string(),
                beneficiaries: String::new(),
                ..submission()
            },
            today(),
        )
        .expect_err("submission is invalid");

    assert_eq!(errors.message_for(fields::GIVEN_NAMES), Some("Mínimo 2 caracteres"));
    assert_eq!(errors.message_for(fields::SURNAMES), None);
    assert_eq!(errors.message_for(fields::NATIONAL_ID), Some("RUT inválido"));
    assert_eq!(
        errors.message_for(fields::BIRTH_DATE),
        Some("Fecha de nacimiento inválida")
    );
    assert_eq!(
        errors.message_for(fields::MARITAL_STATUS),
        Some("Selecciona un estado civil válido")
    );
    assert_eq!(errors.message_for(fields::ADDRESS), Some("Dirección muy corta"));
    assert_eq!(errors.message_for(fields::CITY), Some("Ciudad inválida"));
    assert_eq!(
        errors.message_for(fields::ASSETS),
        Some("Describe tus bienes principales")
    );
    assert_eq!(
        errors.message_for(fields::BENEFICIARIES),
        Some("Describe quiénes recibirán tu herencia")
    );
}

#[test]
fn testator_must_be_an_adult_on_the_document_date() {
    let guard = WillGuard::new();
    let turning_eighteen_tomorrow = WillSubmission {
        birth_date: "2008-10-20".to_string(),
        ..submission()
    };
    let errors = guard
        .validate(&turning_eighteen_tomorrow, today())
        .expect_err("still seventeen");
    assert_eq!(
        errors.message_for(fields::BIRTH_DATE),
        Some("Debes ser mayor de 18 años")
    );

    let eighteen_today = WillSubmission {
        birth_date: "2008-10-19".to_string(),
        ..submission()
    };
    assert!(guard.validate(&eighteen_today, today()).is_ok());
}

#[test]
fn blank_special_instructions_are_dropped() {
    let content = WillGuard::new()
        .validate(&with_instructions("  \n  "), today())
        .expect("valid");
    assert_eq!(content.special_instructions, None);

    let content = WillGuard::new()
        .validate(&with_instructions("  Nombro albacea a mi hermana Rosa. "), today())
        .expect("valid");
    assert_eq!(
        content.special_instructions.as_deref(),
        Some("Nombro albacea a mi hermana Rosa.")
    );
}

#[test]
fn structured_lists_fill_blank_free_text() {
    let content = WillGuard::new()
        .validate(
            &WillSubmission {
                assets: String::new(),
                asset_items: asset_items(),
                beneficiaries: String::new(),
                beneficiary_list: vec![child("Ana Pérez", 60.0), sibling("Rosa Pérez", 40.0)],
                ..submission()
            },
            today(),
        )
        .expect("structured lists are valid");

    assert_eq!(
        content.assets,
        "Inmueble: Casa en Ñuñoa (valor estimado $85.000.000)\nVehículo: Toyota Corolla 2019"
    );
    assert_eq!(
        content.beneficiaries,
        "Ana Pérez, RUT 11.111.111-1, hijo(a): 60%\nRosa Pérez, RUT 22.222.222-2, hermano(a): 40%"
    );
    assert_eq!(content.beneficiary_list.len(), 2);
}

#[test]
fn structured_items_are_checked_by_index() {
    let errors = WillGuard::new()
        .validate(
            &WillSubmission {
                asset_items: vec![AssetItem {
                    category: AssetCategory::Other,
                    description: "Reloj".to_string(),
                    estimated_value: Some(-5.0),
                }],
                beneficiary_list: vec![
                    Beneficiary {
                        national_id: "1-1".to_string(),
                        ..child("Ana Pérez", 120.0)
                    },
                ],
                ..submission()
            },
            today(),
        )
        .expect_err("items are invalid");

    assert_eq!(
        errors.message_for("bienes_detalle[0].valor_estimado"),
        Some("El valor estimado debe ser positivo")
    );
    assert_eq!(errors.message_for("beneficiarios_detalle[0].rut"), Some("RUT inválido"));
    assert_eq!(
        errors.message_for("beneficiarios_detalle[0].porcentaje"),
        Some("El porcentaje debe estar entre 0 y 100")
    );
}

#[test]
fn structured_beneficiaries_must_respect_the_legitime() {
    let errors = WillGuard::new()
        .validate(
            &WillSubmission {
                beneficiary_list: vec![child("Ana Pérez", 40.0), sibling("Rosa Pérez", 57.0)],
                ..submission()
            },
            today(),
        )
        .expect_err("distribution is invalid");

    let messages: Vec<&str> = errors
        .errors
        .iter()
        .filter(|error| error.field == fields::BENEFICIARY_LIST)
        .map(|error| error.message.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "La suma de porcentajes debe ser 100%",
            "Los herederos forzosos deben recibir al menos el 50% de la herencia",
        ]
    );
}
