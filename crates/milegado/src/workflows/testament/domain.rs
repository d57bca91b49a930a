use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "soltero")]
    Single,
    #[serde(rename = "casado")]
    Married,
    #[serde(rename = "viudo")]
    Widowed,
    #[serde(rename = "divorciado")]
    Divorced,
}

impl MaritalStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Single, Self::Married, Self::Widowed, Self::Divorced]
    }

    /// Wire value, also the word interpolated into the identification clause.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "soltero",
            Self::Married => "casado",
            Self::Widowed => "viudo",
            Self::Divorced => "divorciado",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal identity of the person granting the will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testator {
    #[serde(rename = "nombre")]
    pub given_names: String,
    #[serde(rename = "apellido")]
    pub surnames: String,
    #[serde(rename = "rut")]
    pub national_id: String,
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: NaiveDate,
    #[serde(rename = "estado_civil")]
    pub marital_status: MaritalStatus,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "ciudad")]
    pub city: String,
}

impl Testator {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_names, self.surnames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    #[serde(rename = "inmueble")]
    RealEstate,
    #[serde(rename = "vehiculo")]
    Vehicle,
    #[serde(rename = "cuenta_bancaria")]
    BankAccount,
    #[serde(rename = "otro")]
    Other,
}

impl AssetCategory {
    pub const fn ordered() -> [Self; 4] {
        [Self::RealEstate, Self::Vehicle, Self::BankAccount, Self::Other]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RealEstate => "inmueble",
            Self::Vehicle => "vehiculo",
            Self::BankAccount => "cuenta_bancaria",
            Self::Other => "otro",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RealEstate => "Inmueble",
            Self::Vehicle => "Vehículo",
            Self::BankAccount => "Cuenta bancaria",
            Self::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetItem {
    #[serde(rename = "tipo")]
    pub category: AssetCategory,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "valor_estimado", default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
}

impl AssetItem {
    /// One line of the asset declaration, e.g. `Inmueble: Casa en Ñuñoa (valor estimado $85.000.000)`.
    pub fn display_line(&self) -> String {
        match self.estimated_value {
            Some(value) => format!(
                "{}: {} (valor estimado ${})",
                self.category.label(),
                self.description.trim(),
                super::format::thousands(value.round() as u64)
            ),
            None => format!("{}: {}", self.category.label(), self.description.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "hijo")]
    Child,
    #[serde(rename = "conyuge")]
    Spouse,
    #[serde(rename = "padre")]
    Parent,
    #[serde(rename = "hermano")]
    Sibling,
    #[serde(rename = "otro")]
    Other,
}

impl Relationship {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Child,
            Self::Spouse,
            Self::Parent,
            Self::Sibling,
            Self::Other,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Child => "hijo",
            Self::Spouse => "conyuge",
            Self::Parent => "padre",
            Self::Sibling => "hermano",
            Self::Other => "otro",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|relationship| relationship.as_str() == normalized)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Child => "hijo(a)",
            Self::Spouse => "cónyuge",
            Self::Parent => "padre/madre",
            Self::Sibling => "hermano(a)",
            Self::Other => "otro",
        }
    }

    /// Children and spouse are forced heirs unless the caller says otherwise.
    pub const fn forced_heir_by_default(self) -> bool {
        matches!(self, Self::Child | Self::Spouse)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BeneficiaryWire")]
pub struct Beneficiary {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "rut")]
    pub national_id: String,
    #[serde(rename = "relacion")]
    pub relationship: Relationship,
    #[serde(rename = "porcentaje")]
    pub percentage: f64,
    #[serde(rename = "heredero_forzoso")]
    pub forced_heir: bool,
}

/// Incoming shape: the forced-heir flag may be omitted.
#[derive(Deserialize)]
struct BeneficiaryWire {
    nombre: String,
    rut: String,
    relacion: Relationship,
    porcentaje: f64,
    #[serde(default)]
    heredero_forzoso: Option<bool>,
}

impl From<BeneficiaryWire> for Beneficiary {
    fn from(wire: BeneficiaryWire) -> Self {
        Self {
            name: wire.nombre,
            national_id: wire.rut,
            relationship: wire.relacion,
            percentage: wire.porcentaje,
            forced_heir: wire
                .heredero_forzoso
                .unwrap_or_else(|| wire.relacion.forced_heir_by_default()),
        }
    }
}

impl Beneficiary {
    pub fn new(
        name: impl Into<String>,
        national_id: impl Into<String>,
        relationship: Relationship,
        percentage: f64,
    ) -> Self {
        Self {
            name: name.into(),
            national_id: national_id.into(),
            relationship,
            percentage,
            forced_heir: relationship.forced_heir_by_default(),
        }
    }

    pub fn display_line(&self) -> String {
        format!(
            "{}, RUT {}, {}: {}%",
            self.name.trim(),
            self.national_id.trim(),
            self.relationship.label(),
            super::format::percentage(self.percentage)
        )
    }
}

/// Typed body of a will after boundary validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillContent {
    pub testator: Testator,
    pub assets: String,
    pub beneficiaries: String,
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_items: Vec<AssetItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beneficiary_list: Vec<Beneficiary>,
}

impl WillContent {
    pub fn document(&self, generated_on: NaiveDate) -> WillDocument {
        WillDocument {
            testator: self.testator.clone(),
            assets: self.assets.clone(),
            beneficiaries: self.beneficiaries.clone(),
            special_instructions: self.special_instructions.clone(),
            generated_on,
        }
    }

    pub fn new_record(&self, owner_id: OwnerId) -> NewWillRecord {
        NewWillRecord {
            owner_id,
            testator: self.testator.clone(),
            assets: self.assets.clone(),
            beneficiaries: self.beneficiaries.clone(),
            special_instructions: self.special_instructions.clone(),
        }
    }

    pub fn changes(&self) -> WillRecordChanges {
        WillRecordChanges {
            testator: self.testator.clone(),
            assets: self.assets.clone(),
            beneficiaries: self.beneficiaries.clone(),
            special_instructions: self.special_instructions.clone(),
        }
    }
}

/// Input of the document composer: one private copy per generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillDocument {
    pub testator: Testator,
    pub assets: String,
    pub beneficiaries: String,
    pub special_instructions: Option<String>,
    pub generated_on: NaiveDate,
}

impl WillDocument {
    /// Blank special instructions count as absent.
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Row of the `testamentos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillRecord {
    pub id: RecordId,
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub testator: Testator,
    #[serde(rename = "bienes")]
    pub assets: String,
    #[serde(rename = "beneficiarios")]
    pub beneficiaries: String,
    #[serde(rename = "instrucciones_especiales", default)]
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WillRecord {
    pub fn document(&self, generated_on: NaiveDate) -> WillDocument {
        WillDocument {
            testator: self.testator.clone(),
            assets: self.assets.clone(),
            beneficiaries: self.beneficiaries.clone(),
            special_instructions: self.special_instructions.clone(),
            generated_on,
        }
    }
}

/// Insert payload; the gateway assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWillRecord {
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub testator: Testator,
    #[serde(rename = "bienes")]
    pub assets: String,
    #[serde(rename = "beneficiarios")]
    pub beneficiaries: String,
    #[serde(rename = "instrucciones_especiales")]
    pub special_instructions: Option<String>,
}

/// Edit-and-resubmit payload. Ownership and creation time never change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WillRecordChanges {
    #[serde(flatten)]
    pub testator: Testator,
    #[serde(rename = "bienes")]
    pub assets: String,
    #[serde(rename = "beneficiarios")]
    pub beneficiaries: String,
    #[serde(rename = "instrucciones_especiales")]
    pub special_instructions: Option<String>,
}

impl WillRecordChanges {
    pub fn apply_to(self, record: &mut WillRecord, updated_at: DateTime<Utc>) {
        record.testator = self.testator;
        record.assets = self.assets;
        record.beneficiaries = self.beneficiaries;
        record.special_instructions = self.special_instructions;
        record.updated_at = updated_at;
    }
}
