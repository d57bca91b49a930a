//! CSV intake for structured beneficiary and asset lists.

use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

use super::domain::{AssetCategory, AssetItem, Beneficiary, Relationship};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownValue {
        line: u64,
        column: &'static str,
        value: String,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read CSV file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::UnknownValue {
                line,
                column,
                value,
            } => write!(f, "line {line}: unknown {column} value '{value}'"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::UnknownValue { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn line_of(reader: &csv::Reader<impl Read>) -> u64 {
    reader.position().line()
}

#[derive(Debug, Deserialize)]
struct BeneficiaryRow {
    nombre: String,
    rut: String,
    relacion: String,
    porcentaje: f64,
    #[serde(default, deserialize_with = "optional_flag")]
    heredero_forzoso: Option<bool>,
}

/// Reads `nombre,rut,relacion,porcentaje[,heredero_forzoso]`.
pub struct BeneficiaryCsvImporter;

impl BeneficiaryCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Beneficiary>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Beneficiary>, ImportError> {
        let mut reader = csv_reader(reader);
        let mut beneficiaries = Vec::new();
        let mut rows = reader.deserialize::<BeneficiaryRow>();

        while let Some(row) = rows.next() {
            let row = row?;
            let relationship =
                Relationship::parse(&row.relacion).ok_or_else(|| ImportError::UnknownValue {
                    line: line_of(rows.reader()),
                    column: "relacion",
                    value: row.relacion.clone(),
                })?;

            beneficiaries.push(Beneficiary {
                name: row.nombre,
                national_id: row.rut,
                relationship,
                percentage: row.porcentaje,
                forced_heir: row
                    .heredero_forzoso
                    .unwrap_or_else(|| relationship.forced_heir_by_default()),
            });
        }

        Ok(beneficiaries)
    }
}

#[derive(Debug, Deserialize)]
struct AssetRow {
    tipo: String,
    descripcion: String,
    #[serde(default)]
    valor_estimado: Option<f64>,
}

/// Reads `tipo,descripcion[,valor_estimado]`.
pub struct AssetCsvImporter;

impl AssetCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AssetItem>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AssetItem>, ImportError> {
        let mut reader = csv_reader(reader);
        let mut items = Vec::new();
        let mut rows = reader.deserialize::<AssetRow>();

        while let Some(row) = rows.next() {
            let row = row?;
            let category =
                AssetCategory::parse(&row.tipo).ok_or_else(|| ImportError::UnknownValue {
                    line: line_of(rows.reader()),
                    column: "tipo",
                    value: row.tipo.clone(),
                })?;

            items.push(AssetItem {
                category,
                description: row.descripcion,
                estimated_value: row.valor_estimado,
            });
        }

        Ok(items)
    }
}

fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim).map(str::to_ascii_lowercase) {
        None => Ok(None),
        Some(value) => match value.as_str() {
            "" => Ok(None),
            "true" | "si" | "sí" | "1" | "yes" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "heredero_forzoso must be true/false, got '{other}'"
            ))),
        },
    }
}
