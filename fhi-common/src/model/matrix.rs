//! Sparse condition × member tables
//!
//! A missing cell means "not recorded". An explicit `false` is a recorded
//! negative answer and is kept distinct from absence.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::member::MemberRole;

/// Value held in one matrix cell
///
/// Almost always a yes/no flag; free-text and numeric annotations are kept
/// for the few rows the paper form lets the interviewer annotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl MatrixValue {
    /// Truthiness used when counting affected records: `true`, any non-zero
    /// number and any non-empty text count as present.
    pub fn is_truthy(&self) -> bool {
        match self {
            MatrixValue::Flag(flag) => *flag,
            MatrixValue::Number(n) => *n != 0.0 && !n.is_nan(),
            MatrixValue::Text(text) => !text.is_empty(),
        }
    }
}

impl From<bool> for MatrixValue {
    fn from(flag: bool) -> Self {
        MatrixValue::Flag(flag)
    }
}

impl From<&str> for MatrixValue {
    fn from(text: &str) -> Self {
        MatrixValue::Text(text.to_string())
    }
}

/// Condition name → member role → recorded value
///
/// Rows and cells keep the order they were first recorded in, including
/// across JSON round trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthMatrix(IndexMap<String, IndexMap<MemberRole, MatrixValue>>);

impl HealthMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, condition: &str, role: MemberRole) -> Option<&MatrixValue> {
        self.0.get(condition).and_then(|row| row.get(&role))
    }

    pub fn set(&mut self, condition: &str, role: MemberRole, value: MatrixValue) {
        self.0
            .entry(condition.to_string())
            .or_default()
            .insert(role, value);
    }

    /// Remove a cell, returning it to "not recorded". Rows left without cells
    /// are dropped.
    pub fn clear(&mut self, condition: &str, role: MemberRole) -> Option<MatrixValue> {
        let row = self.0.get_mut(condition)?;
        let removed = row.shift_remove(&role);
        if row.is_empty() {
            self.0.shift_remove(condition);
        }
        removed
    }

    /// Condition names that have at least one recorded cell, in first-recorded
    /// order
    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when any member has a truthy entry for `condition`
    pub fn any_truthy(&self, condition: &str) -> bool {
        self.0
            .get(condition)
            .map(|row| row.values().any(MatrixValue::is_truthy))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The eight matrix-shaped sections of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatrixSection {
    MedicalHistory,
    ObGynHistory,
    VaccinationHistory,
    SurgicalHistory,
    CongenitalHistory,
    Disabilities,
    Habits,
    EnvironmentalRisks,
}

const MEDICAL_ROWS: &[&str] = &[
    // Infectious
    "Tuberculosis",
    "Lepra",
    "Leishmaniasis",
    "Paludismo",
    "Cólera",
    "Dengue",
    "ETS",
    "VIH - SIDA",
    // Chronic
    "Hipertensión Arterial",
    "Diabetes Mellitus",
    "Artritis",
    "Dislipidemias",
    "Obesidad",
    "Epilepsia",
    "Cáncer",
];

const OBGYN_ROWS: &[&str] = &[
    "Toma Citología",
    "Autoexamen Seno",
    "Planificación",
    "Embarazo Actual",
];

const VACCINATION_ROWS: &[&str] = &["Menor 1 año", "1 año", "5 años", "VPH", "COVID-19"];

const DISABILITY_ROWS: &[&str] = &[
    "Limitación física",
    "Limitación mental",
    "Sordera",
    "Ceguera",
];

const HABIT_ROWS: &[&str] = &[
    "Fumar",
    "Consumo Alcohol",
    "Consumo Drogas",
    "Realiza Ejercicio",
];

impl MatrixSection {
    pub const ALL: [MatrixSection; 8] = [
        MatrixSection::MedicalHistory,
        MatrixSection::ObGynHistory,
        MatrixSection::VaccinationHistory,
        MatrixSection::SurgicalHistory,
        MatrixSection::CongenitalHistory,
        MatrixSection::Disabilities,
        MatrixSection::Habits,
        MatrixSection::EnvironmentalRisks,
    ];

    /// Field name of the section in record JSON
    pub fn key(self) -> &'static str {
        match self {
            MatrixSection::MedicalHistory => "medicalHistory",
            MatrixSection::ObGynHistory => "obGynHistory",
            MatrixSection::VaccinationHistory => "vaccinationHistory",
            MatrixSection::SurgicalHistory => "surgicalHistory",
            MatrixSection::CongenitalHistory => "congenitalHistory",
            MatrixSection::Disabilities => "disabilities",
            MatrixSection::Habits => "habits",
            MatrixSection::EnvironmentalRisks => "environmentalRisks",
        }
    }

    /// Fixed row set. Empty for sections the form leaves open.
    pub fn rows(self) -> &'static [&'static str] {
        match self {
            MatrixSection::MedicalHistory => MEDICAL_ROWS,
            MatrixSection::ObGynHistory => OBGYN_ROWS,
            MatrixSection::VaccinationHistory => VACCINATION_ROWS,
            MatrixSection::Disabilities => DISABILITY_ROWS,
            MatrixSection::Habits => HABIT_ROWS,
            MatrixSection::SurgicalHistory
            | MatrixSection::CongenitalHistory
            | MatrixSection::EnvironmentalRisks => &[],
        }
    }

    /// Whether `row` is a valid condition name for this section
    pub fn accepts(self, row: &str) -> bool {
        if row.trim().is_empty() {
            return false;
        }
        let rows = self.rows();
        rows.is_empty() || rows.contains(&row)
    }
}

impl fmt::Display for MatrixSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cell_differs_from_explicit_false() {
        let mut matrix = HealthMatrix::new();
        matrix.set("Dengue", MemberRole::M1, false.into());

        assert_eq!(matrix.get("Dengue", MemberRole::M1), Some(&MatrixValue::Flag(false)));
        assert_eq!(matrix.get("Dengue", MemberRole::HeadOfFamily), None);
        assert!(!matrix.any_truthy("Dengue"));
        assert!(!matrix.is_empty());
    }

    #[test]
    fn test_clear_drops_empty_rows() {
        let mut matrix = HealthMatrix::new();
        matrix.set("Fumar", MemberRole::HeadOfFamily, true.into());

        assert_eq!(
            matrix.clear("Fumar", MemberRole::HeadOfFamily),
            Some(MatrixValue::Flag(true))
        );
        assert!(matrix.is_empty());
        assert_eq!(matrix.clear("Fumar", MemberRole::HeadOfFamily), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(MatrixValue::Flag(true).is_truthy());
        assert!(!MatrixValue::Flag(false).is_truthy());
        assert!(MatrixValue::Number(2.0).is_truthy());
        assert!(!MatrixValue::Number(0.0).is_truthy());
        assert!(MatrixValue::Text("leve".into()).is_truthy());
        assert!(!MatrixValue::Text(String::new()).is_truthy());
    }

    #[test]
    fn test_matrix_json_shape() {
        let mut matrix = HealthMatrix::new();
        matrix.set("Diabetes Mellitus", MemberRole::HeadOfFamily, true.into());
        matrix.set("Diabetes Mellitus", MemberRole::M2, "tipo 2".into());

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["Diabetes Mellitus"]["CF"], true);
        assert_eq!(json["Diabetes Mellitus"]["M2"], "tipo 2");

        let parsed: HealthMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, matrix);
    }

    #[test]
    fn test_conditions_keep_recorded_order() {
        let json = r#"{"Dengue":{"M1":true,"CF":true},"Asma":{"CF":true}}"#;
        let mut matrix: HealthMatrix = serde_json::from_str(json).unwrap();

        assert_eq!(matrix.conditions().collect::<Vec<_>>(), vec!["Dengue", "Asma"]);
        assert_eq!(serde_json::to_string(&matrix).unwrap(), json);

        matrix.set("Cólera", MemberRole::HeadOfFamily, true.into());
        matrix.clear("Dengue", MemberRole::M1);
        assert_eq!(
            matrix.conditions().collect::<Vec<_>>(),
            vec!["Dengue", "Asma", "Cólera"]
        );
        assert_eq!(
            serde_json::to_string(&matrix).unwrap(),
            r#"{"Dengue":{"CF":true},"Asma":{"CF":true},"Cólera":{"CF":true}}"#
        );
    }

    #[test]
    fn test_row_sets() {
        assert!(MatrixSection::MedicalHistory.accepts("Diabetes Mellitus"));
        assert!(!MatrixSection::MedicalHistory.accepts("Gripa"));
        assert!(MatrixSection::EnvironmentalRisks.accepts("Humo de leña"));
        assert!(!MatrixSection::EnvironmentalRisks.accepts("  "));
        assert_eq!(MatrixSection::ALL.len(), 8);
    }
}
