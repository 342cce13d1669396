//! Family record data model
//!
//! A `FamilyRecord` is one family assessment: ten named sections covering
//! general data, the family group, eight condition matrices, psychological
//! factors, socioeconomic data, housing conditions and occupation.
//!
//! JSON field names are camelCase, matching files exported by earlier
//! deployments of the intake form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{time, uuid_utils};

pub mod matrix;
pub mod member;
pub mod patch;

pub use matrix::{HealthMatrix, MatrixSection, MatrixValue};
pub use member::{FamilyMember, MemberList, MemberRole, Sex};
pub use patch::{
    FamilyInfoPatch, GeneralDataPatch, HousingPatch, MemberPatch, OccupationPatch, RecordPatch,
    SocioeconomicPatch,
};

/// The yes/no questions of the psychological factor section, by index
pub const PSYCHOLOGICAL_QUESTIONS: [&str; 5] = [
    "¿Buenas relaciones cordiales?",
    "¿Prácticas recreativas?",
    "¿Niños quedan solos?",
    "¿Corrección adecuada?",
    "¿Separación conyugal?",
];

/// Root aggregate of one family assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub general_data: GeneralData,
    #[serde(default)]
    pub family_info: FamilyInfo,

    #[serde(default)]
    pub medical_history: HealthMatrix,
    #[serde(default)]
    pub ob_gyn_history: HealthMatrix,
    #[serde(default)]
    pub vaccination_history: HealthMatrix,
    #[serde(default)]
    pub surgical_history: HealthMatrix,
    #[serde(default)]
    pub congenital_history: HealthMatrix,

    #[serde(default)]
    pub disabilities: HealthMatrix,

    #[serde(default)]
    pub habits: HealthMatrix,
    #[serde(default)]
    pub environmental_risks: HealthMatrix,

    /// Question index → answer
    #[serde(default)]
    pub psychological_factors: BTreeMap<u8, MatrixValue>,

    #[serde(default)]
    pub socioeconomic: Socioeconomic,
    #[serde(default)]
    pub housing_conditions: HousingConditions,
    #[serde(default)]
    pub occupation: Occupation,
}

impl FamilyRecord {
    /// Fresh record with a new id, a creation timestamp and every section at
    /// its form default
    pub fn blank() -> Self {
        Self {
            id: uuid_utils::generate(),
            created_at: time::now(),
            general_data: GeneralData::default(),
            family_info: FamilyInfo::default(),
            medical_history: HealthMatrix::new(),
            ob_gyn_history: HealthMatrix::new(),
            vaccination_history: HealthMatrix::new(),
            surgical_history: HealthMatrix::new(),
            congenital_history: HealthMatrix::new(),
            disabilities: HealthMatrix::new(),
            habits: HealthMatrix::new(),
            environmental_risks: HealthMatrix::new(),
            psychological_factors: BTreeMap::new(),
            socioeconomic: Socioeconomic::default(),
            housing_conditions: HousingConditions::default(),
            occupation: Occupation::default(),
        }
    }

    pub fn matrix(&self, section: MatrixSection) -> &HealthMatrix {
        match section {
            MatrixSection::MedicalHistory => &self.medical_history,
            MatrixSection::ObGynHistory => &self.ob_gyn_history,
            MatrixSection::VaccinationHistory => &self.vaccination_history,
            MatrixSection::SurgicalHistory => &self.surgical_history,
            MatrixSection::CongenitalHistory => &self.congenital_history,
            MatrixSection::Disabilities => &self.disabilities,
            MatrixSection::Habits => &self.habits,
            MatrixSection::EnvironmentalRisks => &self.environmental_risks,
        }
    }

    pub fn matrix_mut(&mut self, section: MatrixSection) -> &mut HealthMatrix {
        match section {
            MatrixSection::MedicalHistory => &mut self.medical_history,
            MatrixSection::ObGynHistory => &mut self.ob_gyn_history,
            MatrixSection::VaccinationHistory => &mut self.vaccination_history,
            MatrixSection::SurgicalHistory => &mut self.surgical_history,
            MatrixSection::CongenitalHistory => &mut self.congenital_history,
            MatrixSection::Disabilities => &mut self.disabilities,
            MatrixSection::Habits => &mut self.habits,
            MatrixSection::EnvironmentalRisks => &mut self.environmental_risks,
        }
    }
}

/// Urban/rural classification of the dwelling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Area {
    Rural,
    Urbana,
    #[default]
    #[serde(rename = "")]
    Unset,
}

/// Section 1: general data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralData {
    /// Assessment date, `YYYY-MM-DD`
    pub date: String,
    pub department: String,
    pub municipality: String,
    pub sisben: String,
    pub area: Area,
    pub estrato: String,
    pub ethnicity: String,
}

impl Default for GeneralData {
    fn default() -> Self {
        Self {
            date: time::iso_date(time::today()),
            department: String::new(),
            municipality: String::new(),
            sisben: String::new(),
            area: Area::Unset,
            estrato: String::new(),
            ethnicity: String::new(),
        }
    }
}

/// Section 2: family group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyInfo {
    pub head_last_name1: String,
    pub head_last_name2: String,
    pub address: String,
    pub neighborhood: String,
    pub phone: String,
    pub members: MemberList,
    pub family_type: String,
    pub religion: String,
}

/// Section 7: socioeconomic data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Socioeconomic {
    pub housing_type: String,
    pub housing_material: String,
    #[serde(deserialize_with = "count_or_text")]
    pub people_per_room: u32,
    #[serde(deserialize_with = "count_or_text")]
    pub rooms_count: u32,
    pub tenure: String,
    pub housing_status: String,
}

impl Default for Socioeconomic {
    fn default() -> Self {
        Self {
            housing_type: "Casa".to_string(),
            housing_material: "Ladrillo".to_string(),
            people_per_room: 1,
            rooms_count: 1,
            tenure: "Propia".to_string(),
            housing_status: "Bueno".to_string(),
        }
    }
}

/// Earlier form versions stored some counts as the raw input text ("3"),
/// and a cleared input as "". Both forms are accepted; a blank reads as 0.
fn count_or_text<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(text) if text.trim().is_empty() => Ok(0),
        Count::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected a count, found \"{}\"", text))
        }),
    }
}

/// Section 8: housing and services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HousingConditions {
    pub wall_material: String,
    pub roof_material: String,
    pub floor_material: String,
    pub specific_kitchen: bool,
    pub indoor_kitchen: bool,
    pub gas_cooking: bool,
    pub overcrowding: bool,
    pub smoke_indoor: bool,
    pub humidity_indoor: bool,
    pub electricity: bool,
    pub sufficient_light: bool,
    pub sufficient_ventilation: bool,
    #[serde(rename = "water24h")]
    pub water_24h: bool,
    pub water_treated: bool,
    pub pets_indoor: bool,
    pub pest_control: bool,
    pub public_services: IndexMap<String, bool>,
}

/// Section 9: occupation and sign-off
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Occupation {
    pub economic_activity: String,
    pub monthly_income: String,
    pub interviewer_name: String,
    pub student_name: String,
}
