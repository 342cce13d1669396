//! Partial updates, one type per section
//!
//! Every field is optional; `None` leaves the current value in place.

use serde::{Deserialize, Serialize};

use super::member::{FamilyMember, Sex};
use super::{Area, FamilyInfo, GeneralData, HousingConditions, Occupation, Socioeconomic};

fn assign<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralDataPatch {
    pub date: Option<String>,
    pub department: Option<String>,
    pub municipality: Option<String>,
    pub sisben: Option<String>,
    pub area: Option<Area>,
    pub estrato: Option<String>,
    pub ethnicity: Option<String>,
}

impl GeneralDataPatch {
    pub fn apply(&self, target: &mut GeneralData) {
        assign(&mut target.date, &self.date);
        assign(&mut target.department, &self.department);
        assign(&mut target.municipality, &self.municipality);
        assign(&mut target.sisben, &self.sisben);
        assign(&mut target.area, &self.area);
        assign(&mut target.estrato, &self.estrato);
        assign(&mut target.ethnicity, &self.ethnicity);
    }
}

/// Household fields of the family group. Members are edited through
/// [`MemberPatch`] and the member list operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyInfoPatch {
    pub head_last_name1: Option<String>,
    pub head_last_name2: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub phone: Option<String>,
    pub family_type: Option<String>,
    pub religion: Option<String>,
}

impl FamilyInfoPatch {
    pub fn apply(&self, target: &mut FamilyInfo) {
        assign(&mut target.head_last_name1, &self.head_last_name1);
        assign(&mut target.head_last_name2, &self.head_last_name2);
        assign(&mut target.address, &self.address);
        assign(&mut target.neighborhood, &self.neighborhood);
        assign(&mut target.phone, &self.phone);
        assign(&mut target.family_type, &self.family_type);
        assign(&mut target.religion, &self.religion);
    }
}

/// Personal fields of one member. Id and role are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub id_number: Option<String>,
    pub birth_date: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub eapb: Option<String>,
    pub civil_status: Option<String>,
}

impl MemberPatch {
    pub fn apply(&self, target: &mut FamilyMember) {
        assign(&mut target.first_name, &self.first_name);
        assign(&mut target.last_name, &self.last_name);
        assign(&mut target.id_number, &self.id_number);
        assign(&mut target.birth_date, &self.birth_date);
        assign(&mut target.age, &self.age);
        assign(&mut target.sex, &self.sex);
        assign(&mut target.eapb, &self.eapb);
        assign(&mut target.civil_status, &self.civil_status);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocioeconomicPatch {
    pub housing_type: Option<String>,
    pub housing_material: Option<String>,
    pub people_per_room: Option<u32>,
    pub rooms_count: Option<u32>,
    pub tenure: Option<String>,
    pub housing_status: Option<String>,
}

impl SocioeconomicPatch {
    pub fn apply(&self, target: &mut Socioeconomic) {
        assign(&mut target.housing_type, &self.housing_type);
        assign(&mut target.housing_material, &self.housing_material);
        assign(&mut target.people_per_room, &self.people_per_room);
        assign(&mut target.rooms_count, &self.rooms_count);
        assign(&mut target.tenure, &self.tenure);
        assign(&mut target.housing_status, &self.housing_status);
    }
}

/// Housing materials and yes/no conditions. Public services are set one at a
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HousingPatch {
    pub wall_material: Option<String>,
    pub roof_material: Option<String>,
    pub floor_material: Option<String>,
    pub specific_kitchen: Option<bool>,
    pub indoor_kitchen: Option<bool>,
    pub gas_cooking: Option<bool>,
    pub overcrowding: Option<bool>,
    pub smoke_indoor: Option<bool>,
    pub humidity_indoor: Option<bool>,
    pub electricity: Option<bool>,
    pub sufficient_light: Option<bool>,
    pub sufficient_ventilation: Option<bool>,
    #[serde(rename = "water24h")]
    pub water_24h: Option<bool>,
    pub water_treated: Option<bool>,
    pub pets_indoor: Option<bool>,
    pub pest_control: Option<bool>,
}

impl HousingPatch {
    pub fn apply(&self, target: &mut HousingConditions) {
        assign(&mut target.wall_material, &self.wall_material);
        assign(&mut target.roof_material, &self.roof_material);
        assign(&mut target.floor_material, &self.floor_material);
        assign(&mut target.specific_kitchen, &self.specific_kitchen);
        assign(&mut target.indoor_kitchen, &self.indoor_kitchen);
        assign(&mut target.gas_cooking, &self.gas_cooking);
        assign(&mut target.overcrowding, &self.overcrowding);
        assign(&mut target.smoke_indoor, &self.smoke_indoor);
        assign(&mut target.humidity_indoor, &self.humidity_indoor);
        assign(&mut target.electricity, &self.electricity);
        assign(&mut target.sufficient_light, &self.sufficient_light);
        assign(&mut target.sufficient_ventilation, &self.sufficient_ventilation);
        assign(&mut target.water_24h, &self.water_24h);
        assign(&mut target.water_treated, &self.water_treated);
        assign(&mut target.pets_indoor, &self.pets_indoor);
        assign(&mut target.pest_control, &self.pest_control);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OccupationPatch {
    pub economic_activity: Option<String>,
    pub monthly_income: Option<String>,
    pub interviewer_name: Option<String>,
    pub student_name: Option<String>,
}

impl OccupationPatch {
    pub fn apply(&self, target: &mut Occupation) {
        assign(&mut target.economic_activity, &self.economic_activity);
        assign(&mut target.monthly_income, &self.monthly_income);
        assign(&mut target.interviewer_name, &self.interviewer_name);
        assign(&mut target.student_name, &self.student_name);
    }
}

/// Section patches bundled for one edit, in record JSON shape
///
/// ```json
/// { "generalData": { "sisben": "B2" }, "occupation": { "studentName": "L. Pérez" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RecordPatch {
    pub general_data: Option<GeneralDataPatch>,
    pub family_info: Option<FamilyInfoPatch>,
    pub socioeconomic: Option<SocioeconomicPatch>,
    pub housing_conditions: Option<HousingPatch>,
    pub occupation: Option<OccupationPatch>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut data = GeneralData::default();
        data.department = "Bolívar".to_string();

        GeneralDataPatch {
            sisben: Some("B2".to_string()),
            area: Some(Area::Urbana),
            ..Default::default()
        }
        .apply(&mut data);

        assert_eq!(data.sisben, "B2");
        assert_eq!(data.area, Area::Urbana);
        assert_eq!(data.department, "Bolívar");
    }

    #[test]
    fn test_housing_patch_from_json() {
        let patch: HousingPatch =
            serde_json::from_str(r#"{"water24h": true, "roofMaterial": "Zinc"}"#).unwrap();
        let mut housing = HousingConditions::default();
        patch.apply(&mut housing);

        assert!(housing.water_24h);
        assert_eq!(housing.roof_material, "Zinc");
        assert!(!housing.electricity);
    }

    #[test]
    fn test_record_patch_from_json() {
        let patch: RecordPatch = serde_json::from_str(
            r#"{"generalData": {"sisben": "B2"}, "socioeconomic": {"roomsCount": 3}}"#,
        )
        .unwrap();

        assert_eq!(patch.general_data.unwrap().sisben.as_deref(), Some("B2"));
        assert_eq!(patch.socioeconomic.unwrap().rooms_count, Some(3));
        assert!(patch.occupation.is_none());
        assert!(RecordPatch::default().is_empty());

        // Misspelled sections are refused rather than silently ignored
        assert!(serde_json::from_str::<RecordPatch>(r#"{"ocupation": {}}"#).is_err());
    }

    #[test]
    fn test_member_patch_keeps_identity() {
        let mut member = FamilyMember::head();
        MemberPatch {
            first_name: Some("Rosa".to_string()),
            age: Some(52),
            sex: Some(Sex::F),
            ..Default::default()
        }
        .apply(&mut member);

        assert_eq!(member.id, "cf");
        assert_eq!(member.first_name, "Rosa");
        assert_eq!(member.age, 52);
        assert_eq!(member.sex, Sex::F);
    }
}
