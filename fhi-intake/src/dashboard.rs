//! Dashboard statistics over the saved record set

use std::fmt;

use fhi_common::FamilyRecord;
use serde::Serialize;

/// Label of the bucket collecting records with no sisben level
pub const UNDEFINED_BUCKET: &str = "Sin definir";

/// One named count in a distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub value: usize,
}

/// Summary of a record collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_families: usize,
    pub total_members: usize,
    pub mean_members: f64,
    /// Records per sisben level, in first-seen order
    pub sisben: Vec<Bucket>,
    /// Records affected per medical history condition, in first-seen order
    pub conditions: Vec<Bucket>,
    /// Size of the collection serialized as JSON
    pub payload_bytes: usize,
}

impl DashboardStats {
    pub fn compute(records: &[FamilyRecord]) -> Self {
        let total_families = records.len();
        let total_members: usize = records.iter().map(|r| r.family_info.members.len()).sum();
        let mean_members = total_members as f64 / total_families.max(1) as f64;

        let mut sisben = Vec::new();
        let mut conditions = Vec::new();
        for record in records {
            let level = record.general_data.sisben.trim();
            let level = if level.is_empty() { UNDEFINED_BUCKET } else { level };
            increment(&mut sisben, level);

            let history = &record.medical_history;
            for condition in history.conditions().filter(|c| history.any_truthy(c)) {
                increment(&mut conditions, condition);
            }
        }

        let payload_bytes = serde_json::to_vec(records).map_or(0, |json| json.len());

        Self {
            total_families,
            total_members,
            mean_members,
            sisben,
            conditions,
            payload_bytes,
        }
    }

    pub fn payload_kib(&self) -> f64 {
        self.payload_bytes as f64 / 1024.0
    }
}

fn increment(buckets: &mut Vec<Bucket>, name: &str) {
    match buckets.iter_mut().find(|b| b.name == name) {
        Some(bucket) => bucket.value += 1,
        None => buckets.push(Bucket {
            name: name.to_string(),
            value: 1,
        }),
    }
}

impl fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Familias:           {}", self.total_families)?;
        writeln!(f, "Personas:           {}", self.total_members)?;
        writeln!(f, "Promedio por hogar: {:.2}", self.mean_members)?;
        writeln!(f, "Tamaño de datos:    {:.2} KiB", self.payload_kib())?;

        writeln!(f, "Sisbén:")?;
        for bucket in &self.sisben {
            writeln!(f, "  {:<20} {}", bucket.name, bucket.value)?;
        }

        writeln!(f, "Antecedentes patológicos:")?;
        if self.conditions.is_empty() {
            writeln!(f, "  (ninguno)")?;
        }
        for bucket in &self.conditions {
            writeln!(f, "  {:<20} {}", bucket.name, bucket.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhi_common::{MatrixValue, MemberRole};

    fn record(sisben: &str, extra_members: usize) -> FamilyRecord {
        let mut record = FamilyRecord::blank();
        record.general_data.sisben = sisben.to_string();
        for _ in 0..extra_members {
            record.family_info.members.append().unwrap();
        }
        record
    }

    fn names(buckets: &[Bucket]) -> Vec<(&str, usize)> {
        buckets.iter().map(|b| (b.name.as_str(), b.value)).collect()
    }

    #[test]
    fn test_empty_collection() {
        let stats = DashboardStats::compute(&[]);
        assert_eq!(stats.total_families, 0);
        assert_eq!(stats.total_members, 0);
        assert_eq!(stats.mean_members, 0.0);
        assert!(stats.sisben.is_empty());
        assert!(stats.conditions.is_empty());
        assert_eq!(stats.payload_bytes, 2);
    }

    #[test]
    fn test_member_totals() {
        let records = vec![record("A1", 2), record("B2", 0)];
        let stats = DashboardStats::compute(&records);
        assert_eq!(stats.total_families, 2);
        assert_eq!(stats.total_members, 4);
        assert_eq!(stats.mean_members, 2.0);
    }

    #[test]
    fn test_sisben_first_seen_order_with_undefined_bucket() {
        let records = vec![
            record("C3", 0),
            record("", 0),
            record("A1", 0),
            record("C3", 0),
            record("   ", 0),
        ];
        let stats = DashboardStats::compute(&records);
        assert_eq!(
            names(&stats.sisben),
            vec![("C3", 2), (UNDEFINED_BUCKET, 2), ("A1", 1)]
        );
    }

    #[test]
    fn test_condition_counted_once_per_record() {
        let mut a = record("A1", 1);
        a.medical_history.set("Dengue", MemberRole::HeadOfFamily, true.into());
        a.medical_history.set("Dengue", MemberRole::M1, true.into());
        a.medical_history.set("Asma", MemberRole::M1, MatrixValue::Text("sí".to_string()));

        let mut b = record("A1", 0);
        b.medical_history.set("Dengue", MemberRole::HeadOfFamily, MatrixValue::Number(1.0));
        // Falsy entries do not count
        b.medical_history.set("Obesidad", MemberRole::HeadOfFamily, false.into());
        b.medical_history.set("Cáncer", MemberRole::HeadOfFamily, MatrixValue::Text(String::new()));

        let stats = DashboardStats::compute(&[a, b]);
        assert_eq!(names(&stats.conditions), vec![("Dengue", 2), ("Asma", 1)]);
    }

    #[test]
    fn test_conditions_in_first_seen_order_across_records() {
        // Stored order, as read back from a saved record
        let mut a = record("C1", 0);
        a.medical_history =
            serde_json::from_str(r#"{"Tuberculosis":{"CF":true},"Dengue":{"CF":true}}"#).unwrap();

        let mut b = record("B1", 0);
        b.medical_history.set("Artritis", MemberRole::HeadOfFamily, true.into());
        b.medical_history.set("Tuberculosis", MemberRole::HeadOfFamily, true.into());

        let stats = DashboardStats::compute(&[a, b]);
        assert_eq!(
            names(&stats.conditions),
            vec![("Tuberculosis", 2), ("Dengue", 1), ("Artritis", 1)]
        );
    }

    #[test]
    fn test_display_uses_two_decimals() {
        let records = vec![record("A1", 0), record("A1", 1), record("B1", 1)];
        let stats = DashboardStats::compute(&records);
        let text = stats.to_string();
        assert!(text.contains("1.67"), "{text}");
        assert!(text.contains(&format!("{:.2} KiB", stats.payload_kib())));
    }
}
