//! Family members and role assignment
//!
//! Roles are handed out in a fixed order (CF, M1 … M6). A role is bound to a
//! member for life: removing a member never shifts the roles of the others,
//! and a freed role is not handed out again. Matrix cells are keyed by role,
//! so reusing one would silently attach old answers to a new person.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{uuid_utils, Error, Result};

/// Position of a member within the family group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberRole {
    /// Head of family
    #[serde(rename = "CF")]
    HeadOfFamily,
    M1,
    M2,
    M3,
    M4,
    M5,
    M6,
}

impl MemberRole {
    /// Every role in assignment order
    pub const ALL: [MemberRole; 7] = [
        MemberRole::HeadOfFamily,
        MemberRole::M1,
        MemberRole::M2,
        MemberRole::M3,
        MemberRole::M4,
        MemberRole::M5,
        MemberRole::M6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemberRole::HeadOfFamily => "CF",
            MemberRole::M1 => "M1",
            MemberRole::M2 => "M2",
            MemberRole::M3 => "M3",
            MemberRole::M4 => "M4",
            MemberRole::M5 => "M5",
            MemberRole::M6 => "M6",
        }
    }

    pub fn parse(s: &str) -> Option<MemberRole> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }

    /// The role that follows this one, if any
    pub fn next(self) -> Option<MemberRole> {
        let index = Self::ALL.iter().position(|role| *role == self)?;
        Self::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    M,
    F,
}

/// One person in the family group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub eapb: String,
    #[serde(default)]
    pub civil_status: String,
}

impl FamilyMember {
    /// Empty member carrying only an id and a role
    pub fn new(id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id: id.into(),
            role,
            first_name: String::new(),
            last_name: String::new(),
            id_number: String::new(),
            birth_date: String::new(),
            age: 0,
            sex: Sex::M,
            eapb: String::new(),
            civil_status: String::new(),
        }
    }

    /// The head-of-family entry every blank record starts with
    pub fn head() -> Self {
        Self::new("cf", MemberRole::HeadOfFamily)
    }
}

/// Ordered member list; always holds the head of family in first position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FamilyMember>", into = "Vec<FamilyMember>")]
pub struct MemberList(Vec<FamilyMember>);

impl MemberList {
    pub fn iter(&self) -> std::slice::Iter<'_, FamilyMember> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, role: MemberRole) -> Option<&FamilyMember> {
        self.0.iter().find(|m| m.role == role)
    }

    pub fn get_mut(&mut self, role: MemberRole) -> Option<&mut FamilyMember> {
        self.0.iter_mut().find(|m| m.role == role)
    }

    /// Role the next appended member will receive
    pub fn next_role(&self) -> Option<MemberRole> {
        self.0.iter().map(|m| m.role).max().and_then(MemberRole::next)
    }

    /// Append an empty member with the next role in sequence
    pub fn append(&mut self) -> Result<&FamilyMember> {
        let role = self.next_role().ok_or_else(|| {
            Error::InvalidInput(format!(
                "family group is full ({} roles assigned)",
                MemberRole::ALL.len()
            ))
        })?;
        self.0
            .push(FamilyMember::new(uuid_utils::generate().to_string(), role));
        Ok(&self.0[self.0.len() - 1])
    }

    /// Remove a member by role. The head of family cannot be removed.
    pub fn remove(&mut self, role: MemberRole) -> Result<FamilyMember> {
        if role == MemberRole::HeadOfFamily {
            return Err(Error::InvalidInput(
                "the head of family cannot be removed".to_string(),
            ));
        }
        let index = self
            .0
            .iter()
            .position(|m| m.role == role)
            .ok_or_else(|| Error::NotFound(format!("member {}", role)))?;
        Ok(self.0.remove(index))
    }
}

impl Default for MemberList {
    fn default() -> Self {
        Self(vec![FamilyMember::head()])
    }
}

impl TryFrom<Vec<FamilyMember>> for MemberList {
    type Error = Error;

    fn try_from(members: Vec<FamilyMember>) -> Result<Self> {
        match members.first() {
            None => Err(Error::InvalidInput("member list is empty".to_string())),
            Some(first) if first.role != MemberRole::HeadOfFamily => Err(Error::InvalidInput(
                format!("first member has role {}, expected CF", first.role),
            )),
            Some(_) => Ok(Self(members)),
        }
    }
}

impl From<MemberList> for Vec<FamilyMember> {
    fn from(list: MemberList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a MemberList {
    type Item = &'a FamilyMember;
    type IntoIter = std::slice::Iter<'a, FamilyMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_assigned_in_sequence() {
        let mut members = MemberList::default();
        for _ in 0..6 {
            members.append().unwrap();
        }

        let roles: Vec<&str> = members.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["CF", "M1", "M2", "M3", "M4", "M5", "M6"]);
        assert!(members.append().is_err());
    }

    #[test]
    fn test_removed_roles_are_not_reused() {
        let mut members = MemberList::default();
        members.append().unwrap(); // M1
        members.append().unwrap(); // M2
        members.append().unwrap(); // M3

        let removed = members.remove(MemberRole::M2).unwrap();
        assert_eq!(removed.role, MemberRole::M2);

        let added = members.append().unwrap();
        assert_eq!(added.role, MemberRole::M4);

        // Survivors keep their original roles
        let roles: Vec<MemberRole> = members.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MemberRole::HeadOfFamily, MemberRole::M1, MemberRole::M3, MemberRole::M4]
        );
    }

    #[test]
    fn test_head_cannot_be_removed() {
        let mut members = MemberList::default();
        assert!(matches!(
            members.remove(MemberRole::HeadOfFamily),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(members.remove(MemberRole::M3), Err(Error::NotFound(_))));
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_headless_list() {
        let empty: std::result::Result<MemberList, _> = serde_json::from_str("[]");
        assert!(empty.is_err());

        let headless = r#"[{"id":"x","role":"M1"}]"#;
        assert!(serde_json::from_str::<MemberList>(headless).is_err());

        let ok = r#"[{"id":"cf","role":"CF","firstName":"Ana","sex":"F"}]"#;
        let list: MemberList = serde_json::from_str(ok).unwrap();
        assert_eq!(list.get(MemberRole::HeadOfFamily).unwrap().first_name, "Ana");
    }

    #[test]
    fn test_role_parse_and_next() {
        assert_eq!(MemberRole::parse("CF"), Some(MemberRole::HeadOfFamily));
        assert_eq!(MemberRole::parse("M7"), None);
        assert_eq!(MemberRole::M6.next(), None);
        assert_eq!(MemberRole::HeadOfFamily.next(), Some(MemberRole::M1));
    }
}
