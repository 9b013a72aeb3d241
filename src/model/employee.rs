use std::fmt;

use derive_more::{Display, From};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::de;

/// Backend-assigned identifier. Sent as a number by the backend but kept
/// textual so ids of either shape survive a round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_number(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        EntityId(n.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EntityId(n.to_string()),
            RawId::Float(f) => EntityId(f.to_string()),
            RawId::Text(s) => EntityId(s),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EntityId,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "de::opt_u32")]
    pub age: Option<u32>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub designation: Option<String>,

    #[serde(default, deserialize_with = "de::opt_u32")]
    pub rating: Option<u32>,

    #[serde(default, deserialize_with = "de::opt_f64")]
    pub salary: Option<f64>,
}

/// The employee as embedded in a payroll record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRef {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub id: EntityId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl EmployeeRef {
    /// Secondary label shown under the name: email when known, else the id.
    pub fn subtitle(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Body for create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayload {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub designation: String,
    pub rating: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
}

impl EmployeePayload {
    pub const GENDERS: [&'static str; 2] = ["Male", "Female"];
    pub const DESIGNATIONS: [&'static str; 7] = [
        "Software Developer",
        "Senior Developer",
        "Tech Lead",
        "Architect",
        "Manager",
        "Senior Manager",
        "Delivery Head",
    ];

    /// Prefills an edit form from an existing record.
    pub fn from_employee(emp: &Employee) -> Self {
        Self {
            name: emp.name.clone(),
            age: emp.age.unwrap_or_default(),
            gender: emp.gender.clone().unwrap_or_default(),
            designation: emp.designation.clone().unwrap_or_default(),
            rating: emp.rating.unwrap_or_default(),
            salary: emp.salary,
        }
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_accepts_numbers_and_strings() {
        let a: EntityId = serde_json::from_value(json!(42)).unwrap();
        let b: EntityId = serde_json::from_value(json!("EMP-7")).unwrap();
        assert_eq!(a.as_str(), "42");
        assert_eq!(a.as_number(), Some(42.0));
        assert_eq!(b.as_number(), None);
    }

    #[test]
    fn numeric_id_serializes_as_number() {
        assert_eq!(serde_json::to_value(EntityId::from(7u64)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(EntityId::from("x1")).unwrap(), json!("x1"));
    }

    #[test]
    fn employee_tolerates_sparse_records() {
        let emp: Employee = serde_json::from_value(json!({
            "id": 3,
            "name": "Asha",
            "age": "29",
            "rating": 4
        }))
        .unwrap();

        assert_eq!(emp.age, Some(29));
        assert_eq!(emp.gender, None);
        assert_eq!(emp.salary, None);
        assert_eq!(emp.to_string(), "#3 Asha");
    }
}
