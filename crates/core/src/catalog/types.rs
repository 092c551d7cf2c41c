//! Freelancer and user records as served by the marketplace catalog.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// A freelancer profile.
///
/// Read-only from the assistant's point of view. Field names follow the
/// marketplace API (camelCase); snake_case spellings are accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    /// Linked user account, used to fill in missing names.
    #[serde(
        default,
        alias = "user_id",
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<u64>,
    #[serde(
        default,
        alias = "display_name",
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub profession: Option<String>,
    #[serde(default, deserialize_with = "deserialize_skills")]
    pub skills: BTreeSet<String>,
    #[serde(
        default,
        alias = "hourly_rate",
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub hourly_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    #[serde(
        default,
        alias = "years_of_experience",
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub years_of_experience: Option<f64>,
    /// Sub-scores on the 0-100 scale.
    #[serde(
        default,
        alias = "job_performance",
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_performance: Option<f64>,
    #[serde(
        default,
        alias = "skills_experience",
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub skills_experience: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub responsiveness: Option<f64>,
    #[serde(
        default,
        alias = "fairness_score",
        deserialize_with = "deserialize_opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub fairness_score: Option<f64>,
    /// Score computed by the backend, or filled in by [`crate::scoring::annotate_matches`].
    #[serde(
        default,
        alias = "match_score",
        alias = "score",
        deserialize_with = "deserialize_opt_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub match_score: Option<u8>,
}

impl FreelancerRecord {
    /// Best human-readable name: display name, then username, then a generic label.
    pub fn label(&self) -> String {
        non_empty(self.display_name.as_deref())
            .or_else(|| non_empty(self.username.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Freelancer #{}", self.id))
    }
}

/// A freelancer result as it appears in reply payloads.
///
/// The backend sends either the record itself or a wrapper pointing at it;
/// both collapse to one [`FreelancerRecord`] via [`FreelancerResult::into_record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FreelancerResult {
    Wrapped {
        #[serde(rename = "freelancerId")]
        freelancer_id: u64,
        freelancer: FreelancerRecord,
    },
    Flat(FreelancerRecord),
}

impl FreelancerResult {
    /// Parse one element of a matches array.
    ///
    /// Returns `None` for elements that are neither shape (e.g. a flat record
    /// without an ID).
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let wrapper_id = object
            .get("freelancerId")
            .or_else(|| object.get("freelancer_id"))
            .and_then(id_from_value);
        let nested = object.get("freelancer").filter(|v| v.is_object());

        if let (Some(freelancer_id), Some(nested)) = (wrapper_id, nested) {
            let mut inner = nested.clone();
            if let Some(map) = inner.as_object_mut() {
                map.insert("id".to_string(), Value::from(freelancer_id));
            }
            return match serde_json::from_value::<FreelancerRecord>(inner) {
                Ok(freelancer) => Some(FreelancerResult::Wrapped {
                    freelancer_id,
                    freelancer,
                }),
                Err(e) => {
                    warn!("Dropping malformed wrapped freelancer {}: {}", freelancer_id, e);
                    None
                }
            };
        }

        match serde_json::from_value::<FreelancerRecord>(value.clone()) {
            Ok(record) => Some(FreelancerResult::Flat(record)),
            Err(e) => {
                warn!("Dropping malformed freelancer result: {}", e);
                None
            }
        }
    }

    pub fn freelancer_id(&self) -> u64 {
        match self {
            FreelancerResult::Wrapped { freelancer_id, .. } => *freelancer_id,
            FreelancerResult::Flat(record) => record.id,
        }
    }

    /// Collapse to the canonical record. The wrapper's ID is authoritative.
    pub fn into_record(self) -> FreelancerRecord {
        match self {
            FreelancerResult::Wrapped {
                freelancer_id,
                mut freelancer,
            } => {
                freelancer.id = freelancer_id;
                freelancer
            }
            FreelancerResult::Flat(record) => record,
        }
    }
}

/// Normalize every element of a matches array, preserving order.
pub fn normalize_results(values: &[Value]) -> Vec<FreelancerRecord> {
    values
        .iter()
        .filter_map(FreelancerResult::from_value)
        .map(FreelancerResult::into_record)
        .collect()
}

/// A marketplace user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,
    #[serde(
        default,
        alias = "first_name",
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    #[serde(
        default,
        alias = "last_name",
        deserialize_with = "deserialize_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name: Option<String>,
}

impl UserRecord {
    /// "First Last", or whichever half is present.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_empty)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// The view of a catalog record that mention resolution consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl CatalogEntry {
    pub fn new(id: u64, display_name: Option<&str>, username: Option<&str>) -> Self {
        Self {
            id,
            display_name: display_name.map(str::to_string),
            username: username.map(str::to_string),
        }
    }

    /// Non-empty names this entry can be referred to by, display name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.display_name.as_deref(), self.username.as_deref()]
            .into_iter()
            .filter_map(non_empty)
    }

    pub fn label(&self) -> String {
        self.names()
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Freelancer #{}", self.id))
    }
}

impl From<&FreelancerRecord> for CatalogEntry {
    fn from(record: &FreelancerRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            username: record.username.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Lenient field decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

impl IdRepr {
    fn into_id<E: de::Error>(self) -> Result<u64, E> {
        match self {
            IdRepr::Number(n) => Ok(n),
            IdRepr::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id {:?}", s))),
        }
    }
}

fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// IDs arrive as JSON numbers or numeric strings.
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    IdRepr::deserialize(deserializer)?.into_id()
}

fn deserialize_opt_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    Option::<IdRepr>::deserialize(deserializer)?
        .map(IdRepr::into_id)
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Number(f64),
    Text(String),
}

/// Decimal fields may be serialized as strings ("42.50"); unparseable text becomes `None`.
fn deserialize_opt_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberRepr>::deserialize(deserializer)? {
        Some(NumberRepr::Number(n)) => Some(n),
        Some(NumberRepr::Text(s)) => s.trim().parse().ok(),
        None => None,
    }
    .filter(|n| n.is_finite()))
}

fn deserialize_opt_score<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u8>, D::Error> {
    Ok(deserialize_opt_number(deserializer)?.map(|n| n.round().clamp(0.0, 100.0) as u8))
}

/// Text fields: numbers are stringified, null and other shapes become `None`.
fn deserialize_opt_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Skills: an array of strings, or a comma-separated string. Null and
/// non-string items are ignored.
fn deserialize_skills<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<String>, D::Error> {
    let skills: Vec<String> = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_and_flat_normalize_identically() {
        let flat = json!({
            "id": 7,
            "displayName": "Ada Lovelace",
            "username": "ada",
            "profession": "Data Engineer",
            "skills": ["python", "sql"],
            "hourlyRate": 85.0,
            "jobPerformance": 90,
        });
        let wrapped = json!({
            "freelancerId": 7,
            "freelancer": {
                "displayName": "Ada Lovelace",
                "username": "ada",
                "profession": "Data Engineer",
                "skills": ["sql", "python"],
                "hourlyRate": 85.0,
                "jobPerformance": 90,
            }
        });

        let from_flat = FreelancerResult::from_value(&flat).unwrap();
        let from_wrapped = FreelancerResult::from_value(&wrapped).unwrap();
        assert!(matches!(from_flat, FreelancerResult::Flat(_)));
        assert!(matches!(from_wrapped, FreelancerResult::Wrapped { .. }));
        assert_eq!(from_flat.into_record(), from_wrapped.into_record());
    }

    #[test]
    fn test_wrapper_id_is_authoritative() {
        let wrapped = json!({
            "freelancerId": "12",
            "freelancer": { "id": 99, "username": "bob" }
        });
        let result = FreelancerResult::from_value(&wrapped).unwrap();
        assert_eq!(result.freelancer_id(), 12);
        assert_eq!(result.into_record().id, 12);
    }

    #[test]
    fn test_flat_record_without_id_is_dropped() {
        let values = vec![json!({ "username": "ghost" }), json!({ "id": 3 }), json!("junk")];
        let records = normalize_results(&values);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 3);
    }

    #[test]
    fn test_lenient_numbers_and_ids() {
        let record: FreelancerRecord = serde_json::from_value(json!({
            "id": "42",
            "user_id": "5",
            "hourly_rate": "55.50",
            "rating": "n/a",
            "score": 87.6,
        }))
        .unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.user_id, Some(5));
        assert_eq!(record.hourly_rate, Some(55.5));
        assert_eq!(record.rating, None);
        assert_eq!(record.match_score, Some(88));
    }

    #[test]
    fn test_mistyped_profile_fields_keep_the_record() {
        let values = vec![
            json!({ "id": 5, "displayName": "Grace Hopper", "skills": null }),
            json!({ "id": 6, "displayName": "Alan Turing", "location": 12, "profession": {} }),
            json!({ "id": 8, "username": 1234, "skills": ["rust", 3, null, " go "] }),
            json!({ "id": 9, "skills": "python, sql,," }),
        ];
        let records = normalize_results(&values);
        assert_eq!(records.len(), 4);

        assert!(records[0].skills.is_empty());
        assert_eq!(records[1].location, Some("12".to_string()));
        assert_eq!(records[1].profession, None);
        assert_eq!(records[2].username, Some("1234".to_string()));
        assert_eq!(
            records[2].skills.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["go", "rust"]
        );
        assert_eq!(records[3].skills.len(), 2);
    }

    #[test]
    fn test_user_record_with_null_names() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": 3,
            "username": null,
            "firstName": "Katherine",
            "lastName": false,
        }))
        .unwrap();
        assert_eq!(user.username, None);
        assert_eq!(user.full_name(), Some("Katherine".to_string()));
    }

    #[test]
    fn test_record_label_fallbacks() {
        let mut record = FreelancerRecord {
            id: 9,
            ..Default::default()
        };
        assert_eq!(record.label(), "Freelancer #9");
        record.username = Some("nina".to_string());
        assert_eq!(record.label(), "nina");
        record.display_name = Some("Nina Simone".to_string());
        assert_eq!(record.label(), "Nina Simone");
    }

    #[test]
    fn test_user_full_name() {
        let user = UserRecord {
            id: 1,
            username: None,
            first_name: Some("Grace".to_string()),
            last_name: Some("  ".to_string()),
        };
        assert_eq!(user.full_name(), Some("Grace".to_string()));
    }

    #[test]
    fn test_catalog_entry_names_skip_blank() {
        let entry = CatalogEntry::new(4, Some(""), Some("linus"));
        assert_eq!(entry.names().collect::<Vec<_>>(), vec!["linus"]);
        assert_eq!(entry.label(), "linus");
    }
}
