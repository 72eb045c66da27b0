//! Structural diff between two entry snapshots.
//!
//! Snapshots are compared as generic JSON trees (`serde_json::Value`), so
//! the walk is independent of the entry variants: adding a new variant
//! needs no change here. A missing side (`None`) plays the role of an
//! absent field and is distinct from JSON `null`.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use medrec_types::Entry;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DiffResult;

/// The two sides of one differing path.
///
/// `None` means the field was absent on that side; `Some(Value::Null)` means
/// it was present and `null`. Absent sides are omitted on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub old_value: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub new_value: Option<Value>,
}

impl FieldChange {
    pub fn new(old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            old_value,
            new_value,
        }
    }
}

/// Deserialize a field so that a present `null` stays `Some(Value::Null)`.
///
/// Pair with `#[serde(default)]` so an absent field becomes `None`.
pub fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Mapping from dotted field path to the change recorded at that path.
///
/// Only differing paths are present. Paths iterate in lexicographic order;
/// the order carries no meaning beyond stable display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionDiff {
    changes: BTreeMap<String, FieldChange>,
}

impl VersionDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of differing paths.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn get(&self, path: &str) -> Option<&FieldChange> {
        self.changes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.changes.contains_key(path)
    }

    /// Record a change at `path`, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, change: FieldChange) {
        self.changes.insert(path.into(), change);
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldChange> {
        self.changes.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    fn record(&mut self, path: String, old: Option<&Value>, new: Option<&Value>) {
        self.changes
            .insert(path, FieldChange::new(old.cloned(), new.cloned()));
    }
}

impl<'a> IntoIterator for &'a VersionDiff {
    type Item = (&'a String, &'a FieldChange);
    type IntoIter = btree_map::Iter<'a, String, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl FromIterator<(String, FieldChange)> for VersionDiff {
    fn from_iter<I: IntoIterator<Item = (String, FieldChange)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Coarse type of a value, mirroring the categories a dynamic `typeof` check
/// distinguishes. Arrays and `null` share the object category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Category {
    Absent,
    Object,
    Number,
    String,
    Boolean,
}

fn category(value: Option<&Value>) -> Category {
    match value {
        None => Category::Absent,
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => Category::Object,
        Some(Value::Number(_)) => Category::Number,
        Some(Value::String(_)) => Category::String,
        Some(Value::Bool(_)) => Category::Boolean,
    }
}

/// Compute the path-keyed diff between two snapshots.
///
/// If either side is missing or `null` as a whole, the result holds at most
/// one change at the empty path `""` carrying both sides verbatim. Otherwise
/// the union of keys is walked recursively; nested objects are descended
/// into, while arrays and mismatched types are compared as whole values.
pub fn compute_diff(old: Option<&Value>, new: Option<&Value>) -> VersionDiff {
    let mut diff = VersionDiff::new();
    match (old, new) {
        (Some(Value::Object(old)), Some(Value::Object(new))) => {
            walk(old, new, "", &mut diff);
        }
        _ => {
            if !values_equal(old, new) {
                diff.record(String::new(), old, new);
            }
        }
    }
    diff
}

fn walk(old: &Map<String, Value>, new: &Map<String, Value>, path: &str, diff: &mut VersionDiff) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for key in keys {
        let current_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        compare(old.get(key), new.get(key), current_path, diff);
    }
}

fn compare(old: Option<&Value>, new: Option<&Value>, path: String, diff: &mut VersionDiff) {
    if category(old) != category(new) {
        diff.record(path, old, new);
        return;
    }

    match (old, new) {
        (Some(Value::Null), _) | (_, Some(Value::Null)) => {
            if !values_equal(old, new) {
                diff.record(path, old, new);
            }
        }
        (Some(Value::Object(old)), Some(Value::Object(new))) => walk(old, new, &path, diff),
        _ => {
            if !values_equal(old, new) {
                diff.record(path, old, new);
            }
        }
    }
}

/// Structural equality of two optional values.
///
/// Object key order is irrelevant and numbers compare by numeric value, so
/// `1` and `1.0` are equal. An absent value equals only another absent value.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => json_eq(a, b),
        _ => false,
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, a)| y.get(key).is_some_and(|b| json_eq(a, b)))
        }
        _ => a == b,
    }
}

/// Diff two typed entry snapshots.
pub fn diff_entries(old: Option<&Entry>, new: Option<&Entry>) -> DiffResult<VersionDiff> {
    let old = old.map(serde_json::to_value).transpose()?;
    let new = new.map(serde_json::to_value).transpose()?;
    Ok(compute_diff(old.as_ref(), new.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use medrec_types::{EntryDetails, HealthCheckRating, NewEntry};
    use proptest::prelude::*;
    use serde_json::json;

    fn entry() -> Entry {
        NewEntry {
            description: "Yearly control visit".into(),
            date: "2019-10-20".parse().unwrap(),
            specialist: "MD House".into(),
            diagnosis_codes: Some(vec!["Z57.1".into()]),
            details: EntryDetails::HealthCheck {
                health_check_rating: HealthCheckRating::Healthy,
            },
        }
        .into_entry(Utc::now())
    }

    #[test]
    fn identical_values_no_diff() {
        let value = json!({"a": 1, "b": {"c": [1, 2], "d": null}});
        assert!(compute_diff(Some(&value), Some(&value)).is_empty());
    }

    #[test]
    fn null_old_records_top_level() {
        let new = json!({"description": "x"});
        let diff = compute_diff(Some(&Value::Null), Some(&new));
        assert_eq!(diff.len(), 1);
        let change = diff.get("").unwrap();
        assert_eq!(change.old_value, Some(Value::Null));
        assert_eq!(change.new_value, Some(new));
    }

    #[test]
    fn null_new_records_top_level() {
        let old = json!({"description": "x"});
        let diff = compute_diff(Some(&old), Some(&Value::Null));
        let change = diff.get("").unwrap();
        assert_eq!(change.old_value, Some(old));
        assert_eq!(change.new_value, Some(Value::Null));
    }

    #[test]
    fn missing_old_records_top_level() {
        let new = json!({"description": "x"});
        let diff = compute_diff(None, Some(&new));
        assert_eq!(diff.len(), 1);
        let change = diff.get("").unwrap();
        assert_eq!(change.old_value, None);
        assert_eq!(change.new_value, Some(new));
    }

    #[test]
    fn both_missing_or_both_null_is_empty() {
        assert!(compute_diff(None, None).is_empty());
        assert!(compute_diff(Some(&Value::Null), Some(&Value::Null)).is_empty());
    }

    #[test]
    fn nested_null_and_absent_fields() {
        let old = json!({"a": {"x": 1, "y": null}});
        let new = json!({"a": {"x": 1, "y": "n", "z": "d"}});
        let diff = compute_diff(Some(&old), Some(&new));

        assert_eq!(diff.len(), 2);
        assert!(!diff.contains("a.x"));
        assert_eq!(
            diff.get("a.y"),
            Some(&FieldChange::new(Some(Value::Null), Some(json!("n"))))
        );
        assert_eq!(
            diff.get("a.z"),
            Some(&FieldChange::new(None, Some(json!("d"))))
        );
    }

    #[test]
    fn type_change_is_recorded_without_recursion() {
        let old = json!({"rating": 1, "sickLeave": {"startDate": "2019-01-01"}});
        let new = json!({"rating": "1", "sickLeave": "none"});
        let diff = compute_diff(Some(&old), Some(&new));
        assert_eq!(diff.len(), 2);
        assert!(diff.contains("rating"));
        assert!(diff.contains("sickLeave"));
        assert!(!diff.contains("sickLeave.startDate"));
    }

    #[test]
    fn null_to_object_is_recorded_whole() {
        let old = json!({"discharge": null});
        let new = json!({"discharge": {"date": "2015-01-16", "criteria": "healed"}});
        let diff = compute_diff(Some(&old), Some(&new));
        assert_eq!(diff.paths().collect::<Vec<_>>(), vec!["discharge"]);
    }

    #[test]
    fn arrays_compare_whole_value() {
        let old = json!({"diagnosisCodes": ["A", "B"]});
        let new = json!({"diagnosisCodes": ["A", "C"]});
        let diff = compute_diff(Some(&old), Some(&new));
        assert_eq!(diff.paths().collect::<Vec<_>>(), vec!["diagnosisCodes"]);
        let change = diff.get("diagnosisCodes").unwrap();
        assert_eq!(change.old_value, Some(json!(["A", "B"])));
        assert_eq!(change.new_value, Some(json!(["A", "C"])));
    }

    #[test]
    fn numbers_compare_numerically() {
        let old = json!({"n": 1});
        let new = json!({"n": 1.0});
        assert!(compute_diff(Some(&old), Some(&new)).is_empty());
    }

    #[test]
    fn removed_field_has_no_new_value() {
        let old = json!({"sickLeave": {"startDate": "a"}});
        let new = json!({});
        let diff = compute_diff(Some(&old), Some(&new));
        let change = diff.get("sickLeave").unwrap();
        assert!(change.new_value.is_none());
    }

    #[test]
    fn wire_format_keeps_null_distinct_from_absent() {
        let old = json!({"a": {"y": null}});
        let new = json!({"a": {"y": "n", "z": "d"}});
        let diff = compute_diff(Some(&old), Some(&new));

        let wire = serde_json::to_value(&diff).unwrap();
        assert_eq!(wire["a.y"], json!({"oldValue": null, "newValue": "n"}));
        assert_eq!(wire["a.z"], json!({"newValue": "d"}));

        let back: VersionDiff = serde_json::from_value(wire).unwrap();
        assert_eq!(back, diff);
    }

    #[test]
    fn entry_self_diff_is_empty() {
        let e = entry();
        assert!(diff_entries(Some(&e), Some(&e)).unwrap().is_empty());
    }

    #[test]
    fn entry_leaf_change() {
        let old = entry();
        let mut new = old.clone();
        new.details = EntryDetails::HealthCheck {
            health_check_rating: HealthCheckRating::HighRisk,
        };
        let diff = diff_entries(Some(&old), Some(&new)).unwrap();
        assert_eq!(diff.paths().collect::<Vec<_>>(), vec!["healthCheckRating"]);
        let change = diff.get("healthCheckRating").unwrap();
        assert_eq!(change.old_value, Some(json!(0)));
        assert_eq!(change.new_value, Some(json!(2)));
    }

    #[test]
    fn entry_against_missing() {
        let e = entry();
        let diff = diff_entries(None, Some(&e)).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(
            diff.get("").unwrap().new_value,
            Some(serde_json::to_value(&e).unwrap())
        );
    }

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,12}".prop_map(Value::String),
        ]
    }

    fn arb_tree() -> impl Strategy<Value = Value> {
        arb_leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-z]{1,4}", arb_tree(), 0..6)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn self_diff_is_always_empty(value in arb_tree()) {
            prop_assert!(compute_diff(Some(&value), Some(&value)).is_empty());
        }

        #[test]
        fn single_leaf_change_yields_its_path(tree in arb_object(), n in any::<i32>()) {
            let mut old = tree.clone();
            let mut new = tree;
            old["_extra"] = json!({ "leaf": n });
            new["_extra"] = json!({ "leaf": i64::from(n) + 1 });

            let diff = compute_diff(Some(&old), Some(&new));
            prop_assert_eq!(diff.paths().collect::<Vec<_>>(), vec!["_extra.leaf"]);
        }
    }
}
