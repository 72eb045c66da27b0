//! Three-way conflict detection over structural diffs.

use medrec_diff::{compute_diff, deserialize_present, values_equal, VersionDiff};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field path where two diffs that should share a starting point disagree
/// on the value they started from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictMarker {
    pub path: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub base_value: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub current_value: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub incoming_value: Option<Value>,
}

/// Find paths changed by both diffs from different starting values.
///
/// For every path of `current_diff` that is also in `base_diff` and whose
/// recorded old values differ structurally, a marker is emitted with
/// `base_value = base_diff.old`, `current_value = current_diff.new` and
/// `incoming_value = base_diff.new`. Paths present in only one diff are
/// never conflicts. Markers follow `current_diff` iteration order.
pub fn find_conflicts(current_diff: &VersionDiff, base_diff: &VersionDiff) -> Vec<ConflictMarker> {
    current_diff
        .iter()
        .filter_map(|(path, current)| {
            let base = base_diff.get(path)?;
            if values_equal(current.old_value.as_ref(), base.old_value.as_ref()) {
                return None;
            }
            Some(ConflictMarker {
                path: path.clone(),
                base_value: base.old_value.clone(),
                current_value: current.new_value.clone(),
                incoming_value: base.new_value.clone(),
            })
        })
        .collect()
}

/// A displayed diff together with the conflicts found against a base.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeWayDiff {
    pub diff: VersionDiff,
    pub conflicts: Vec<ConflictMarker>,
}

impl ThreeWayDiff {
    /// Pair a displayed diff with the conflicts it has against `base_diff`,
    /// the diff from the common base to the incoming side. Without a base
    /// there are no conflicts.
    pub fn from_diffs(diff: VersionDiff, base_diff: Option<&VersionDiff>) -> Self {
        let conflicts = match base_diff {
            Some(base_diff) => find_conflicts(&diff, base_diff),
            None => Vec::new(),
        };
        if !conflicts.is_empty() {
            tracing::debug!(count = conflicts.len(), "conflicting fields against base");
        }
        Self { diff, conflicts }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Compare an incoming snapshot with the current one against their base.
///
/// `diff` is `incoming -> current`, the diff shown to the user. The second
/// comparison runs `base -> incoming`, so a path conflicts when the
/// incoming side changed it away from the base and the current side holds
/// a third value.
pub fn three_way(
    incoming: Option<&Value>,
    current: Option<&Value>,
    base: Option<&Value>,
) -> ThreeWayDiff {
    let base_diff = compute_diff(base, incoming);
    ThreeWayDiff::from_diffs(compute_diff(incoming, current), Some(&base_diff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrec_diff::FieldChange;
    use serde_json::json;

    fn diff_of(pairs: &[(&str, Value, Value)]) -> VersionDiff {
        pairs
            .iter()
            .map(|(path, old, new)| {
                (
                    path.to_string(),
                    FieldChange::new(Some(old.clone()), Some(new.clone())),
                )
            })
            .collect()
    }

    #[test]
    fn diverging_old_values_conflict() {
        let current = diff_of(&[("rating", json!(0), json!(1))]);
        let base = diff_of(&[("rating", json!(2), json!(3))]);

        let conflicts = find_conflicts(&current, &base);
        assert_eq!(
            conflicts,
            vec![ConflictMarker {
                path: "rating".into(),
                base_value: Some(json!(2)),
                current_value: Some(json!(1)),
                incoming_value: Some(json!(3)),
            }]
        );
    }

    #[test]
    fn matching_old_values_do_not_conflict() {
        let current = diff_of(&[("rating", json!(0), json!(1))]);
        let base = diff_of(&[("rating", json!(0), json!(3))]);
        assert!(find_conflicts(&current, &base).is_empty());
    }

    #[test]
    fn one_sided_paths_do_not_conflict() {
        let current = diff_of(&[("description", json!("a"), json!("b"))]);
        let base = diff_of(&[("specialist", json!("x"), json!("y"))]);
        assert!(find_conflicts(&current, &base).is_empty());
    }

    #[test]
    fn old_values_compare_structurally() {
        let current = diff_of(&[("sickLeave", json!({"a": 1, "b": 2}), json!(null))]);
        let base = diff_of(&[("sickLeave", json!({"b": 2, "a": 1.0}), json!({}))]);
        assert!(find_conflicts(&current, &base).is_empty());
    }

    #[test]
    fn absent_and_null_old_values_differ() {
        let mut current = VersionDiff::new();
        current.insert("latin", FieldChange::new(None, Some(json!("x"))));
        let mut base = VersionDiff::new();
        base.insert("latin", FieldChange::new(Some(Value::Null), Some(json!("y"))));

        let conflicts = find_conflicts(&current, &base);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].base_value, Some(Value::Null));
    }

    #[test]
    fn three_way_compares_base_against_incoming() {
        let base = json!({"rating": 0, "specialist": "House", "description": "a"});
        let incoming = json!({"rating": 2, "specialist": "House", "description": "a"});
        let current = json!({"rating": 1, "specialist": "Wilson", "description": "a"});

        let result = three_way(Some(&incoming), Some(&current), Some(&base));

        assert_eq!(
            result.diff.paths().collect::<Vec<_>>(),
            vec!["rating", "specialist"]
        );
        assert_eq!(
            result.conflicts,
            vec![ConflictMarker {
                path: "rating".into(),
                base_value: Some(json!(0)),
                current_value: Some(json!(1)),
                incoming_value: Some(json!(2)),
            }]
        );
    }

    #[test]
    fn three_way_without_divergence_is_clean() {
        let base = json!({"rating": 0});
        let incoming = json!({"rating": 0});
        let current = json!({"rating": 1});

        let result = three_way(Some(&incoming), Some(&current), Some(&base));
        assert_eq!(result.diff.len(), 1);
        assert!(!result.has_conflicts());
    }

    #[test]
    fn current_matching_base_is_still_flagged() {
        // incoming moved rating 0 -> 2 while current never left the base.
        let base = json!({"rating": 0});
        let incoming = json!({"rating": 2});
        let current = json!({"rating": 0});

        let result = three_way(Some(&incoming), Some(&current), Some(&base));
        assert_eq!(
            result.conflicts,
            vec![ConflictMarker {
                path: "rating".into(),
                base_value: Some(json!(0)),
                current_value: Some(json!(0)),
                incoming_value: Some(json!(2)),
            }]
        );
    }

    #[test]
    fn no_base_means_no_conflicts() {
        let diff = diff_of(&[("rating", json!(0), json!(1))]);
        let result = ThreeWayDiff::from_diffs(diff.clone(), None);
        assert_eq!(result.diff, diff);
        assert!(!result.has_conflicts());
    }

    #[test]
    fn marker_serializes_camel_case() {
        let marker = ConflictMarker {
            path: "a".into(),
            base_value: Some(Value::Null),
            current_value: Some(json!(1)),
            incoming_value: None,
        };
        let value = serde_json::to_value(&marker).unwrap();
        assert_eq!(value, json!({"path": "a", "baseValue": null, "currentValue": 1}));
    }
}
