//! Text rendering for terminal output.

use std::fmt::Write;

use colored::Colorize;
use medrec_diff::{diff_text, word_changes, DiffLine, FieldChange, VersionDiff};
use medrec_merge::ConflictMarker;
use medrec_types::{EntryVersion, NonSensitivePatient, Patient};
use serde_json::Value;

const ABSENT: &str = "(absent)";

pub fn value(value: Option<&Value>) -> String {
    match value {
        None => ABSENT.to_string(),
        Some(Value::String(s)) => format!("{s:?}"),
        Some(other) => other.to_string(),
    }
}

pub fn patients(patients: &[NonSensitivePatient]) -> String {
    if patients.is_empty() {
        return "No patients.\n".to_string();
    }
    let mut out = String::new();
    for p in patients {
        let _ = writeln!(
            out,
            "{}  {}  {}  {}  {}",
            p.id.short_id().yellow(),
            p.name.bold(),
            p.date_of_birth,
            p.gender,
            p.occupation.dimmed()
        );
    }
    out
}

pub fn patient(patient: &Patient) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", patient.name.bold(), patient.id);
    let _ = writeln!(out, "  ssn: {}", patient.ssn);
    let _ = writeln!(out, "  born: {}  gender: {}", patient.date_of_birth, patient.gender);
    let _ = writeln!(out, "  occupation: {}", patient.occupation);
    if patient.entries.is_empty() {
        let _ = writeln!(out, "  no entries");
    }
    for entry in &patient.entries {
        let _ = writeln!(
            out,
            "  {} {} {} {}",
            entry.id.to_string().yellow(),
            entry.date,
            entry.kind().to_string().cyan(),
            entry.description
        );
    }
    out
}

/// Version list, newest first as given.
pub fn history(versions: &[EntryVersion]) -> String {
    if versions.is_empty() {
        return "No versions recorded.\n".to_string();
    }
    let mut out = String::new();
    for (i, v) in versions.iter().enumerate() {
        let marker = if i == 0 { "*".green().bold() } else { " ".normal() };
        let _ = write!(
            out,
            "{marker} {}  {}  {}",
            v.id.to_string().yellow(),
            timestamp(v),
            v.editor_id.bold()
        );
        if let Some(reason) = &v.change_reason {
            let _ = write!(out, "  {reason}");
        }
        out.push('\n');
    }
    out
}

pub fn version(version: &EntryVersion) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Version {}", version.id.to_string().yellow().bold());
    let _ = writeln!(out, "  entry: {}", version.entry_id);
    let _ = writeln!(out, "  editor: {}", version.editor_id);
    let _ = writeln!(out, "  updated: {}", timestamp(version));
    if let Some(reason) = &version.change_reason {
        let _ = writeln!(out, "  reason: {reason}");
    }
    if let Some(data) = &version.entry_data {
        let _ = writeln!(out, "  type: {}", data.kind().to_string().cyan());
        let _ = writeln!(out, "  date: {}", data.date);
        let _ = writeln!(out, "  specialist: {}", data.specialist);
        let _ = writeln!(out, "  description: {}", data.description);
    }
    out
}

fn timestamp(version: &EntryVersion) -> String {
    match version.updated_at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown time".to_string(),
    }
}

/// One line per changed path; free-text changes get an inline word or
/// line diff underneath.
pub fn diff(diff: &VersionDiff) -> String {
    if diff.is_empty() {
        return "No differences.\n".to_string();
    }
    let mut out = String::new();
    for (path, change) in diff {
        let label = if path.is_empty() { "(entry)" } else { path.as_str() };
        let _ = writeln!(
            out,
            "{}: {} -> {}",
            label.bold(),
            value(change.old_value.as_ref()).red(),
            value(change.new_value.as_ref()).green()
        );
        if let Some(detail) = text_detail(change) {
            out.push_str(&detail);
        }
    }
    out
}

fn text_detail(change: &FieldChange) -> Option<String> {
    let (Some(Value::String(old)), Some(Value::String(new))) =
        (&change.old_value, &change.new_value)
    else {
        return None;
    };

    let mut out = String::new();
    if old.contains('\n') || new.contains('\n') {
        let lines = diff_text(old, new);
        for hunk in &lines.hunks {
            let _ = writeln!(out, "    @@ -{} +{} @@", hunk.old_start, hunk.new_start);
            for line in &hunk.lines {
                let _ = writeln!(out, "    {}", styled_line(line));
            }
        }
    } else {
        out.push_str("    ");
        for part in word_changes(old, new) {
            let _ = write!(
                out,
                "{}",
                match &part {
                    DiffLine::Context(t) => t.normal(),
                    DiffLine::Removed(t) => t.red().strikethrough(),
                    DiffLine::Added(t) => t.green().underline(),
                }
            );
        }
        out.push('\n');
    }
    Some(out)
}

fn styled_line(line: &DiffLine) -> String {
    match line {
        DiffLine::Context(t) => format!(" {t}"),
        DiffLine::Removed(t) => format!("-{t}").red().to_string(),
        DiffLine::Added(t) => format!("+{t}").green().to_string(),
    }
}

pub fn conflicts(conflicts: &[ConflictMarker]) -> String {
    let mut out = String::new();
    if conflicts.is_empty() {
        return out;
    }
    let _ = writeln!(out, "{} {} conflicting field(s):", "!".yellow().bold(), conflicts.len());
    for c in conflicts {
        let _ = writeln!(out, "  {}", c.path.yellow().bold());
        let _ = writeln!(out, "    base:     {}", value(c.base_value.as_ref()));
        let _ = writeln!(out, "    current:  {}", value(c.current_value.as_ref()));
        let _ = writeln!(out, "    incoming: {}", value(c.incoming_value.as_ref()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(old: Option<Value>, new: Option<Value>) -> FieldChange {
        FieldChange::new(old, new)
    }

    #[test]
    fn values_distinguish_absent_and_null() {
        assert_eq!(value(None), "(absent)");
        assert_eq!(value(Some(&Value::Null)), "null");
        assert_eq!(value(Some(&json!("x"))), "\"x\"");
        assert_eq!(value(Some(&json!(2))), "2");
    }

    #[test]
    fn empty_diff_message() {
        assert_eq!(diff(&VersionDiff::new()), "No differences.\n");
    }

    #[test]
    fn diff_lists_each_path() {
        let mut d = VersionDiff::new();
        d.insert("healthCheckRating", change(Some(json!(0)), Some(json!(2))));
        d.insert("sickLeave", change(None, Some(json!({"startDate": "2019-08-05"}))));
        let out = diff(&d);
        assert!(out.contains("healthCheckRating"));
        assert!(out.contains("sickLeave"));
        assert!(out.contains("(absent)"));
    }

    #[test]
    fn short_text_changes_get_word_detail() {
        let mut d = VersionDiff::new();
        d.insert(
            "description",
            change(Some(json!("Cut finger")), Some(json!("Cut thumb"))),
        );
        let out = diff(&d);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("thumb"));
    }

    #[test]
    fn multiline_text_changes_get_hunks() {
        let mut d = VersionDiff::new();
        d.insert(
            "description",
            change(Some(json!("a\nb\nc")), Some(json!("a\nB\nc"))),
        );
        let out = diff(&d);
        assert!(out.contains("@@ -1 +1 @@"));
    }

    #[test]
    fn root_change_is_labelled() {
        let mut d = VersionDiff::new();
        d.insert("", change(None, Some(json!({}))));
        assert!(diff(&d).contains("(entry)"));
    }

    #[test]
    fn conflicts_show_three_values() {
        let out = conflicts(&[ConflictMarker {
            path: "healthCheckRating".into(),
            base_value: Some(json!(2)),
            current_value: Some(json!(1)),
            incoming_value: Some(json!(3)),
        }]);
        assert!(out.contains("base:     2"));
        assert!(out.contains("current:  1"));
        assert!(out.contains("incoming: 3"));
        assert!(conflicts(&[]).is_empty());
    }

    #[test]
    fn empty_history_message() {
        assert_eq!(history(&[]), "No versions recorded.\n");
    }
}
