//! Golden JSON files for scenario tests.
//!
//! Values are stored as pretty JSON with object keys sorted at every depth
//! and a trailing newline. A mismatch fails with the first differing line;
//! set `VOXEDIT_UPDATE_SNAPSHOTS=1` to rewrite the golden instead.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Environment variable that switches snapshot assertions to update mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "VOXEDIT_UPDATE_SNAPSHOTS";

/// Compare `value` against the golden file at `path`, or rewrite it in
/// update mode.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if update_requested() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("writing snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "snapshot {} is missing; rerun with {UPDATE_SNAPSHOTS_ENV}=1 to create it",
            path.display()
        )
    })?;
    if let Some((line, want, got)) = first_difference(&expected, &actual) {
        bail!(
            "snapshot {} differs at line {line}\n  expected: {want}\n  actual:   {got}\n\
             rerun with {UPDATE_SNAPSHOTS_ENV}=1 to accept the new output",
            path.display()
        );
    }
    Ok(())
}

/// Render `value` the way snapshots are stored on disk.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("serializing snapshot value")?;
    let mut text = serde_json::to_string_pretty(&sort_keys(value))?;
    text.push('\n');
    Ok(text)
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|flag| matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// 1-based line number and contents of the first differing line.
fn first_difference<'a>(expected: &'a str, actual: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (None, None) => {
                return (expected.ends_with('\n') != actual.ends_with('\n'))
                    .then_some((line, "<end of file>", "<end of file>"));
            }
            (w, g) if w == g => line += 1,
            (w, g) => {
                return Some((line, w.unwrap_or("<end of file>"), g.unwrap_or("<end of file>")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let rendered = canonical_json(&json!({"b": 1, "a": {"z": 0, "y": [{"d": 1, "c": 2}]}}))
            .expect("serializable");
        let position = |key: &str| rendered.find(&format!("\"{key}\"")).expect("key present");
        assert!(position("a") < position("b"));
        assert!(position("y") < position("z"));
        assert!(position("c") < position("d"));
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn reports_first_differing_line() {
        assert_eq!(first_difference("a\nb\nc\n", "a\nb\nc\n"), None);
        assert_eq!(first_difference("a\nb\n", "a\nx\n"), Some((2, "b", "x")));
        assert_eq!(
            first_difference("a\n", "a\nb\n"),
            Some((2, "<end of file>", "b"))
        );
    }

    #[test]
    fn missing_golden_is_an_error() {
        let path = std::env::temp_dir().join("voxedit-snapshot-that-does-not-exist.json");
        if update_requested() {
            return;
        }
        let err = assert_json_snapshot(&path, &json!({"k": 1})).unwrap_err();
        assert!(err.to_string().contains("is missing"), "{err:#}");
    }
}
