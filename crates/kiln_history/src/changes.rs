//! Change detection between the current state and the last successful run.

use std::collections::BTreeSet;

use crate::fingerprint::PropertyFingerprints;
use crate::state::{AfterPreviousExecutionState, BeforeExecutionState};

/// Message reported when no usable history exists.
pub const NO_HISTORY: &str = "No history is available.";

/// The ordered reasons why a unit of work is out of date.
///
/// Empty only when nothing tracked differs from a recorded previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeDetectionResult {
    messages: Vec<String>,
}

impl ChangeDetectionResult {
    /// A result reporting exactly the given messages.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// A result with no changes.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// The change messages in detection order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns `true` if anything changed.
    pub fn has_changes(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Consumes the result, returning its messages.
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Compares a [`BeforeExecutionState`] against the previous run's record.
///
/// Messages are produced in a fixed order: missing history, input values,
/// input files, then outputs. Within a group, properties come in name order
/// and files in path order. Detection stops once `max_messages` have been
/// collected.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    max_messages: usize,
}

impl ChangeDetector {
    /// Creates a detector reporting at most `max_messages` messages
    /// (at least one).
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
        }
    }

    /// The message cap.
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Detects changes for the unit of work called `work_name`.
    pub fn detect(
        &self,
        work_name: &str,
        current: &BeforeExecutionState,
        previous: Option<&AfterPreviousExecutionState>,
    ) -> ChangeDetectionResult {
        let mut out = Collector {
            messages: Vec::new(),
            max: self.max_messages,
        };

        let Some(previous) = previous else {
            out.push(NO_HISTORY.to_string());
            return ChangeDetectionResult {
                messages: out.messages,
            };
        };

        let value_names: BTreeSet<&String> = current
            .input_values
            .keys()
            .chain(previous.input_values().keys())
            .collect();
        for name in value_names {
            if out.full() {
                break;
            }
            match (current.input_values.get(name), previous.input_values().get(name)) {
                (Some(now), Some(then)) if now != then => out.push(format!(
                    "Value of input property '{name}' has changed for {work_name}."
                )),
                (Some(_), None) => out.push(format!(
                    "Input property '{name}' has been added for {work_name}."
                )),
                (None, Some(_)) => out.push(format!(
                    "Input property '{name}' has been removed for {work_name}."
                )),
                _ => {}
            }
        }

        compare_files(
            &mut out,
            work_name,
            "Input",
            &current.input_files,
            previous.input_files(),
        );
        compare_files(
            &mut out,
            work_name,
            "Output",
            &current.outputs_before_execution,
            previous.outputs(),
        );

        ChangeDetectionResult {
            messages: out.messages,
        }
    }
}

struct Collector {
    messages: Vec<String>,
    max: usize,
}

impl Collector {
    fn full(&self) -> bool {
        self.messages.len() >= self.max
    }

    fn push(&mut self, message: String) {
        if !self.full() {
            self.messages.push(message);
        }
    }
}

/// A property present on only one side is reported once as added or removed,
/// whether or not it holds files.
fn compare_files(
    out: &mut Collector,
    work_name: &str,
    kind: &str,
    current: &PropertyFingerprints,
    previous: &PropertyFingerprints,
) {
    let properties: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();
    for property in properties {
        if out.full() {
            return;
        }
        let (now, then) = match (current.get(property), previous.get(property)) {
            (Some(now), Some(then)) => (now, then),
            (Some(_), None) => {
                out.push(format!(
                    "{kind} property '{property}' has been added for {work_name}."
                ));
                continue;
            }
            (None, Some(_)) => {
                out.push(format!(
                    "{kind} property '{property}' has been removed for {work_name}."
                ));
                continue;
            }
            (None, None) => continue,
        };
        let paths: BTreeSet<&str> = now.iter().chain(then.iter()).map(|(p, _)| p).collect();
        for path in paths {
            if out.full() {
                return;
            }
            let change = match (now.get(path), then.get(path)) {
                (Some(a), Some(b)) if a != b => "has changed",
                (Some(_), None) => "has been added",
                (None, Some(_)) => "has been removed",
                _ => continue,
            };
            out.push(format!("{kind} property '{property}' file {path} {change}."));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FileCollectionFingerprint;
    use crate::origin::{BuildInvocationId, OriginMetadata};
    use kiln_common::{ContentHash, WorkId};
    use std::time::Duration;

    const WORK: &str = "task ':compile'";

    fn fp(entries: &[(&str, &str)]) -> FileCollectionFingerprint {
        entries
            .iter()
            .map(|(p, c)| (*p, ContentHash::from_bytes(c.as_bytes())))
            .collect()
    }

    fn state(values: &[(&str, &str)], inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> BeforeExecutionState {
        let mut s = BeforeExecutionState::default();
        for (k, v) in values {
            s.input_values.insert(k.to_string(), ContentHash::from_str_value(v));
        }
        s.input_files.insert("sources".into(), fp(inputs));
        s.outputs_before_execution.insert("classes".into(), fp(outputs));
        s
    }

    fn history(before: &BeforeExecutionState) -> AfterPreviousExecutionState {
        AfterPreviousExecutionState::new(
            before,
            before.outputs_before_execution.clone(),
            OriginMetadata::new(BuildInvocationId::new("b"), WorkId::new(":compile"), Duration::ZERO),
        )
    }

    #[test]
    fn no_history_is_a_change() {
        let result = ChangeDetector::new(3).detect(WORK, &BeforeExecutionState::default(), None);
        assert_eq!(result.messages(), ["No history is available."]);
        assert!(result.has_changes());
    }

    #[test]
    fn identical_state_has_no_changes() {
        let s = state(&[("mode", "debug")], &[("A.java", "a")], &[("A.class", "x")]);
        let result = ChangeDetector::new(3).detect(WORK, &s, Some(&history(&s)));
        assert!(!result.has_changes());
        assert_eq!(result, ChangeDetectionResult::unchanged());
    }

    #[test]
    fn value_changes_are_reported_first() {
        let old = state(&[("mode", "debug"), ("gone", "1")], &[("A.java", "a")], &[]);
        let new = state(&[("mode", "release"), ("extra", "2")], &[("A.java", "b")], &[]);
        let result = ChangeDetector::new(10).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            [
                "Input property 'extra' has been added for task ':compile'.",
                "Input property 'gone' has been removed for task ':compile'.",
                "Value of input property 'mode' has changed for task ':compile'.",
                "Input property 'sources' file A.java has changed.",
            ]
        );
    }

    #[test]
    fn file_changes_are_in_path_order() {
        let old = state(&[], &[("a.txt", "1"), ("b.txt", "2")], &[]);
        let new = state(&[], &[("b.txt", "changed"), ("c.txt", "3")], &[]);
        let result = ChangeDetector::new(10).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            [
                "Input property 'sources' file a.txt has been removed.",
                "Input property 'sources' file b.txt has changed.",
                "Input property 'sources' file c.txt has been added.",
            ]
        );
    }

    #[test]
    fn tampered_outputs_are_detected() {
        let old = state(&[], &[("a", "1")], &[("out.bin", "built")]);
        let new = state(&[], &[("a", "1")], &[("out.bin", "edited")]);
        let result = ChangeDetector::new(3).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            ["Output property 'classes' file out.bin has changed."]
        );
    }

    #[test]
    fn deleted_outputs_are_detected() {
        let old = state(&[], &[], &[("out.bin", "built")]);
        let new = state(&[], &[], &[]);
        let result = ChangeDetector::new(3).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            ["Output property 'classes' file out.bin has been removed."]
        );
    }

    #[test]
    fn empty_file_properties_count_when_added_or_removed() {
        let old = state(&[], &[("a", "1")], &[]);
        let mut new = old.clone();
        new.input_files.insert("extra".into(), FileCollectionFingerprint::new());
        new.outputs_before_execution.remove("classes");
        new.outputs_before_execution.insert("reports".into(), FileCollectionFingerprint::new());
        let result = ChangeDetector::new(10).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            [
                "Input property 'extra' has been added for task ':compile'.",
                "Output property 'classes' has been removed for task ':compile'.",
                "Output property 'reports' has been added for task ':compile'.",
            ]
        );

        let back = ChangeDetector::new(10).detect(WORK, &old, Some(&history(&new)));
        assert_eq!(
            back.messages()[0],
            "Input property 'extra' has been removed for task ':compile'."
        );
    }

    #[test]
    fn added_property_with_files_is_one_message() {
        let old = state(&[], &[], &[]);
        let mut new = old.clone();
        new.input_files
            .insert("resources".into(), fp(&[("a.png", "1"), ("b.png", "2")]));
        let result = ChangeDetector::new(10).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(
            result.messages(),
            ["Input property 'resources' has been added for task ':compile'."]
        );
    }

    #[test]
    fn messages_are_capped() {
        let old = state(&[], &[], &[]);
        let new = state(&[], &[("1", "a"), ("2", "b"), ("3", "c"), ("4", "d")], &[]);
        let result = ChangeDetector::new(2).detect(WORK, &new, Some(&history(&old)));
        assert_eq!(result.messages().len(), 2);
        assert_eq!(result.messages()[0], "Input property 'sources' file 1 has been added.");
    }

    #[test]
    fn cap_is_at_least_one() {
        assert_eq!(ChangeDetector::new(0).max_messages(), 1);
    }
}
