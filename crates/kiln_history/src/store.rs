//! On-disk execution history, one validated record per unit of work.
//!
//! Each record is `<history_dir>/<sanitized id>-<id hash>.hist` and consists of
//! a 4-byte little-endian header length, a bincode header (magic bytes,
//! format version, tool version, payload checksum) and a bincode payload.

use std::path::{Path, PathBuf};

use kiln_common::{ContentHash, WorkId};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::state::AfterPreviousExecutionState;

/// Magic bytes identifying a history record.
const HISTORY_MAGIC: [u8; 4] = *b"KILN";

/// Current record format version. Increment on breaking changes to the
/// header or payload layout.
const HISTORY_FORMAT_VERSION: u32 = 1;

/// File extension of history records.
const HISTORY_EXT: &str = "hist";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryHeader {
    magic: [u8; 4],
    format_version: u32,
    tool_version: String,
    checksum: ContentHash,
}

/// Persists [`AfterPreviousExecutionState`] per unit of work.
///
/// Loading is fail-safe: a missing, truncated, corrupted or incompatible
/// record reads as `None`. Writes go to a temporary file that is renamed into
/// place, so a concurrent reader sees either the old record or the new one.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
    tool_version: String,
}

impl HistoryStore {
    /// Creates a store rooted at `dir`. Records written by a different
    /// `tool_version` are ignored on load.
    pub fn new(dir: impl Into<PathBuf>, tool_version: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            tool_version: tool_version.into(),
        }
    }

    /// The directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the record path for `work`.
    pub fn record_path(&self, work: &WorkId) -> PathBuf {
        let sanitized: String = work
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let sanitized = sanitized.trim_matches('_');
        let digest = ContentHash::from_str_value(work.as_str()).to_string();
        self.dir
            .join(format!("{sanitized}-{}.{HISTORY_EXT}", &digest[..16]))
    }

    /// Loads the last successful state recorded for `work`.
    pub fn load(&self, work: &WorkId) -> Option<AfterPreviousExecutionState> {
        let raw = std::fs::read(self.record_path(work)).ok()?;

        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let header: HistoryHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != HISTORY_MAGIC
            || header.format_version != HISTORY_FORMAT_VERSION
            || header.tool_version != self.tool_version
        {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }

        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .ok()
            .map(|(state, _)| state)
    }

    /// Records `state` as the last successful state of `work`, replacing any
    /// previous record.
    pub fn store(
        &self,
        work: &WorkId,
        state: &AfterPreviousExecutionState,
    ) -> Result<(), HistoryError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| HistoryError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let payload = bincode::serde::encode_to_vec(state, bincode::config::standard())
            .map_err(|e| HistoryError::Serialization {
                reason: e.to_string(),
            })?;
        let header = HistoryHeader {
            magic: HISTORY_MAGIC,
            format_version: HISTORY_FORMAT_VERSION,
            tool_version: self.tool_version.clone(),
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| HistoryError::Serialization {
                reason: e.to_string(),
            })?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);

        let path = self.record_path(work);
        let tmp = path.with_extension(format!("{HISTORY_EXT}.{:016x}.tmp", rand::random::<u64>()));
        std::fs::write(&tmp, &output).map_err(|e| HistoryError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            HistoryError::Io { path, source: e }
        })
    }

    /// Removes the record of `work`. Returns `true` if one existed.
    pub fn remove(&self, work: &WorkId) -> Result<bool, HistoryError> {
        let path = self.record_path(work);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HistoryError::Io { path, source: e }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::PropertyFingerprints;
    use crate::origin::{BuildInvocationId, OriginMetadata};
    use crate::state::BeforeExecutionState;
    use std::time::Duration;

    fn sample_state() -> AfterPreviousExecutionState {
        let mut before = BeforeExecutionState::default();
        before
            .input_values
            .insert("target".into(), ContentHash::from_str_value("x86_64"));
        let mut outputs = PropertyFingerprints::new();
        outputs.insert(
            "out".into(),
            [("out.txt", ContentHash::from_bytes(b"hashA"))].into_iter().collect(),
        );
        let origin = OriginMetadata::new(
            BuildInvocationId::new("inv-1"),
            WorkId::new(":gen"),
            Duration::from_millis(40),
        );
        AfterPreviousExecutionState::new(&before, outputs, origin)
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), "0.1.0");
        let work = WorkId::new(":gen");
        let state = sample_state();

        store.store(&work, &state).unwrap();
        assert_eq!(store.load(&work), Some(state));
    }

    #[test]
    fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("never-created"), "0.1.0");
        assert!(store.load(&WorkId::new(":gen")).is_none());
    }

    #[test]
    fn corrupted_payload_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), "0.1.0");
        let work = WorkId::new(":gen");
        store.store(&work, &sample_state()).unwrap();

        let path = store.record_path(&work);
        let mut raw = std::fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        std::fs::write(&path, &raw).unwrap();

        assert!(store.load(&work).is_none());
    }

    #[test]
    fn truncated_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), "0.1.0");
        let work = WorkId::new(":gen");
        store.store(&work, &sample_state()).unwrap();

        let path = store.record_path(&work);
        std::fs::write(&path, [1u8, 0]).unwrap();
        assert!(store.load(&work).is_none());
    }

    #[test]
    fn other_tool_version_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkId::new(":gen");
        HistoryStore::new(dir.path(), "0.1.0")
            .store(&work, &sample_state())
            .unwrap();

        assert!(HistoryStore::new(dir.path(), "0.2.0").load(&work).is_none());
    }

    #[test]
    fn store_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), "0.1.0");
        let work = WorkId::new(":gen");
        store.store(&work, &sample_state()).unwrap();

        let replacement = AfterPreviousExecutionState::new(
            &BeforeExecutionState::default(),
            PropertyFingerprints::new(),
            OriginMetadata::new(BuildInvocationId::new("inv-2"), work.clone(), Duration::ZERO),
        );
        store.store(&work, &replacement).unwrap();
        assert_eq!(store.load(&work), Some(replacement));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(leftovers.len(), 1);
        assert!(leftovers[0].ends_with(".hist"));
    }

    #[test]
    fn remove_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), "0.1.0");
        let work = WorkId::new(":gen");
        assert!(!store.remove(&work).unwrap());
        store.store(&work, &sample_state()).unwrap();
        assert!(store.remove(&work).unwrap());
        assert!(store.load(&work).is_none());
    }

    #[test]
    fn similar_ids_get_distinct_records() {
        let store = HistoryStore::new("/tmp/h", "0.1.0");
        let a = store.record_path(&WorkId::new(":app:compile"));
        let b = store.record_path(&WorkId::new("_app_compile"));
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("app_compile-"));
        assert!(name.ends_with(".hist"));
    }
}
