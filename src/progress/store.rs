use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use super::model::{ProgressDb, StudentRecord};

/// Errors raised by a progress repository
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the progress file failed
    #[error("progress file I/O failed for {path}: {source}")]
    Io {
        /// Progress file path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Existing progress file is not valid progress JSON
    #[error("progress file {path} is corrupt: {source}")]
    Corrupt {
        /// Progress file path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Serializing the progress document failed
    #[error("failed to encode progress document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Durable storage for student progress
///
/// Implementations own the persisted records; callers work on copies and hand
/// them back through [`ProgressRepository::save`].
#[cfg_attr(test, mockall::automock)]
pub trait ProgressRepository {
    /// Loads a student's record, registering unknown students with an empty one
    ///
    /// # Errors
    /// Returns error if the backing storage can't be read or written
    fn load(&mut self, student_id: &str) -> Result<StudentRecord, StoreError>;

    /// Persists a student's record, leaving other students untouched
    ///
    /// # Errors
    /// Returns error if the record could not be made durable
    fn save(&mut self, student_id: &str, record: &StudentRecord) -> Result<(), StoreError>;

    /// Snapshot of every student's progress
    ///
    /// # Errors
    /// Returns error if the backing storage can't be read
    fn load_all(&self) -> Result<ProgressDb, StoreError>;
}

/// JSON file holding every student's progress
///
/// Each save rereads the document, replaces one student, and writes the whole
/// document to a temporary file that is then renamed over the old one. Only
/// one process may write the file at a time.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the file at `path`; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_db(&self) -> Result<ProgressDb, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "progress file missing, starting empty");
                return Ok(ProgressDb::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        if contents.trim().is_empty() {
            return Ok(ProgressDb::default());
        }

        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_db(&self, db: &ProgressDb) -> Result<(), StoreError> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        db.serialize(&mut serializer).map_err(StoreError::Encode)?;
        bytes.push(b'\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            students = db.len(),
            bytes = bytes.len(),
            "progress file written"
        );
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProgressRepository for JsonFileStore {
    fn load(&mut self, student_id: &str) -> Result<StudentRecord, StoreError> {
        let mut db = self.read_db()?;
        if let Some(record) = db.student(student_id) {
            return Ok(record.clone());
        }

        tracing::info!(student = student_id, "registering new student");
        db.put(student_id, StudentRecord::default());
        self.write_db(&db)?;
        Ok(StudentRecord::default())
    }

    fn save(&mut self, student_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        let mut db = self.read_db()?;
        db.put(student_id, record.clone());
        self.write_db(&db)
    }

    fn load_all(&self) -> Result<ProgressDb, StoreError> {
        self.read_db()
    }
}

/// Non-durable repository for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    db: ProgressDb,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressRepository for MemoryStore {
    fn load(&mut self, student_id: &str) -> Result<StudentRecord, StoreError> {
        if let Some(record) = self.db.student(student_id) {
            return Ok(record.clone());
        }
        self.db.put(student_id, StudentRecord::default());
        Ok(StudentRecord::default())
    }

    fn save(&mut self, student_id: &str, record: &StudentRecord) -> Result<(), StoreError> {
        self.db.put(student_id, record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<ProgressDb, StoreError> {
        Ok(self.db.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::model::DayKey;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("students_db.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_registers_unknown_student() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students_db.json");
        let mut store = JsonFileStore::new(&path);

        let record = store.load("S1").unwrap();
        assert!(record.is_empty());

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"S1": {}}));
    }

    #[test]
    fn test_save_preserves_other_students() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("students_db.json"));

        let mut a = store.load("A").unwrap();
        a.record_failure(day("01-01-2030"), "А", "x".to_owned());
        store.save("A", &a).unwrap();

        let mut b = store.load("B").unwrap();
        b.record_failure(day("01-01-2030"), "О", "y".to_owned());
        store.save("B", &b).unwrap();

        let db = store.load_all().unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.student("A"), Some(&a));
        assert_eq!(db.student("B"), Some(&b));
    }

    #[test]
    fn test_file_is_pretty_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students_db.json");
        let mut store = JsonFileStore::new(&path);

        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), "Ж", "жукк".to_owned());
        store.save("S1", &record).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Ж\""));
        assert!(text.contains("жукк"));
        assert!(!text.contains("\\u"));
        assert!(text.contains("\n    \"S1\""));
    }

    #[test]
    fn test_corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students_db.json");
        fs::write(&path, "{ broken").unwrap();
        let mut store = JsonFileStore::new(&path);

        assert!(matches!(store.load("S1"), Err(StoreError::Corrupt { .. })));
        assert!(matches!(
            store.save("S1", &StudentRecord::default()),
            Err(StoreError::Corrupt { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[test]
    fn test_reads_existing_python_era_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students_db.json");
        fs::write(
            &path,
            r#"{"7": {"15-03-2025": {"А": {"errors": 2, "mistakes": ["мана", "пама"], "grade": 8}}}}"#,
        )
        .unwrap();
        let mut store = JsonFileStore::new(&path);

        let record = store.load("7").unwrap();
        let result = record.unit(day("15-03-2025"), "А").unwrap();
        assert_eq!(result.errors, 2);
        assert_eq!(result.grade, 8);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");
        let mut store = JsonFileStore::new(&path);
        store.save("S1", &StudentRecord::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.load("S1").unwrap().is_empty());
        assert_eq!(store.load_all().unwrap().len(), 1);

        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), "А", "x".to_owned());
        store.save("S1", &record).unwrap();
        assert_eq!(store.load("S1").unwrap(), record);
    }
}
