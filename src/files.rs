// Flat-file sink: raw API records kept as a JSON array in a single file.
// Reads never fail (a missing or broken file is just "no data"); writes
// rewrite the whole file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Storage that can list, append and delete raw records.
pub trait RecordFile {
    fn read(&self) -> Vec<Value>;
    fn append(&self, record: Value) -> io::Result<()>;
    /// Remove every record whose `id` equals `id`.
    fn delete(&self, id: &Value) -> io::Result<()>;
}

pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append many records with a single read and a single rewrite.
    /// Non-object records are dropped, as in [`RecordFile::append`].
    pub fn append_all(&self, new_records: Vec<Value>) -> io::Result<()> {
        let mut records = self.read();
        let before = records.len();
        let offered = new_records.len();
        records.extend(new_records.into_iter().filter(Value::is_object));
        let added = records.len() - before;
        if added < offered {
            warn!("Ignoring {} non-object records for {}", offered - added, self.path.display());
        }
        self.write(&records)
    }

    fn write(&self, records: &[Value]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Four-space indent; serde_json leaves non-ASCII text unescaped.
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        records.serialize(&mut ser).map_err(io::Error::from)?;
        fs::write(&self.path, buf)
    }
}

impl RecordFile for JsonFile {
    fn read(&self) -> Vec<Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("{} not readable ({}), treating as empty", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("{} does not hold a JSON array, treating as empty", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("{} is not valid JSON ({}), treating as empty", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Only JSON objects are stored; anything else is dropped.
    fn append(&self, record: Value) -> io::Result<()> {
        let mut records = self.read();
        if record.is_object() {
            records.push(record);
        } else {
            warn!("Ignoring non-object record for {}", self.path.display());
        }
        self.write(&records)
    }

    fn delete(&self, id: &Value) -> io::Result<()> {
        let mut records = self.read();
        records.retain(|r| r.get("id") != Some(id));
        self.write(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn file_in(dir: &TempDir) -> JsonFile {
        JsonFile::new(dir.path().join("data").join("vacancies.json"))
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(file_in(&dir).read().is_empty());
    }

    #[test]
    fn corrupt_or_non_array_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(JsonFile::new(&path).read().is_empty());

        fs::write(&path, r#"{"id": 1}"#).unwrap();
        assert!(JsonFile::new(&path).read().is_empty());
    }

    #[test]
    fn append_keeps_previous_records() {
        let dir = TempDir::new().unwrap();
        let file = file_in(&dir);
        file.append(json!({"id": "1", "name": "Разработчик"})).unwrap();
        file.append(json!({"id": "2", "name": "Tester"})).unwrap();

        let records = file.read();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Разработчик");

        let raw = fs::read_to_string(file.path()).unwrap();
        assert!(raw.contains("Разработчик"));
        assert!(raw.contains("\n        \"id\""));
    }

    #[test]
    fn append_ignores_non_objects() {
        let dir = TempDir::new().unwrap();
        let file = file_in(&dir);
        file.append(json!([1, 2])).unwrap();
        file.append(json!("text")).unwrap();
        assert!(file.read().is_empty());
        assert!(file.path().exists());
    }

    #[test]
    fn append_all_adds_objects_after_existing_records() {
        let dir = TempDir::new().unwrap();
        let file = file_in(&dir);
        file.append(json!({"id": "0"})).unwrap();

        file.append_all(vec![json!({"id": "1"}), json!(42), json!({"id": "2"})])
            .unwrap();
        assert_eq!(
            file.read(),
            vec![json!({"id": "0"}), json!({"id": "1"}), json!({"id": "2"})]
        );

        file.append_all(Vec::new()).unwrap();
        assert_eq!(file.read().len(), 3);
    }

    #[test]
    fn delete_removes_matching_ids_only() {
        let dir = TempDir::new().unwrap();
        let file = file_in(&dir);
        file.append(json!({"id": "1"})).unwrap();
        file.append(json!({"id": "2"})).unwrap();
        file.append(json!({"id": "1"})).unwrap();
        file.append(json!({"name": "no id"})).unwrap();

        file.delete(&json!("1")).unwrap();
        let records = file.read();
        assert_eq!(records, vec![json!({"id": "2"}), json!({"name": "no id"})]);

        file.delete(&json!(2)).unwrap();
        assert_eq!(file.read().len(), 2);
    }
}
