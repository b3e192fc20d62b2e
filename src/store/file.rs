//! File-level store operations
//!
//! Records are written as CBOR, which keeps field names in the stream so a
//! shape mismatch surfaces as a decode error instead of garbage.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;

/// Encodes `value` into the file at `path`.
///
/// The file is created if absent and truncated if present. The value is
/// encoded before the file is touched, so an encode failure leaves any
/// previous content in place. A crash halfway through the write still leaves
/// a partial file; there is no temp-file-and-rename here.
pub fn persist<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), StoreError> {
    let path = path.as_ref();

    let bytes = serde_cbor::to_vec(value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let mut file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(&bytes).map_err(|e| StoreError::io(path, e))?;
    file.flush().map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

/// Decodes the file at `path` into a value of type `T`
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, StoreError> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| StoreError::io(path, e))?;

    serde_cbor::from_slice(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes the file at `path` into `destination`.
///
/// `destination` is only assigned once decoding has fully succeeded.
pub fn load_into<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    destination: &mut T,
) -> Result<(), StoreError> {
    *destination = load(path)?;
    Ok(())
}

/// Returns true if anything can be stat'ed at `path`
pub fn exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).is_ok()
}

/// Makes sure `path` exists as a directory, creating parents as needed
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

/// Builds the `[vN]name` form used by [`auto_rename`]
pub fn versioned_name(file_name: &OsStr, version: u64) -> OsString {
    let mut name = OsString::from(format!("[v{}]", version));
    name.push(file_name);
    name
}

/// Moves the file at `path` aside as `[vN]<name>` in the same directory.
///
/// `N` starts at 1 and goes up until no entry with that name exists.
/// Returns the path the file now lives at.
pub fn auto_rename(path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
    let path = path.as_ref();

    let file_name = path.file_name().ok_or_else(|| {
        StoreError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut version = 1;
    let target = loop {
        let candidate = dir.join(versioned_name(file_name, version));
        if !exists(&candidate) {
            break candidate;
        }
        version += 1;
    };

    fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Login {
        username: String,
        password: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Module {
        code: String,
        files: Vec<String>,
        grades: BTreeMap<String, f64>,
        synced_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    fn login() -> Login {
        Login {
            username: "nusstu\\e0123456".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn persist_and_load_struct() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.cbor");

        persist(&path, &login()).unwrap();
        let loaded: Login = load(&path).unwrap();

        assert_eq!(loaded, login());
    }

    #[test]
    fn persist_and_load_nested_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("module.cbor");

        let mut grades = BTreeMap::new();
        grades.insert("Midterm".to_string(), 27.5);
        grades.insert("Final".to_string(), 61.0);
        let module = Module {
            code: "CS1010".to_string(),
            files: vec!["Lecture 1.pdf".to_string(), "Tutorial 1.pdf".to_string()],
            grades,
            synced_at: Some(chrono::Utc::now()),
        };

        persist(&path, &module).unwrap();
        let loaded: Module = load(&path).unwrap();

        assert_eq!(loaded, module);
    }

    #[test]
    fn overwrite_truncates_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.cbor");

        let large: Vec<u32> = (0..500).collect();
        let small = vec![7u32];

        persist(&path, &large).unwrap();
        persist(&path, &small).unwrap();

        let expected_len = serde_cbor::to_vec(&small).unwrap().len() as u64;
        assert_eq!(fs::metadata(&path).unwrap().len(), expected_len);

        let loaded: Vec<u32> = load(&path).unwrap();
        assert_eq!(loaded, small);
    }

    #[test]
    fn persist_without_parent_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("login.cbor");

        let err = persist(&path, &login()).unwrap_err();
        assert!(err.is_io());
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn load_missing_file_leaves_destination_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.cbor");

        let mut destination = login();
        let err = load_into(&path, &mut destination).unwrap_err();

        assert!(err.is_io());
        assert_eq!(destination, login());
    }

    #[test]
    fn load_into_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.cbor");
        persist(&path, &Counter { count: 42 }).unwrap();

        let mut destination = Counter { count: 0 };
        load_into(&path, &mut destination).unwrap();

        assert_eq!(destination.count, 42);
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.cbor");
        fs::write(&path, [0xff, 0x00, 0x13, 0x37]).unwrap();

        let err = load::<Login>(&path).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn load_truncated_stream_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.cbor");

        let bytes = serde_cbor::to_vec(&login()).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let mut destination = Login {
            username: String::new(),
            password: String::new(),
        };
        let err = load_into(&path, &mut destination).unwrap_err();

        assert!(err.is_decode());
        assert!(destination.username.is_empty());
    }

    #[test]
    fn load_with_other_shape_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.cbor");
        persist(&path, &login()).unwrap();

        let err = load::<Counter>(&path).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn exists_reports_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        assert!(exists(dir.path()));
        assert!(exists(&file));
        assert!(!exists(dir.path().join("b.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn exists_is_false_when_stat_is_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        let inner = locked.join("secret.txt");
        fs::create_dir(&locked).unwrap();
        fs::write(&inner, "x").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let privileged = fs::read_dir(&locked).is_ok();
        let seen = exists(&inner);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Permission bits do not apply to root
        if !privileged {
            assert!(!seen);
        }
        assert!(exists(&inner));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("CS1010").join("Lectures").join("Week 1");

        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();

        assert!(nested.is_dir());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn ensure_dir_over_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, "x").unwrap();

        let err = ensure_dir(&file).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn auto_rename_picks_lowest_free_version() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("report.txt");
        fs::write(&original, "current").unwrap();
        fs::write(dir.path().join("[v1]report.txt"), "one").unwrap();
        fs::write(dir.path().join("[v2]report.txt"), "two").unwrap();

        let renamed = auto_rename(&original).unwrap();

        assert_eq!(renamed, dir.path().join("[v3]report.txt"));
        assert!(!original.exists());
        assert_eq!(fs::read_to_string(&renamed).unwrap(), "current");
        assert_eq!(
            fs::read_to_string(dir.path().join("[v1]report.txt")).unwrap(),
            "one"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("[v2]report.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn auto_rename_fills_gaps() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("slides.pdf");
        fs::write(&original, "x").unwrap();
        fs::write(dir.path().join("[v2]slides.pdf"), "two").unwrap();

        let renamed = auto_rename(&original).unwrap();
        assert_eq!(renamed, dir.path().join("[v1]slides.pdf"));
    }

    #[test]
    fn auto_rename_missing_source_fails() {
        let dir = TempDir::new().unwrap();

        let err = auto_rename(dir.path().join("ghost.txt")).unwrap_err();

        assert!(err.is_io());
        assert!(!dir.path().join("[v1]ghost.txt").exists());
    }

    #[test]
    fn versioned_name_format() {
        assert_eq!(
            versioned_name(OsStr::new("notes.pdf"), 12),
            OsString::from("[v12]notes.pdf")
        );
    }

    proptest! {
        #[test]
        fn any_record_round_trips(
            code in "[A-Z]{2,3}[0-9]{4}",
            files in proptest::collection::vec(".*", 0..5),
            grades in proptest::collection::btree_map("[a-z ]{1,10}", -1.0e6f64..1.0e6, 0..4),
        ) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("module.cbor");
            let module = Module { code, files, grades, synced_at: None };

            persist(&path, &module).unwrap();
            let loaded: Module = load(&path).unwrap();

            prop_assert_eq!(loaded, module);
        }
    }
}
