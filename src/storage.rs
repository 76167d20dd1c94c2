use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{error::Error, Result};

const STAGING_SUBDIRECTORY: &str = env!("CARGO_PKG_NAME");
const INPUT_DIRECTORY: &str = "input";
const OUTPUT_DIRECTORY: &str = "output";
const PARTIAL_SUFFIX: &str = ".partial";

/// Replaces `target` with whatever `write` puts into a hidden sibling file.
/// On failure the sibling is removed and `target` stays as it was.
pub(crate) fn replace_atomically<F>(target: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut partial_name = OsString::from(".");
    partial_name.push(target.file_name().unwrap_or(target.as_os_str()));
    partial_name.push(PARTIAL_SUFFIX);
    let partial = target.with_file_name(partial_name);
    let result = File::create(&partial).and_then(|mut file| {
        write(&mut file)?;
        file.sync_all()?;
        fs::rename(&partial, target)
    });
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// Opaque name of one staged upload and its artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    /// 128 random bits, rendered as 32 lowercase hex digits
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Input,
    Output,
}

/// Staging capability the compression service runs on.
///
/// `open` starts a fresh sequential read on every call, so a staged file can
/// be read more than once. `store` creates or overwrites and leaves either the
/// complete content or nothing behind.
pub trait Storage {
    type Reader: Read;

    fn open(&self, stage: Stage, id: &FileId) -> Result<Self::Reader>;

    fn store(&self, stage: Stage, id: &FileId, bytes: &[u8]) -> Result<()>;

    fn size(&self, stage: Stage, id: &FileId) -> Result<u64>;

    fn remove(&self, stage: Stage, id: &FileId) -> Result<()>;
}

/// Keeps staged files in an `input` and an `output` directory inside a
/// subdirectory of the staging root that belongs to this program alone.
pub struct DirectoryStorage {
    input_directory: PathBuf,
    output_directory: PathBuf,
}

impl DirectoryStorage {
    /// Directory below `root` that `init` wipes.
    pub fn owned_directory(root: &Path) -> PathBuf {
        root.join(STAGING_SUBDIRECTORY)
    }

    /// Wipes whatever a previous run left in both staging directories and
    /// creates them empty. Nothing outside `owned_directory(root)` is touched.
    pub fn init(root: &Path) -> Result<Self> {
        let owned_directory = Self::owned_directory(root);
        let storage = Self {
            input_directory: owned_directory.join(INPUT_DIRECTORY),
            output_directory: owned_directory.join(OUTPUT_DIRECTORY),
        };
        for directory in [&storage.input_directory, &storage.output_directory] {
            Self::recreate_directory(directory).map_err(|e| {
                Error::FailedToInitializeStorage(directory.display().to_string(), e)
            })?;
        }
        log::info!("Staging files below {}", owned_directory.display());
        Ok(storage)
    }

    fn recreate_directory(directory: &Path) -> io::Result<()> {
        if directory.exists() {
            fs::remove_dir_all(directory)?;
        }
        fs::create_dir_all(directory)
    }

    fn directory(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Input => &self.input_directory,
            Stage::Output => &self.output_directory,
        }
    }

    fn path(&self, stage: Stage, id: &FileId) -> PathBuf {
        self.directory(stage).join(id.as_str())
    }

}

impl Storage for DirectoryStorage {
    type Reader = BufReader<File>;

    fn open(&self, stage: Stage, id: &FileId) -> Result<Self::Reader> {
        File::open(self.path(stage, id))
            .map(BufReader::new)
            .map_err(|e| Error::FailedToReadFromStorage(id.to_string(), e))
    }

    fn store(&self, stage: Stage, id: &FileId, bytes: &[u8]) -> Result<()> {
        replace_atomically(&self.path(stage, id), |file| file.write_all(bytes))
            .map_err(|e| Error::FailedToWriteToStorage(id.to_string(), e))
    }

    fn size(&self, stage: Stage, id: &FileId) -> Result<u64> {
        fs::metadata(self.path(stage, id))
            .map(|metadata| metadata.len())
            .map_err(|e| Error::FailedToReadFromStorage(id.to_string(), e))
    }

    fn remove(&self, stage: Stage, id: &FileId) -> Result<()> {
        fs::remove_file(self.path(stage, id))
            .map_err(|e| Error::FailedToRemoveFromStorage(id.to_string(), e))
    }
}

/// Keeps staged files in memory, for embedding and tests.
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<(Stage, FileId), Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: &FileId) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no staged file named {}", id),
        )
    }

    fn with_files<T>(&self, f: impl FnOnce(&mut HashMap<(Stage, FileId), Vec<u8>>) -> T) -> T {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut files)
    }
}

impl Storage for MemoryStorage {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self, stage: Stage, id: &FileId) -> Result<Self::Reader> {
        self.with_files(|files| files.get(&(stage, id.clone())).cloned())
            .map(Cursor::new)
            .ok_or_else(|| Error::FailedToReadFromStorage(id.to_string(), Self::not_found(id)))
    }

    fn store(&self, stage: Stage, id: &FileId, bytes: &[u8]) -> Result<()> {
        self.with_files(|files| files.insert((stage, id.clone()), bytes.to_vec()));
        Ok(())
    }

    fn size(&self, stage: Stage, id: &FileId) -> Result<u64> {
        self.with_files(|files| files.get(&(stage, id.clone())).map(|f| f.len() as u64))
            .ok_or_else(|| Error::FailedToReadFromStorage(id.to_string(), Self::not_found(id)))
    }

    fn remove(&self, stage: Stage, id: &FileId) -> Result<()> {
        self.with_files(|files| files.remove(&(stage, id.clone())))
            .map(|_| ())
            .ok_or_else(|| Error::FailedToRemoveFromStorage(id.to_string(), Self::not_found(id)))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use std::fs;
    use std::io::{self, Read, Write};

    use super::{replace_atomically, DirectoryStorage, FileId, MemoryStorage, Stage, Storage};
    use crate::error::Error;

    fn read_all<S: Storage>(storage: &S, stage: Stage, id: &FileId) -> Vec<u8> {
        let mut content = Vec::new();
        storage
            .open(stage, id)
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        content
    }

    fn exercise_storage<S: Storage>(storage: &S) {
        let id = FileId::generate();
        storage.store(Stage::Input, &id, b"first").unwrap();
        storage.store(Stage::Input, &id, b"second").unwrap();
        assert_eq!(read_all(storage, Stage::Input, &id), b"second");
        assert_eq!(read_all(storage, Stage::Input, &id), b"second");
        assert_eq!(storage.size(Stage::Input, &id).unwrap(), 6);
        assert!(
            storage.open(Stage::Output, &id).is_err(),
            "stages must not share files"
        );
        storage.remove(Stage::Input, &id).unwrap();
        assert!(matches!(
            storage.open(Stage::Input, &id),
            Err(Error::FailedToReadFromStorage(_, _))
        ));
        assert!(matches!(
            storage.remove(Stage::Input, &id),
            Err(Error::FailedToRemoveFromStorage(_, _))
        ));
    }

    #[test]
    fn test_file_ids_are_hex_and_distinct() {
        let ids: HashSet<FileId> = (0..1000).map(|_| FileId::generate()).collect();
        assert_eq!(ids.len(), 1000);
        for id in &ids {
            assert_eq!(id.as_str().len(), 32);
            assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_memory_storage() {
        exercise_storage(&MemoryStorage::new());
    }

    #[test]
    fn test_directory_storage() {
        let root = tempfile::tempdir().unwrap();
        exercise_storage(&DirectoryStorage::init(root.path()).unwrap());
    }

    #[test]
    fn test_directory_storage_init_wipes_leftovers() {
        let root = tempfile::tempdir().unwrap();
        let owned = DirectoryStorage::owned_directory(root.path());
        let leftover = owned.join("input").join("leftover");
        fs::create_dir_all(leftover.parent().unwrap()).unwrap();
        fs::write(&leftover, b"stale").unwrap();

        DirectoryStorage::init(root.path()).unwrap();
        assert!(!leftover.exists());
        assert!(owned.join("input").is_dir());
        assert!(owned.join("output").is_dir());
    }

    #[test]
    fn test_directory_storage_init_keeps_foreign_files() {
        let root = tempfile::tempdir().unwrap();
        let user_file = root.path().join("input").join("report.txt");
        fs::create_dir_all(user_file.parent().unwrap()).unwrap();
        fs::write(&user_file, b"keep me").unwrap();

        DirectoryStorage::init(root.path()).unwrap();
        assert_eq!(fs::read(&user_file).unwrap(), b"keep me");
    }

    #[test]
    fn test_failed_replace_keeps_previous_content() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("artifact.huff");
        fs::write(&target, b"previous").unwrap();

        let result = replace_atomically(&target, |file| {
            file.write_all(b"half")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });
        assert!(result.is_err());
        assert_eq!(fs::read(&target).unwrap(), b"previous");
        let names: Vec<_> = fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(names.len(), 1, "partial file left behind");
    }

    #[test]
    fn test_directory_storage_leaves_no_partial_files() {
        let root = tempfile::tempdir().unwrap();
        let storage = DirectoryStorage::init(root.path()).unwrap();
        let id = FileId::generate();
        storage.store(Stage::Output, &id, b"complete").unwrap();
        let output = DirectoryStorage::owned_directory(root.path()).join("output");
        let names: Vec<String> = fs::read_dir(output)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![id.to_string()]);
    }
}
