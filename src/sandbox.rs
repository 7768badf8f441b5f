/*!
 * Sandboxed Filesystem
 * Confines all file operations to a configured root directory
 */

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use path_clean::clean;
use tracing::debug;

use crate::paths;
use crate::types::{from_system_time, to_system_time, FsError, FsResult, Timestamp};

/// Filesystem accessor rooted at a fixed directory
///
/// Every operation takes a root-relative path (forward-slash separators)
/// and runs it through the path validator before touching the disk, so no
/// operation can resolve outside the root. The root is fixed at
/// construction; callers needing a different root construct a new
/// instance.
///
/// Operations are synchronous and hold no state between calls. No locking
/// is performed between concurrent operations on the same path; callers
/// needing cross-operation atomicity supply it externally.
#[derive(Debug, Clone)]
pub struct SandboxFs {
    root: PathBuf,
}

impl SandboxFs {
    /// Create a new accessor rooted at the given absolute directory
    ///
    /// The root is lexically cleaned so containment checks are
    /// well-defined; it is otherwise used as supplied. Its existence and
    /// writability are the caller's responsibility.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: clean(root.into()),
        }
    }

    /// The sandbox root
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pure join of root and a relative path, without validation
    ///
    /// Never use this as a security boundary: it resolves nothing and
    /// rejects nothing. It exists for callers that need to present the
    /// would-be location to external tooling.
    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Check whether a relative path exists (file or directory)
    ///
    /// Validation failure collapses to `false`: an invalid or escaping
    /// path and a missing one are indistinguishable to this query.
    pub fn exists(&self, relative: &str) -> bool {
        match self.resolve(relative) {
            Ok(path) => path.exists(),
            Err(_) => false,
        }
    }

    /// Read an entire file into memory
    ///
    /// The size is taken up front from metadata; a short read is an error,
    /// not a partial result.
    pub fn read(&self, relative: &str) -> FsResult<Vec<u8>> {
        let path = self.resolve(relative)?;
        let mut file =
            fs::File::open(&path).map_err(|e| Self::io_error(e, format!("open {relative}")))?;
        let size = file
            .metadata()
            .map_err(|e| Self::io_error(e, format!("stat {relative}")))?
            .len();

        let mut content = vec![0u8; size as usize];
        file.read_exact(&mut content)
            .map_err(|e| Self::io_error(e, format!("read {relative}")))?;
        Ok(content)
    }

    /// Read an entire file as text
    ///
    /// Bytes are decoded lossily; invalid UTF-8 never fails the read.
    pub fn read_string(&self, relative: &str) -> FsResult<String> {
        let content = self.read(relative)?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    /// Write an entire file (create or overwrite)
    ///
    /// Missing parent directories are created. The write truncates; a
    /// crash mid-write can leave a truncated file.
    pub fn write(&self, relative: &str, data: &[u8]) -> FsResult<()> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Self::io_error(e, format!("create parent dirs for {relative}")))?;
        }

        fs::write(&path, data).map_err(|e| Self::io_error(e, format!("write {relative}")))?;
        debug!(path = %relative, bytes = data.len(), "Wrote file");
        Ok(())
    }

    /// Write an entire file from text
    pub fn write_str(&self, relative: &str, text: &str) -> FsResult<()> {
        self.write(relative, text.as_bytes())
    }

    /// Remove a file or empty directory
    ///
    /// Removing a path that does not exist is success, not an error.
    pub fn remove(&self, relative: &str) -> FsResult<()> {
        let path = self.resolve(relative)?;

        let metadata = match fs::symlink_metadata(&path) {
            Ok(md) => md,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Self::io_error(e, format!("remove {relative}"))),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!(path = %relative, "Removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(e, format!("remove {relative}"))),
        }
    }

    /// File size in bytes
    pub fn size(&self, relative: &str) -> FsResult<u64> {
        let path = self.resolve(relative)?;
        let metadata =
            fs::metadata(&path).map_err(|e| Self::io_error(e, format!("stat {relative}")))?;
        Ok(metadata.len())
    }

    /// Modification time in whole milliseconds since the epoch
    pub fn mtime(&self, relative: &str) -> FsResult<Timestamp> {
        let path = self.resolve(relative)?;
        let modified = fs::metadata(&path)
            .and_then(|md| md.modified())
            .map_err(|e| Self::io_error(e, format!("get mtime of {relative}")))?;
        Ok(from_system_time(modified))
    }

    /// Set the modification time from milliseconds since the epoch
    ///
    /// Sub-millisecond precision offered by the platform clock is not
    /// used; round-trips through [`mtime`](Self::mtime) are exact.
    pub fn set_mtime(&self, relative: &str, time: Timestamp) -> FsResult<()> {
        let path = self.resolve(relative)?;
        let file = fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| Self::io_error(e, format!("open {relative}")))?;
        file.set_modified(to_system_time(time))
            .map_err(|e| Self::io_error(e, format!("set mtime of {relative}")))
    }

    /// Create a directory, including missing parents
    ///
    /// Succeeds if the directory already exists.
    pub fn create_dir(&self, relative: &str) -> FsResult<()> {
        let path = self.resolve(relative)?;
        fs::create_dir_all(&path)
            .map_err(|e| Self::io_error(e, format!("create dir {relative}")))
    }

    /// List the immediate children of a directory
    ///
    /// An empty argument means the root itself. Entries are root-relative,
    /// `/`-separated strings in enumeration order, covering files and
    /// subdirectories alike. A missing directory lists as empty; a path
    /// that exists but is not a directory is an error. Enumeration is
    /// all-or-nothing: a failure mid-iteration discards everything
    /// collected so far.
    pub fn list(&self, relative_dir: &str) -> FsResult<Vec<String>> {
        let dir = match self.list_target(relative_dir)? {
            Some(dir) => dir,
            None => return Ok(Vec::new()),
        };

        let mut entries = Vec::new();
        let iter = fs::read_dir(&dir)
            .map_err(|e| Self::io_error(e, format!("list {}", dir.display())))?;
        for entry in iter {
            let entry = entry
                .map_err(|e| Self::io_error(e, format!("read entry in {}", dir.display())))?;
            entries.push(self.relative_name(&entry.path())?);
        }
        Ok(entries)
    }

    /// List every regular file in a directory subtree
    ///
    /// Same contract as [`list`](Self::list), except the walk is recursive
    /// and directories themselves are excluded from the result.
    pub fn list_recursive(&self, relative_dir: &str) -> FsResult<Vec<String>> {
        let dir = match self.list_target(relative_dir)? {
            Some(dir) => dir,
            None => return Ok(Vec::new()),
        };

        let mut entries = Vec::new();
        self.walk_files(&dir, &mut entries)?;
        Ok(entries)
    }

    /// Resolve a listing target: root for the empty path, validated
    /// directory otherwise; `None` when there is nothing to list
    fn list_target(&self, relative_dir: &str) -> FsResult<Option<PathBuf>> {
        let dir = if relative_dir.is_empty() {
            self.root.clone()
        } else {
            self.resolve(relative_dir)?
        };

        if !dir.exists() {
            return Ok(None);
        }
        if !dir.is_dir() {
            return Err(FsError::NotADirectory(dir.display().to_string()));
        }
        Ok(Some(dir))
    }

    fn walk_files(&self, dir: &Path, entries: &mut Vec<String>) -> FsResult<()> {
        let iter = fs::read_dir(dir)
            .map_err(|e| Self::io_error(e, format!("list {}", dir.display())))?;
        for entry in iter {
            let entry = entry
                .map_err(|e| Self::io_error(e, format!("read entry in {}", dir.display())))?;
            let file_type = entry.file_type().map_err(|e| {
                Self::io_error(e, format!("get file type in {}", dir.display()))
            })?;
            if file_type.is_dir() {
                self.walk_files(&entry.path(), entries)?;
            } else if file_type.is_file() {
                entries.push(self.relative_name(&entry.path())?);
            }
        }
        Ok(())
    }

    fn resolve(&self, relative: &str) -> FsResult<PathBuf> {
        paths::resolve(&self.root, relative)
    }

    /// Express an absolute path under the root as a root-relative,
    /// `/`-separated string
    fn relative_name(&self, path: &Path) -> FsResult<String> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| FsError::Io(format!("entry {} outside root", path.display())))?;

        let mut parts = Vec::with_capacity(4);
        for component in relative.components() {
            let part = component.as_os_str().to_str().ok_or_else(|| {
                FsError::InvalidPath(format!("non-UTF-8 name in {}", path.display()))
            })?;
            parts.push(part);
        }
        Ok(parts.join("/"))
    }

    /// Convert std::io::Error to FsError with operation context
    fn io_error(e: std::io::Error, context: impl Into<String>) -> FsError {
        FsError::Io(format!("{}: {}", context.into(), e))
    }
}
