use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

/// A regular file in the host's vault.
///
/// Paths are vault-relative and always use `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultFile {
    path: Utf8PathBuf,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime: i64,
    pub size: u64,
}

impl VaultFile {
    pub fn new(path: impl Into<Utf8PathBuf>, mtime: i64) -> Self {
        Self {
            path: path.into(),
            mtime,
            size: 0,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// File name including all extensions.
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        self.path.file_stem().unwrap_or_default()
    }

    /// Final extension without the leading dot, as stored (not case-folded).
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Parent folder, `None` for the vault root itself.
    pub fn parent(&self) -> Option<&Utf8Path> {
        self.path.parent()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultFolder {
    pub path: Utf8PathBuf,
}

/// An entry of the host's virtual file system.
///
/// File-only data is reachable through [`VaultEntry::as_file`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VaultEntry {
    Directory(VaultFolder),
    File(VaultFile),
}

impl VaultEntry {
    pub fn file(path: impl Into<Utf8PathBuf>, mtime: i64) -> Self {
        Self::File(VaultFile::new(path, mtime))
    }

    pub fn directory(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Directory(VaultFolder { path: path.into() })
    }

    pub fn as_file(&self) -> Option<&VaultFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::File(file) => file.path(),
            Self::Directory(folder) => &folder.path,
        }
    }
}

/// Returns the file if `entry` is a regular file whose extension is in `formats`.
///
/// `formats` holds lower-case extensions; the file's extension is lower-cased
/// before lookup.
pub fn is_supported_content_file<'a>(
    entry: &'a VaultEntry,
    formats: &IndexSet<String>,
) -> Option<&'a VaultFile> {
    let file = entry.as_file()?;
    let ext = file.extension()?.to_lowercase();
    formats.contains(&ext).then_some(file)
}
