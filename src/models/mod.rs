//! Data models for imgexport.
//!
//! - [`PluginSettings`]: the persisted configuration object
//! - [`ExportSettings`]: one named export rule with its source filters and destination
//! - [`VaultEntry`]: a file or folder of the host's virtual file system
//!
//! All persisted structs derive `Serialize`/`Deserialize` with camelCase keys and
//! container-level defaults, so fields missing from older settings files are filled in.

pub mod export;
pub mod settings;
pub mod vault;

pub use export::{
    ExportFormat, ExportImageProps, ExportPath, ExportSettings, FileFilter, FileFilterType,
    ImageSize, SizeAdjustType, TextFilter, build_file_name_format,
};
pub use settings::{DEFAULT_EXPORT_SUPPORTED_FORMATS, DEFAULT_SUPPORTED_FORMATS, PluginSettings};
pub use vault::{VaultEntry, VaultFile, VaultFolder, is_supported_content_file};
