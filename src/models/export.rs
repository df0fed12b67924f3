use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use super::vault::VaultFile;

/// Target image format of an export rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    pub ext: String,
    pub mime_type: String,
    pub display: String,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self {
            ext: "png".to_string(),
            mime_type: "image/png".to_string(),
            display: "png".to_string(),
        }
    }
}

/// How a size adjustment is applied to the exported image.
///
/// Codes written by a newer version are kept as `Unknown` so the rest of the
/// settings still load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum SizeAdjustType {
    #[default]
    Fixed,
    Scale,
    Minimum,
    Maximum,
    Unknown(u8),
}

impl From<u8> for SizeAdjustType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Fixed,
            1 => Self::Scale,
            2 => Self::Minimum,
            3 => Self::Maximum,
            other => Self::Unknown(other),
        }
    }
}

impl From<SizeAdjustType> for u8 {
    fn from(value: SizeAdjustType) -> Self {
        match value {
            SizeAdjustType::Fixed => 0,
            SizeAdjustType::Scale => 1,
            SizeAdjustType::Minimum => 2,
            SizeAdjustType::Maximum => 3,
            SizeAdjustType::Unknown(code) => code,
        }
    }
}

/// Kind of a source filter.
///
/// Persisted as its integer code so existing settings files keep loading. An
/// unrecognised code is kept as `Unknown` and the filter rejects every file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum FileFilterType {
    #[default]
    Includes,
    Excludes,
    RegexMatch,
    RegexNonMatch,
    DoubleExtsBlocker,
    Unknown(u8),
}

impl From<u8> for FileFilterType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Includes,
            1 => Self::Excludes,
            2 => Self::RegexMatch,
            3 => Self::RegexNonMatch,
            4 => Self::DoubleExtsBlocker,
            other => Self::Unknown(other),
        }
    }
}

impl From<FileFilterType> for u8 {
    fn from(value: FileFilterType) -> Self {
        match value {
            FileFilterType::Includes => 0,
            FileFilterType::Excludes => 1,
            FileFilterType::RegexMatch => 2,
            FileFilterType::RegexNonMatch => 3,
            FileFilterType::DoubleExtsBlocker => 4,
            FileFilterType::Unknown(code) => code,
        }
    }
}

/// A filter without content, used for the built-in source filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFilter {
    pub active: bool,
    #[serde(rename = "type")]
    pub filter_type: FileFilterType,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            active: true,
            filter_type: FileFilterType::DoubleExtsBlocker,
        }
    }
}

/// A user-defined filter evaluated against a file's vault path.
///
/// `content` is a literal for `Includes`/`Excludes` and a pattern for the regex
/// types. `flags` uses the JavaScript flag letters (`i`, `m`, `s`, ...).
///
/// A missing field takes its value from [`TextFilter::default`], an active
/// empty `Includes` that accepts every path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextFilter {
    pub active: bool,
    #[serde(rename = "type")]
    pub filter_type: FileFilterType,
    pub content: String,
    pub flags: String,
    pub is_reversed: bool,
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new(FileFilterType::Includes, "")
    }
}

impl TextFilter {
    pub fn new(filter_type: FileFilterType, content: impl Into<String>) -> Self {
        Self {
            active: true,
            filter_type,
            content: content.into(),
            flags: String::new(),
            is_reversed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(rename = "type")]
    pub adjust_type: SizeAdjustType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportImageProps {
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f64,
    pub size_adjustments: Vec<ImageSize>,
}

impl Default for ExportImageProps {
    fn default() -> Self {
        Self {
            quality: 1.0,
            size_adjustments: Vec::new(),
        }
    }
}

pub const DEFAULT_FILE_NAME_PREFIX: &str = "";
pub const DEFAULT_FILE_NAME_SUFFIX: &str = "export";
pub const DEFAULT_EXPORT_DIR: &str = "Exported Images";

/// Build a file name template from a prefix and suffix.
///
/// The result has the shape `[prefix.]${name}.${ext}[.suffix].${dst_ext}`.
pub fn build_file_name_format(prefix: &str, suffix: &str) -> String {
    let mut format = String::new();
    if !prefix.is_empty() {
        format.push_str(prefix);
        format.push('.');
    }
    format.push_str("${name}.${ext}");
    if !suffix.is_empty() {
        format.push('.');
        format.push_str(suffix);
    }
    format.push_str(".${dst_ext}");
    format
}

/// Source selection and destination options of an export rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportPath {
    pub source_dir: String,
    pub recursive_sources: bool,
    pub source_exts: Vec<String>,
    pub source_filters: Vec<TextFilter>,
    pub use_built_in_source_filters: bool,
    pub built_in_source_filters: Vec<FileFilter>,
    pub as_relative_path: bool,
    pub export_dir_abs: String,
    pub export_dir_rel: String,
    pub use_custom_file_name_format: bool,
    pub file_name_format_prefix: String,
    pub file_name_format_suffix: String,
    pub custom_file_name_format: String,
}

impl Default for ExportPath {
    fn default() -> Self {
        Self {
            source_dir: String::new(),
            recursive_sources: false,
            source_exts: Vec::new(),
            source_filters: Vec::new(),
            use_built_in_source_filters: true,
            built_in_source_filters: vec![FileFilter {
                active: true,
                filter_type: FileFilterType::DoubleExtsBlocker,
            }],
            as_relative_path: false,
            export_dir_abs: DEFAULT_EXPORT_DIR.to_string(),
            export_dir_rel: String::new(),
            use_custom_file_name_format: false,
            file_name_format_prefix: DEFAULT_FILE_NAME_PREFIX.to_string(),
            file_name_format_suffix: DEFAULT_FILE_NAME_SUFFIX.to_string(),
            custom_file_name_format: build_file_name_format(
                DEFAULT_FILE_NAME_PREFIX,
                DEFAULT_FILE_NAME_SUFFIX,
            ),
        }
    }
}

impl ExportPath {
    /// The file name template in effect for this rule.
    pub fn file_name_format(&self) -> String {
        if self.use_custom_file_name_format {
            self.custom_file_name_format.clone()
        } else {
            build_file_name_format(&self.file_name_format_prefix, &self.file_name_format_suffix)
        }
    }
}

/// One named export rule.
///
/// Names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub active: bool,
    pub name: String,
    pub format: ExportFormat,
    pub img_props: ExportImageProps,
    pub path_opts: ExportPath,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            active: false,
            name: String::new(),
            format: ExportFormat::default(),
            img_props: ExportImageProps::default(),
            path_opts: ExportPath::default(),
        }
    }
}

impl ExportSettings {
    /// Render the exported file name for `file`.
    pub fn export_file_name(&self, file: &VaultFile) -> String {
        self.path_opts
            .file_name_format()
            .replace("${name}", file.stem())
            .replace("${ext}", file.extension().unwrap_or_default())
            .replace("${dst_ext}", &self.format.ext)
    }

    /// Vault path the export of `file` is written to.
    pub fn export_destination(&self, file: &VaultFile) -> Utf8PathBuf {
        let file_name = self.export_file_name(file);
        let dir = if self.path_opts.as_relative_path {
            file.parent()
                .unwrap_or_else(|| Utf8Path::new(""))
                .join(self.path_opts.export_dir_rel.trim_matches('/'))
        } else {
            Utf8PathBuf::from(self.path_opts.export_dir_abs.trim_matches('/'))
        };
        dir.join(file_name)
    }
}
