use thiserror::Error;

use super::view::CanvasId;
use crate::models::{VaultEntry, VaultFile};

/// Pixels produced for one canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub rgba: Vec<u8>,
}

/// Errors reported by a rendering engine.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Format not supported by the rendering engine: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a rendering engine needs to paint one canvas.
#[derive(Debug, Clone)]
pub struct DrawRequest {
    pub canvas: CanvasId,
    pub file: VaultFile,
    pub resource_url: String,
}

/// External engine that decodes an image file into canvas pixels.
///
/// Called off the UI thread; implementations may block.
pub trait CanvasRenderer: Send + Sync {
    fn draw_on_canvas(&self, request: &DrawRequest) -> Result<DrawnFrame, RenderError>;
}

/// Host virtual file system.
#[cfg_attr(test, mockall::automock)]
pub trait Vault {
    /// Resolve a link or path as written in a document.
    ///
    /// With `strict` false the host may fall back to fuzzy link resolution.
    fn resolve_path(&self, path_or_link: &str, strict: bool) -> Option<VaultEntry>;

    /// URL the host serves `file` under.
    fn resource_url(&self, file: &VaultFile) -> String;
}
