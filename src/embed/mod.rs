//! Live preview embed patching.
//!
//! The host renders embedded files as marker nodes. [`EmbedPatcher`] turns markers
//! of renderable files into canvas placeholders and hands the actual decoding to a
//! [`CanvasRenderer`]:
//!
//! - only document, viewport and geometry changes trigger a pass, never selection
//! - an existing canvas is redrawn only when the file's mtime is newer than the
//!   `data-mod-date` recorded on it
//! - draws run on tokio's blocking pool and are applied back on the caller's
//!   thread through [`EmbedPatcher::apply_completed_draws`]
//!
//! The host collaborators are the [`Vault`] and [`CanvasRenderer`] traits.

pub mod host;
pub mod patcher;
pub mod view;

pub use host::{CanvasRenderer, DrawRequest, DrawnFrame, RenderError, Vault};
pub use patcher::{CompletionOutcome, DrawCompletion, EmbedPatcher, PatchSummary};
pub use view::{CanvasId, CanvasNode, EmbedMarker, EmbedView, ViewUpdate};
