use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::host::{CanvasRenderer, DrawRequest, DrawnFrame, RenderError, Vault};
use super::view::{
    ATTR_ALT, ATTR_DATA_PATH, ATTR_DRAGGABLE, ATTR_FILE_SOURCE, ATTR_MOD_DATE, ATTR_SRC, CanvasId,
    CanvasNode, EmbedView, ViewUpdate,
};
use crate::models::VaultFile;
use crate::state::SettingsManager;

/// Result of one draw, sent back from the blocking pool.
#[derive(Debug)]
pub struct DrawCompletion {
    pub canvas: CanvasId,
    pub token: u64,
    pub path: String,
    pub result: Result<DrawnFrame, RenderError>,
}

/// What happened to a completion handed to [`EmbedPatcher::apply_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Painted,
    /// The canvas is gone or a newer draw superseded this one.
    Discarded,
    Failed,
}

/// Counters for one patch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub generation: u64,
    pub scanned: usize,
    pub unresolved: usize,
    pub unsupported: usize,
    pub created: usize,
    pub redrawn: usize,
    pub up_to_date: usize,
}

impl PatchSummary {
    pub fn draws_requested(&self) -> usize {
        self.created + self.redrawn
    }
}

/// Replaces embed markers of renderable files with canvases in live preview.
///
/// Every patch pass gets a new generation number. A draw carries the generation
/// it was requested in and the canvas remembers the token of its latest draw, so
/// a completion for a canvas that was redrawn or removed meanwhile is dropped.
///
/// Host decorations are never produced; all effects are applied to the
/// [`EmbedView`] directly.
pub struct EmbedPatcher {
    settings: Arc<SettingsManager>,
    renderer: Arc<dyn CanvasRenderer>,
    runtime: Handle,
    generation: u64,
    next_canvas_id: u64,
    done_tx: mpsc::UnboundedSender<DrawCompletion>,
    done_rx: mpsc::UnboundedReceiver<DrawCompletion>,
}

impl EmbedPatcher {
    pub fn new(
        settings: Arc<SettingsManager>,
        renderer: Arc<dyn CanvasRenderer>,
        runtime: Handle,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            renderer,
            runtime,
            generation: 0,
            next_canvas_id: 0,
            done_tx,
            done_rx,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// React to a host view update.
    ///
    /// Returns `None` when the update does not warrant a patch pass.
    pub fn update(
        &mut self,
        update: &ViewUpdate,
        view: &mut EmbedView,
        vault: &dyn Vault,
    ) -> Option<PatchSummary> {
        if !update.is_relevant() {
            return None;
        }
        Some(self.patch(view, vault))
    }

    /// Scan every marker and request draws for new or stale canvases.
    ///
    /// Draws that finished since the last pass are applied first, so completions
    /// never pile up between passes even if the host does not drain them.
    pub fn patch(&mut self, view: &mut EmbedView, vault: &dyn Vault) -> PatchSummary {
        let painted = self.apply_completed_draws(view);
        if painted > 0 {
            tracing::trace!("Applied {} finished draws before patch pass", painted);
        }

        self.generation += 1;
        let mut summary = PatchSummary {
            generation: self.generation,
            ..PatchSummary::default()
        };

        for marker in &mut view.markers {
            let Some(src) = marker.src.as_deref() else {
                continue;
            };
            summary.scanned += 1;

            let Some(entry) = vault.resolve_path(src, false) else {
                summary.unresolved += 1;
                continue;
            };
            let Some(file) = self.settings.supported_content_file(&entry) else {
                summary.unsupported += 1;
                continue;
            };

            match marker.canvas.as_ref() {
                Some(canvas) if is_up_to_date(canvas, &file) => {
                    tracing::trace!("Canvas for {} is up to date, skipping redraw", file.path());
                    summary.up_to_date += 1;
                    continue;
                }
                Some(_) => summary.redrawn += 1,
                None => summary.created += 1,
            }

            let canvas = marker.canvas.get_or_insert_with(|| {
                self.next_canvas_id += 1;
                CanvasNode::new(CanvasId(self.next_canvas_id))
            });

            let resource_url = vault.resource_url(&file);
            canvas.set_attribute(ATTR_SRC, resource_url.clone());
            canvas.set_attribute(ATTR_ALT, file.path().as_str());
            canvas.set_attribute(ATTR_FILE_SOURCE, file.path().as_str());
            canvas.set_attribute(ATTR_DATA_PATH, file.path().as_str());
            canvas.set_attribute(ATTR_DRAGGABLE, "true");
            canvas.set_attribute(ATTR_MOD_DATE, file.mtime.to_string());
            canvas.draw_token = Some(self.generation);

            marker.title_hidden = true;
            marker.suppress_click = true;

            let request = DrawRequest {
                canvas: canvas.id,
                file,
                resource_url,
            };
            self.request_draw(request);
        }

        tracing::debug!(
            "Embed patch pass {}: scanned={}, created={}, redrawn={}, up_to_date={}",
            summary.generation,
            summary.scanned,
            summary.created,
            summary.redrawn,
            summary.up_to_date
        );

        summary
    }

    /// Hand a draw to the blocking pool without waiting for it.
    fn request_draw(&self, request: DrawRequest) {
        let renderer = Arc::clone(&self.renderer);
        let done_tx = self.done_tx.clone();
        let token = self.generation;

        self.runtime.spawn_blocking(move || {
            let result = renderer.draw_on_canvas(&request);
            // The patcher may be gone by now
            let _ = done_tx.send(DrawCompletion {
                canvas: request.canvas,
                token,
                path: request.file.path().to_string(),
                result,
            });
        });
    }

    /// Wait for the next finished draw.
    pub async fn next_completion(&mut self) -> Option<DrawCompletion> {
        self.done_rx.recv().await
    }

    /// Paint a finished draw into `view` if its canvas still wants it.
    pub fn apply_completion(
        &self,
        view: &mut EmbedView,
        completion: DrawCompletion,
    ) -> CompletionOutcome {
        let Some(canvas) = view.canvas_mut(completion.canvas) else {
            tracing::debug!(
                "Canvas for {} no longer exists, discarding draw",
                completion.path
            );
            return CompletionOutcome::Discarded;
        };

        if canvas.draw_token != Some(completion.token) {
            tracing::debug!(
                "Draw {} for {} was superseded by {:?}, discarding",
                completion.token,
                completion.path,
                canvas.draw_token
            );
            return CompletionOutcome::Discarded;
        }

        match completion.result {
            Ok(frame) => {
                canvas.frame = Some(frame);
                CompletionOutcome::Painted
            }
            Err(e) => {
                tracing::debug!("Failed to draw {}: {}", completion.path, e);
                CompletionOutcome::Failed
            }
        }
    }

    /// Apply every draw that has finished so far. Returns the number painted.
    pub fn apply_completed_draws(&mut self, view: &mut EmbedView) -> usize {
        let mut painted = 0;
        while let Ok(completion) = self.done_rx.try_recv() {
            if self.apply_completion(view, completion) == CompletionOutcome::Painted {
                painted += 1;
            }
        }
        painted
    }
}

/// Staleness check: a canvas is current when it shows the same file and its
/// recorded modification time is at least the file's. A missing or unparsable
/// record means redraw.
fn is_up_to_date(canvas: &CanvasNode, file: &VaultFile) -> bool {
    if canvas.attribute(ATTR_DATA_PATH) != Some(file.path().as_str()) {
        return false;
    }
    canvas
        .attribute(ATTR_MOD_DATE)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .is_some_and(|recorded| recorded >= file.mtime)
}
