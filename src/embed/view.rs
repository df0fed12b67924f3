use indexmap::IndexMap;

use super::host::DrawnFrame;

pub const ATTR_SRC: &str = "src";
pub const ATTR_ALT: &str = "alt";
pub const ATTR_FILE_SOURCE: &str = "filesource";
pub const ATTR_DATA_PATH: &str = "data-path";
pub const ATTR_DRAGGABLE: &str = "draggable";
pub const ATTR_MOD_DATE: &str = "data-mod-date";

/// CSS class given to canvases created by the patcher.
pub const CANVAS_CLASS: &str = "imgexport-canvas";

/// Which parts of the host view changed in one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    /// Whether the editor is in live preview mode.
    pub live_preview: bool,
    pub doc_changed: bool,
    pub viewport_changed: bool,
    pub geometry_changed: bool,
    pub selection_set: bool,
}

impl ViewUpdate {
    /// Selection changes alone never trigger a patch pass.
    pub fn is_relevant(&self) -> bool {
        self.live_preview && (self.doc_changed || self.viewport_changed || self.geometry_changed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanvasId(pub u64);

/// Canvas placeholder inserted into an embed marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: CanvasId,
    pub class: String,
    pub attributes: IndexMap<String, String>,
    /// Token of the draw currently allowed to paint this canvas.
    pub draw_token: Option<u64>,
    pub frame: Option<DrawnFrame>,
}

impl CanvasNode {
    pub fn new(id: CanvasId) -> Self {
        Self {
            id,
            class: CANVAS_CLASS.to_string(),
            attributes: IndexMap::new(),
            draw_token: None,
            frame: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Data attached to a drag started on this canvas, keyed by transfer type.
    ///
    /// The payload is path based so a drop re-links the file instead of copying
    /// the rendered image.
    pub fn drag_payload(&self) -> Option<Vec<(&'static str, String)>> {
        let path = self.attribute(ATTR_DATA_PATH)?;
        Some(vec![
            ("line", path.to_string()),
            ("link", path.to_string()),
            ("text/plain", format!("![[{path}]]")),
            ("text/uri-list", path.to_string()),
        ])
    }
}

/// An embedded-file marker in the rendered document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedMarker {
    /// Link target of the embed, as written in the document.
    pub src: Option<String>,
    pub canvas: Option<CanvasNode>,
    pub title_hidden: bool,
    /// Clicks on the marker are stopped before reaching the host.
    pub suppress_click: bool,
}

impl EmbedMarker {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }
}

/// The rendered content of one editor view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedView {
    pub markers: Vec<EmbedMarker>,
}

impl EmbedView {
    pub fn new(markers: Vec<EmbedMarker>) -> Self {
        Self { markers }
    }

    pub fn canvas_mut(&mut self, id: CanvasId) -> Option<&mut CanvasNode> {
        self.markers
            .iter_mut()
            .filter_map(|marker| marker.canvas.as_mut())
            .find(|canvas| canvas.id == id)
    }
}
