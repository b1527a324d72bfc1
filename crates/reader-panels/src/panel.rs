//! Panel host: binds layout containers to editor panels.
//!
//! The layout engine (tabs, tiles, drag-resize) lives outside this crate. It owns opaque
//! containers and drives the host through callbacks:
//!
//! - [`PanelHost::bind`] when a container needs a component, [`PanelHost::unbind`] when it closes
//! - [`PanelHost::begin_layout_pass`], then per container [`PanelHost::set_rect`],
//!   [`PanelHost::set_visibility`] and [`PanelHost::set_z_index`]
//!
//! A panel moves through `unbound → bound → positioned → destroyed`. Every callback addressing a
//! container without a panel fails with [`PanelError::MissingComponent`].
//!
//! Navigation flows the other way: a view emits [`OpenFile`], the host turns it into a
//! [`LayoutCommand`] and queues it. The layout engine drains the queue between callbacks, so the
//! panel registry is never mutated while the engine iterates it.

use crate::config::ReaderConfig;
use crate::host::{HostDocument, HostError};
use reader_core::{DecoderConfig, FileId, OpenFile, SourceView, Tooltip};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::fmt::Write as _;
use thiserror::Error;

/// Opaque identifier of a layout container, allocated by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerHandle(u64);

impl ContainerHandle {
    /// Wrap a layout-engine container id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container({})", self.0)
    }
}

/// Registered component kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Read-only source editor.
    #[default]
    Editor,
}

/// Per-component state carried by the layout configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentState {
    /// File to show; `None` means the main file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FileId>,
}

/// A layout item describing one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    /// Component kind.
    pub component_type: ComponentKind,
    /// Component state.
    #[serde(default)]
    pub component_state: ComponentState,
}

impl ComponentConfig {
    /// An editor component for `id` (or the main file).
    pub fn editor(id: Option<FileId>) -> Self {
        Self {
            component_type: ComponentKind::Editor,
            component_state: ComponentState { id },
        }
    }
}

/// A request from the host to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCommand {
    /// Bring an existing container to the front.
    Focus(ContainerHandle),
    /// Create a container for a new component.
    AddComponent(ComponentConfig),
}

/// A rectangle in page coordinates (pixels, or cells for terminal hosts).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PanelRect {
    /// Create a rectangle.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Inline style of a panel's root element. Position is relative to the host root.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementStyle {
    /// Left offset from the root.
    pub left: Option<f64>,
    /// Top offset from the root.
    pub top: Option<f64>,
    /// Width.
    pub width: Option<f64>,
    /// Height.
    pub height: Option<f64>,
    /// `display: none`.
    pub hidden: bool,
    /// Stacking order.
    pub z_index: Option<i32>,
}

impl ElementStyle {
    /// Render as an inline `style` attribute.
    pub fn to_css_text(&self) -> String {
        let mut out = String::from("position: absolute; overflow: hidden;");
        let lengths = [
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ];
        for (property, value) in lengths {
            if let Some(value) = value {
                let _ = write!(out, " {property}: {value}px;");
            }
        }
        if self.hidden {
            out.push_str(" display: none;");
        }
        if let Some(z) = self.z_index {
            let _ = write!(out, " z-index: {z};");
        }
        out
    }
}

/// Lifecycle state of a live panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Created, not placed yet.
    Bound,
    /// At least one geometry callback was applied.
    Positioned,
}

/// An editor view bound to a container.
#[derive(Debug, Clone)]
pub struct Panel {
    container: ContainerHandle,
    kind: ComponentKind,
    file: FileId,
    title: String,
    view: SourceView,
    style: ElementStyle,
    state: PanelState,
}

impl Panel {
    /// Container the panel is bound to.
    pub fn container(&self) -> ContainerHandle {
        self.container
    }

    /// Component kind.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// File shown by the panel.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Container title (the file's display path).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The editor view.
    pub fn view(&self) -> &SourceView {
        &self.view
    }

    /// Root element style.
    pub fn style(&self) -> &ElementStyle {
        &self.style
    }

    /// Lifecycle state.
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Whether the panel is currently visible.
    pub fn is_visible(&self) -> bool {
        !self.style.hidden
    }
}

/// Panel host errors.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    /// Opening the panel's file failed.
    Host(#[from] HostError),

    #[error("missing component for {0}")]
    /// The container has no bound panel.
    MissingComponent(ContainerHandle),

    #[error("{0} already has a component")]
    /// The container is already bound.
    ContainerInUse(ContainerHandle),
}

/// Owns every live panel and mediates between views and the layout engine.
pub struct PanelHost {
    document: HostDocument,
    decoder: DecoderConfig,
    reuse_open_panels: bool,
    startup: Vec<ComponentConfig>,

    panels: BTreeMap<ContainerHandle, Panel>,
    root: PanelRect,
    commands: VecDeque<LayoutCommand>,
}

impl fmt::Debug for PanelHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHost")
            .field("panel_count", &self.panels.len())
            .field("root", &self.root)
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}

impl PanelHost {
    /// Create a host over `document` with default configuration.
    pub fn new(document: HostDocument) -> Self {
        Self::with_config(document, &ReaderConfig::default())
    }

    /// Create a host over `document`.
    pub fn with_config(document: HostDocument, config: &ReaderConfig) -> Self {
        Self {
            document,
            decoder: config.decoder(),
            reuse_open_panels: config.reuse_open_panels,
            startup: config.layout.content.clone(),
            panels: BTreeMap::new(),
            root: PanelRect::default(),
            commands: VecDeque::new(),
        }
    }

    /// The host document.
    pub fn document(&self) -> &HostDocument {
        &self.document
    }

    /// Components to open at startup.
    pub fn initial_layout(&self) -> Vec<ComponentConfig> {
        if self.startup.is_empty() {
            vec![ComponentConfig::editor(None)]
        } else {
            self.startup.clone()
        }
    }

    /// Number of live panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Returns `true` if no panel is bound.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// The panel bound to `container`, if any.
    pub fn panel(&self, container: ContainerHandle) -> Option<&Panel> {
        self.panels.get(&container)
    }

    /// Live panels, ordered by container.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    /// The container showing `file`, if one is open.
    pub fn container_for_file(&self, file: FileId) -> Option<ContainerHandle> {
        self.panels
            .values()
            .find(|panel| panel.file == file)
            .map(|panel| panel.container)
    }

    fn get(&self, container: ContainerHandle) -> Result<&Panel, PanelError> {
        self.panels
            .get(&container)
            .ok_or(PanelError::MissingComponent(container))
    }

    fn get_mut(&mut self, container: ContainerHandle) -> Result<&mut Panel, PanelError> {
        self.panels
            .get_mut(&container)
            .ok_or(PanelError::MissingComponent(container))
    }

    /// Create the component described by `config` and bind it to `container`.
    ///
    /// Decoding runs synchronously. A failure leaves the container unbound and every other panel
    /// untouched. Annotation kinds that fail to decode do not fail the bind; they are left out of
    /// the view (see [`SourceView::failures`]).
    pub fn bind(
        &mut self,
        container: ContainerHandle,
        config: &ComponentConfig,
    ) -> Result<&Panel, PanelError> {
        if self.panels.contains_key(&container) {
            return Err(PanelError::ContainerInUse(container));
        }

        let panel = match config.component_type {
            ComponentKind::Editor => self.editor_factory(container, &config.component_state)?,
        };
        tracing::debug!(
            %container,
            file = %panel.file,
            path = %panel.title,
            "bound panel"
        );

        Ok(self.panels.entry(container).or_insert(panel))
    }

    fn editor_factory(
        &self,
        container: ContainerHandle,
        state: &ComponentState,
    ) -> Result<Panel, PanelError> {
        let file = match state.id {
            Some(id) => id,
            None => self.document.default_id()?,
        };
        let record = self.document.record(file)?;
        let index = record.line_index()?;
        let view = SourceView::new(index, self.decoder, &record.annotations);

        Ok(Panel {
            container,
            kind: ComponentKind::Editor,
            file,
            title: record.path.to_string(),
            view,
            style: ElementStyle::default(),
            state: PanelState::Bound,
        })
    }

    /// Detach and destroy the panel bound to `container`.
    pub fn unbind(&mut self, container: ContainerHandle) -> Result<Panel, PanelError> {
        let panel = self
            .panels
            .remove(&container)
            .ok_or(PanelError::MissingComponent(container))?;
        tracing::debug!(%container, file = %panel.file, "unbound panel");
        Ok(panel)
    }

    /// Record the root rectangle before a round of rect callbacks.
    pub fn begin_layout_pass(&mut self, root: PanelRect) {
        tracing::trace!(?root, "layout pass");
        self.root = root;
    }

    /// Place a panel. `rect` is in page coordinates; the style stores it relative to the root.
    pub fn set_rect(
        &mut self,
        container: ContainerHandle,
        rect: PanelRect,
    ) -> Result<(), PanelError> {
        let root = self.root;
        let panel = self.get_mut(container)?;
        panel.style.left = Some(rect.left - root.left);
        panel.style.top = Some(rect.top - root.top);
        panel.style.width = Some(rect.width);
        panel.style.height = Some(rect.height);
        panel.state = PanelState::Positioned;
        tracing::trace!(%container, ?rect, "rect");
        Ok(())
    }

    /// Show or hide a panel.
    pub fn set_visibility(
        &mut self,
        container: ContainerHandle,
        visible: bool,
    ) -> Result<(), PanelError> {
        let panel = self.get_mut(container)?;
        panel.style.hidden = !visible;
        panel.state = PanelState::Positioned;
        tracing::trace!(%container, visible, "visibility");
        Ok(())
    }

    /// Apply the layout engine's default z-index for the container's current logical layer.
    pub fn set_z_index(
        &mut self,
        container: ContainerHandle,
        default_z_index: i32,
    ) -> Result<(), PanelError> {
        let panel = self.get_mut(container)?;
        panel.style.z_index = Some(default_z_index);
        panel.state = PanelState::Positioned;
        tracing::trace!(%container, default_z_index, "z-index");
        Ok(())
    }

    /// Tooltip for the decoration under `pos` in the panel's document.
    pub fn hover(
        &self,
        container: ContainerHandle,
        pos: usize,
    ) -> Result<Option<Tooltip>, PanelError> {
        let panel = self.get(container)?;
        Ok(panel.view.decorations().hover(pos, &self.document))
    }

    /// Activate the link under `pos`, queueing the resulting layout command.
    pub fn follow_link(
        &mut self,
        container: ContainerHandle,
        pos: usize,
    ) -> Result<Option<LayoutCommand>, PanelError> {
        let request = self.get(container)?.view.decorations().follow(pos);
        match request {
            Some(request) => self.dispatch(container, request).map(Some),
            None => Ok(None),
        }
    }

    /// Handle a navigation request emitted by the panel bound to `container`.
    ///
    /// With panel reuse enabled, a file that is already open gets focused; otherwise a new
    /// component of the same kind as the emitting panel is requested.
    pub fn dispatch(
        &mut self,
        container: ContainerHandle,
        request: OpenFile,
    ) -> Result<LayoutCommand, PanelError> {
        let kind = self.get(container)?.kind;

        let target = request.id.or_else(|| self.document.default_id().ok());
        let existing = target
            .filter(|_| self.reuse_open_panels)
            .and_then(|file| self.container_for_file(file));

        let command = match existing {
            Some(open) => LayoutCommand::Focus(open),
            None => LayoutCommand::AddComponent(ComponentConfig {
                component_type: kind,
                component_state: ComponentState { id: request.id },
            }),
        };
        tracing::debug!(%container, ?request, ?command, "open file");
        self.commands.push_back(command);
        Ok(command)
    }

    /// Take every queued layout command, oldest first.
    pub fn drain_layout_commands(&mut self) -> Vec<LayoutCommand> {
        self.commands.drain(..).collect()
    }
}
