//! A minimal tab/tile layout engine for the terminal.
//!
//! Owns container handles and drives the panel host's callbacks: bind on add, unbind on close,
//! and one geometry pass (rect, visibility, z-order) per frame.

use reader_panels::{
    ComponentConfig, ContainerHandle, LayoutCommand, Panel, PanelError, PanelHost, PanelRect,
};

/// How containers share the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// One visible container at a time, with a tab bar on the first row.
    Tabs,
    /// Every container visible, side by side.
    Tiles,
}

/// Container order, focus and arrangement.
#[derive(Debug)]
pub struct TileLayout {
    next_id: u64,
    containers: Vec<ContainerHandle>,
    active: usize,
    arrangement: Arrangement,
}

impl TileLayout {
    /// Create an empty layout showing tabs.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            containers: Vec::new(),
            active: 0,
            arrangement: Arrangement::Tabs,
        }
    }

    /// Containers in display order.
    pub fn containers(&self) -> &[ContainerHandle] {
        &self.containers
    }

    /// The focused container.
    pub fn active(&self) -> Option<ContainerHandle> {
        self.containers.get(self.active).copied()
    }

    /// Current arrangement.
    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    /// Switch between tabs and tiles.
    pub fn toggle_arrangement(&mut self) {
        self.arrangement = match self.arrangement {
            Arrangement::Tabs => Arrangement::Tiles,
            Arrangement::Tiles => Arrangement::Tabs,
        };
    }

    /// Focus the next container, wrapping around.
    pub fn next_tab(&mut self) {
        if !self.containers.is_empty() {
            self.active = (self.active + 1) % self.containers.len();
        }
    }

    /// Focus `container`. Returns `false` if the layout does not own it.
    pub fn focus(&mut self, container: ContainerHandle) -> bool {
        match self.containers.iter().position(|c| *c == container) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Create a container for `config` and bind it. The container is dropped if binding fails.
    pub fn add(
        &mut self,
        host: &mut PanelHost,
        config: &ComponentConfig,
    ) -> Result<ContainerHandle, PanelError> {
        let container = ContainerHandle::new(self.next_id);
        self.next_id += 1;

        host.bind(container, config)?;
        self.containers.push(container);
        self.active = self.containers.len() - 1;
        Ok(container)
    }

    /// Close the focused container.
    pub fn close_active(&mut self, host: &mut PanelHost) -> Result<Option<Panel>, PanelError> {
        if self.containers.is_empty() {
            return Ok(None);
        }
        let container = self.containers.remove(self.active);
        if self.active >= self.containers.len() {
            self.active = self.containers.len().saturating_sub(1);
        }
        host.unbind(container).map(Some)
    }

    /// Apply a command from the host.
    pub fn execute(
        &mut self,
        host: &mut PanelHost,
        command: LayoutCommand,
    ) -> Result<(), PanelError> {
        match command {
            LayoutCommand::Focus(container) => {
                if !self.focus(container) {
                    return Err(PanelError::MissingComponent(container));
                }
            }
            LayoutCommand::AddComponent(config) => {
                self.add(host, &config)?;
            }
        }
        Ok(())
    }

    /// Drain and apply every queued host command, returning the failures.
    pub fn run_pending(&mut self, host: &mut PanelHost) -> Vec<PanelError> {
        host.drain_layout_commands()
            .into_iter()
            .filter_map(|command| self.execute(host, command).err())
            .collect()
    }

    /// Run one geometry pass over `area`.
    pub fn arrange(&self, host: &mut PanelHost, area: PanelRect) -> Result<(), PanelError> {
        host.begin_layout_pass(area);
        if self.containers.is_empty() {
            return Ok(());
        }

        match self.arrangement {
            Arrangement::Tabs => {
                let content = PanelRect::new(
                    area.left,
                    area.top + 1.0,
                    area.width,
                    (area.height - 1.0).max(0.0),
                );
                for (index, container) in self.containers.iter().enumerate() {
                    let active = index == self.active;
                    host.set_rect(*container, content)?;
                    host.set_visibility(*container, active)?;
                    host.set_z_index(*container, if active { 1 } else { 0 })?;
                }
            }
            Arrangement::Tiles => {
                let count = self.containers.len() as f64;
                let width = (area.width / count).floor();
                for (index, container) in self.containers.iter().enumerate() {
                    let left = area.left + width * index as f64;
                    // The last tile takes the remainder.
                    let tile_width = if index + 1 == self.containers.len() {
                        area.left + area.width - left
                    } else {
                        width
                    };
                    host.set_rect(
                        *container,
                        PanelRect::new(left, area.top, tile_width, area.height),
                    )?;
                    host.set_visibility(*container, true)?;
                    host.set_z_index(*container, 0)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::new()
    }
}
