#![warn(missing_docs)]
//! Reader Panels - Tiled Editor Panels for `reader-core`
//!
//! # Overview
//!
//! This crate connects `reader-core` views to a page and a layout engine:
//!
//! - [`host`] - the host document contract (embedded source and annotation blocks)
//! - [`config`] - reader configuration (column encoding, startup layout, theme)
//! - [`panel`] - the panel host state machine and navigation queue
//!
//! # Quick Start
//!
//! ```rust
//! use reader_panels::{ContainerHandle, HostDocument, LayoutCommand, PanelHost};
//! use serde_json::json;
//!
//! let document = HostDocument::from_value(json!({
//!     "main": 1,
//!     "scripts": [
//!         { "id": 1, "type": "source", "path": "main.c", "data": ["#include \"a.h\""] },
//!         { "id": 1, "type": "link", "data": [1, 10, 1, 15, 2] },
//!         { "id": 1, "type": "semantics", "data": [] }
//!     ]
//! }))
//! .unwrap();
//!
//! let mut host = PanelHost::new(document);
//! let container = ContainerHandle::new(1);
//! for config in host.initial_layout() {
//!     host.bind(container, &config).unwrap();
//! }
//! assert_eq!(host.panel(container).unwrap().title(), "main.c");
//!
//! let command = host.follow_link(container, 10).unwrap();
//! assert!(matches!(command, Some(LayoutCommand::AddComponent(_))));
//! assert_eq!(host.drain_layout_commands().len(), 1);
//! ```

pub mod config;
pub mod host;
pub mod panel;

pub use config::{ConfigError, LayoutConfig, ReaderConfig};
pub use host::{FileRecord, HostDocument, HostError, Script, ScriptType};
pub use panel::{
    ComponentConfig, ComponentKind, ComponentState, ContainerHandle, ElementStyle, LayoutCommand,
    Panel, PanelError, PanelHost, PanelRect, PanelState,
};
