//! Node-graph editor for composing space-station layouts.

mod alert;
mod canvas;
pub mod catalog;
mod clock;
mod component;
pub mod designer;
pub mod error;
pub mod persistence;
mod placement;
mod render;
pub mod selection;
pub mod state;
pub mod types;
mod viewport;

pub use component::StationDesignerView;
