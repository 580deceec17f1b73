//! Event routing and menu navigation for encoder-driven device UIs
//!
//! This crate contains the hardware-agnostic half of a small-display menu
//! system: normalized input events fan out through an [`router::Router`]
//! to a tree of screens, rows, and value fields, and frames are emitted
//! through the [`render::Renderer`] trait. Input scanning, debouncing,
//! and the display bus live in the driver that owns the [`ui::Ui`].
//!
//! - Normalized events with wildcard filters ([`event`])
//! - Bounded navigation stack, root never popped ([`stack`])
//! - Binding tables and the ordered dispatch pipeline ([`router`])
//! - Screens with cursor navigation ([`screen`])
//! - Rows with hover/edit state ([`row`]), twin-encoder pairs ([`pair`])
//! - Double-buffered numeric fields ([`field`])
//! - Toggles, triggers, and static notes ([`element`])

#![no_std]
#![deny(unsafe_code)]

pub mod element;
pub mod event;
pub mod field;
pub mod pair;
pub mod render;
pub mod router;
pub mod row;
pub mod screen;
pub mod stack;
pub mod tree;
pub mod ui;

pub use element::{Note, Toggle, Trigger};
pub use event::{Event, EventFilter, Kind, Source};
pub use field::Field;
pub use render::{RenderError, Renderer};
pub use router::Router;
pub use screen::Screen;
pub use stack::{NavStack, STACK_DEPTH};
pub use tree::{NodeId, Tree};
pub use ui::Ui;

/// Construction-time capacity errors
///
/// All collections are bounded and sized at build time; running into a
/// capacity is a configuration problem, reported when the tree or the
/// binding tables are assembled rather than during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The node arena is at capacity
    TreeFull,
    /// The screen already holds its maximum number of rows
    ScreenFull,
    /// The node's event filter is at capacity
    FilterFull,
    /// The binding table is at capacity
    BindingsFull,
}
