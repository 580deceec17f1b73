//! Screens: navigable pages of rows with a cursor
//!
//! A screen owns its rows in insertion order and keeps exactly one of them
//! focused. Primary directional events either move the cursor or are
//! routed to the focused row, decided by asking the row first
//! ([`crate::row::can_handle`]).

use heapless::String;

use crate::event::{Event, EventFilter, Kind};
use crate::render::{RenderError, Renderer};
use crate::tree::{NavRequest, NodeId, Outcome, Tree, LINE_LEN};

/// Maximum rows per screen
pub const MAX_ROWS: usize = 8;

/// A navigable page
pub struct Screen<C> {
    pub(crate) title: &'static str,
    pub(crate) rows: heapless::Vec<NodeId, MAX_ROWS>,
    pub(crate) cursor: usize,
    pub(crate) wrap: bool,
    pub(crate) pinned_cursor: bool,
    pub(crate) popup: Option<NodeId>,
    pub(crate) sleeping: bool,
    pub(crate) filter: EventFilter,
    pub(crate) on_enter: Option<fn(&mut C)>,
    pub(crate) on_exit: Option<fn(&mut C)>,
}

impl<C> Screen<C> {
    pub(crate) fn new(title: &'static str) -> Self {
        Self {
            title,
            rows: heapless::Vec::new(),
            cursor: 0,
            wrap: true,
            pinned_cursor: false,
            popup: None,
            sleeping: false,
            filter: EventFilter::new(),
            on_enter: None,
            on_exit: None,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clamp instead of wrapping when the cursor runs off either end
    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    /// Keep the selected row on the first body line and rotate the rest
    pub fn set_pinned_cursor(&mut self, pinned: bool) {
        self.pinned_cursor = pinned;
    }

    /// Screen to switch to (via `overwrite_top`) instead of popping on
    /// Back, e.g. a save-confirmation page
    pub fn set_popup(&mut self, popup: NodeId) {
        self.popup = Some(popup);
    }

    pub fn on_enter(&mut self, callback: fn(&mut C)) {
        self.on_enter = Some(callback);
    }

    pub fn on_exit(&mut self, callback: fn(&mut C)) {
        self.on_exit = Some(callback);
    }

    pub(crate) fn active_row(&self) -> Option<NodeId> {
        self.rows.get(self.cursor).copied()
    }

    /// Move the cursor one step in the event's direction, wrapping modulo
    /// the row count or clamping at the ends.
    pub(crate) fn move_cursor(&mut self, ev: &Event) {
        let count = self.rows.len();
        if count == 0 {
            return;
        }
        let next = self.cursor as i32 + ev.kind.direction();
        self.cursor = if next < 0 {
            if self.wrap {
                count - 1
            } else {
                0
            }
        } else if next as usize >= count {
            if self.wrap {
                0
            } else {
                count - 1
            }
        } else {
            next as usize
        };
    }
}

///////////////////////////////////////////////////////////////////
// Event handling
///////////////////////////////////////////////////////////////////

pub(crate) fn handle_event<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    // Bound accessory controls registered on the screen route straight to
    // the focused row
    if tree.filter_accepts(id, &ev) {
        if let Some(row) = tree.screen(id).active_row() {
            return tree.handle_event(row, ev, ctx);
        }
    }

    match ev.kind {
        Kind::Sync => {
            sync(tree, id, ctx);
            Outcome::Handled
        }
        Kind::Back => handle_nav_back(tree, id, ev, ctx),
        Kind::Select => handle_nav_select(tree, id, ev, ctx),
        k if k.is_directional() => handle_nav_delta(tree, id, ev, ctx),
        _ => Outcome::Handled,
    }
}

fn handle_nav_select<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    if let Some(row) = tree.screen(id).active_row() {
        if tree.can_handle(row, &ev) {
            return tree.handle_event(row, ev, ctx);
        }
    }
    Outcome::Handled
}

fn handle_nav_back<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    if let Some(row) = tree.screen(id).active_row() {
        if tree.can_handle(row, &ev) {
            return tree.handle_event(row, ev, ctx);
        }
    }

    match tree.screen(id).popup {
        Some(popup) => Outcome::Nav(NavRequest::Replace(popup)),
        None => Outcome::Nav(NavRequest::Pop),
    }
}

fn handle_nav_delta<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    let row = tree.screen(id).active_row();
    if let Some(row) = row {
        if tree.can_handle(row, &ev) {
            return tree.handle_event(row, ev, ctx);
        }
    }

    if tree.is_primary(&ev) {
        // The focused row refused the event; it moves the cursor instead
        if let Some(row) = row {
            tree.lose_focus(row, ctx);
        }
        tree.screen_mut(id).move_cursor(&ev);
        if let Some(row) = tree.screen(id).active_row() {
            tree.get_focus(row, ctx);
        }
        return Outcome::Handled;
    }

    Outcome::Handled
}

///////////////////////////////////////////////////////////////////
// Lifecycle
///////////////////////////////////////////////////////////////////

pub(crate) fn handle_enter<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let active = tree.screen(id).active_row();
    for n in 0..tree.screen(id).rows.len() {
        let row = tree.screen(id).rows[n];
        if Some(row) == active {
            tree.get_focus(row, ctx);
        } else {
            tree.sync(row, ctx);
        }
    }
    if let Some(callback) = tree.screen(id).on_enter {
        callback(ctx);
    }
}

pub(crate) fn handle_exit<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    for n in 0..tree.screen(id).rows.len() {
        let row = tree.screen(id).rows[n];
        tree.lose_focus(row, ctx);
    }
    if let Some(callback) = tree.screen(id).on_exit {
        callback(ctx);
    }
}

/// Refresh every row from the model. The focused row is blurred and
/// re-focused around the refresh so highlight state stays consistent, but
/// never while it is mid-edit.
pub(crate) fn sync<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let active = tree.screen(id).active_row();
    let refocus = match active {
        Some(row) => !tree.is_editing(row),
        None => false,
    };

    if refocus {
        if let Some(row) = active {
            tree.lose_focus(row, ctx);
        }
    }

    for n in 0..tree.screen(id).rows.len() {
        let row = tree.screen(id).rows[n];
        tree.sync(row, ctx);
    }

    if refocus {
        if let Some(row) = active {
            if tree.screen(id).active_row() == Some(row) {
                tree.get_focus(row, ctx);
            }
        }
    }
}

///////////////////////////////////////////////////////////////////
// Drawing
///////////////////////////////////////////////////////////////////

pub(crate) fn draw<C>(tree: &Tree<C>, id: NodeId, r: &mut dyn Renderer) -> Result<(), RenderError> {
    let screen = tree.screen(id);
    if screen.sleeping {
        return Ok(());
    }

    r.draw_text(0, 2, screen.title)?;

    let (cols, display_rows) = r.dimensions();
    let count = screen.rows.len();
    for n in 0..count {
        let line = (n + 1) as u8;
        if line >= display_rows {
            break;
        }
        let index = if screen.pinned_cursor {
            (screen.cursor + n) % count
        } else {
            n
        };
        let mut text: String<LINE_LEN> = String::new();
        let highlight = tree.format_row_line(screen.rows[index], &mut text);
        r.draw_text(line, 0, &text)?;
        if let Some((start, end)) = highlight {
            r.invert_region(line, start, end.min(cols))?;
        }
    }
    Ok(())
}
