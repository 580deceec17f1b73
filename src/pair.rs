//! Two rows bundled as one atomic editing unit
//!
//! A pair is driven by two dedicated encoders rather than by focus:
//! directional events route by control index to the left or right side,
//! and focus/edit/sync/commit are always broadcast to both sides together.
//! There is no per-side focus state.

use crate::event::{Event, EventFilter, Kind, Source};
use crate::row;
use crate::tree::{NavRequest, NodeId, Outcome, Tree};

/// Two rows edited as one unit
pub struct Pair<C> {
    pub(crate) label: &'static str,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) left_index: u8,
    pub(crate) right_index: u8,
    pub(crate) active: bool,
    pub(crate) editing: bool,
    pub(crate) hover_to_edit: bool,
    pub(crate) live_update: bool,
    pub(crate) cancel_on_back: bool,
    pub(crate) filter: EventFilter,
    pub(crate) on_select: Option<fn(&mut C)>,
}

impl<C> Pair<C> {
    pub(crate) fn new(
        label: &'static str,
        left: NodeId,
        right: NodeId,
        left_index: u8,
        right_index: u8,
    ) -> Self {
        Self {
            label,
            left,
            right,
            left_index,
            right_index,
            active: false,
            editing: false,
            hover_to_edit: false,
            live_update: true,
            cancel_on_back: false,
            filter: EventFilter::new(),
            on_select: None,
        }
    }

    pub fn left(&self) -> NodeId {
        self.left
    }

    pub fn right(&self) -> NodeId {
        self.right
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn on_select(&mut self, callback: fn(&mut C)) {
        self.on_select = Some(callback);
    }
}

///////////////////////////////////////////////////////////////////
// Coupled configuration
//
// The three flags are interdependent across both sides: hover editing
// implies live commits, and a live-committed value cannot be reverted.
///////////////////////////////////////////////////////////////////

pub(crate) fn set_hover_to_edit<C>(tree: &mut Tree<C>, id: NodeId, enable: bool) {
    let (left, right) = sides(tree, id);
    tree.pair_mut(id).hover_to_edit = enable;
    tree.row_mut(left).set_hover_to_edit(enable);
    tree.row_mut(right).set_hover_to_edit(enable);
    if enable {
        set_live_update(tree, id, true);
    }
}

pub(crate) fn set_live_update<C>(tree: &mut Tree<C>, id: NodeId, enable: bool) {
    let (left, right) = sides(tree, id);
    tree.pair_mut(id).live_update = enable;
    tree.row_mut(left).set_live_update(enable);
    tree.row_mut(right).set_live_update(enable);
    if enable {
        let pair = tree.pair_mut(id);
        pair.cancel_on_back = false;
    }
}

pub(crate) fn set_cancel_on_back<C>(tree: &mut Tree<C>, id: NodeId, enable: bool) {
    let (left, right) = sides(tree, id);
    tree.pair_mut(id).cancel_on_back = enable;
    tree.row_mut(left).set_cancel_on_back(enable);
    tree.row_mut(right).set_cancel_on_back(enable);
    if enable {
        set_live_update(tree, id, false);
    }
}

fn sides<C>(tree: &Tree<C>, id: NodeId) -> (NodeId, NodeId) {
    let pair = tree.pair(id);
    (pair.left, pair.right)
}

///////////////////////////////////////////////////////////////////
// Event handling
///////////////////////////////////////////////////////////////////

pub(crate) fn handle_event<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    match ev.kind {
        Kind::Sync => {
            sync(tree, id, ctx);
            Outcome::Handled
        }
        Kind::Back => handle_nav_back(tree, id, ctx),
        Kind::Select => handle_nav_select(tree, id, ctx),
        k if k.is_directional() => handle_nav_delta(tree, id, ev, ctx),
        _ => Outcome::Handled,
    }
}

fn handle_nav_delta<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    if ev.source == Source::Encoder {
        let (left, right, left_index, right_index) = {
            let pair = tree.pair(id);
            (pair.left, pair.right, pair.left_index, pair.right_index)
        };
        if ev.index == left_index {
            tree.handle_event(left, ev, ctx);
            return Outcome::Handled;
        }
        if ev.index == right_index {
            tree.handle_event(right, ev, ctx);
            return Outcome::Handled;
        }
    }
    Outcome::Handled
}

fn handle_nav_select<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) -> Outcome {
    let (hover_to_edit, live_update) = {
        let pair = tree.pair(id);
        (pair.hover_to_edit, pair.live_update)
    };

    if !hover_to_edit {
        if tree.pair(id).editing {
            stop_editing(tree, id, ctx);
        } else {
            start_editing(tree, id, ctx);
        }
        return Outcome::Handled;
    }

    if !live_update {
        commit_edit(tree, id, ctx);
        return Outcome::Handled;
    }

    if let Some(callback) = tree.pair(id).on_select {
        callback(ctx);
    }
    Outcome::Handled
}

fn handle_nav_back<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) -> Outcome {
    if !tree.pair(id).editing {
        return Outcome::Nav(NavRequest::Pop);
    }

    stop_editing(tree, id, ctx);
    if tree.pair(id).hover_to_edit {
        return Outcome::Nav(NavRequest::Pop);
    }
    Outcome::Handled
}

/// A pair only wants Select from the primary control; its own encoders
/// and any other accessory events always route through.
pub(crate) fn can_handle<C>(tree: &Tree<C>, id: NodeId, ev: &Event) -> bool {
    if tree.is_primary(ev) {
        return ev.kind == Kind::Select;
    }
    let _ = id;
    true
}

///////////////////////////////////////////////////////////////////
// Broadcast state transitions
///////////////////////////////////////////////////////////////////

pub(crate) fn get_focus<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    tree.pair_mut(id).active = true;
    row::get_focus(tree, left, ctx);
    row::get_focus(tree, right, ctx);
    if tree.pair(id).hover_to_edit {
        start_editing(tree, id, ctx);
    }
}

pub(crate) fn lose_focus<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    row::lose_focus(tree, left, ctx);
    row::lose_focus(tree, right, ctx);
    stop_editing(tree, id, ctx);
    tree.pair_mut(id).active = false;
}

pub(crate) fn start_editing<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    row::start_editing(tree, left, ctx);
    row::start_editing(tree, right, ctx);
    tree.pair_mut(id).editing = true;
}

pub(crate) fn stop_editing<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    row::stop_editing(tree, left, ctx);
    row::stop_editing(tree, right, ctx);
    tree.pair_mut(id).editing = false;
}

pub(crate) fn commit_edit<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    row::commit_edit(tree, left, ctx);
    row::commit_edit(tree, right, ctx);
}

pub(crate) fn cancel_edit<C>(tree: &mut Tree<C>, id: NodeId) {
    let (left, right) = sides(tree, id);
    row::cancel_edit(tree, left);
    row::cancel_edit(tree, right);
}

pub(crate) fn sync<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    let (left, right) = sides(tree, id);
    row::sync(tree, left, ctx);
    row::sync(tree, right, ctx);
}
