//! Row focus/edit state machine
//!
//! A row wraps one child element (or one linked sub-screen) and owns the
//! Inactive → Active-Viewing → Active-Editing lifecycle for it. The parent
//! screen consults [`can_handle`] before every primary-control event to
//! choose between routing to the row and moving its own cursor.

use crate::event::{Event, EventFilter, Kind};
use crate::tree::{NavRequest, NodeId, Outcome, Tree};

/// One focusable/editable line of a screen
pub struct Row<C> {
    pub(crate) label: &'static str,
    pub(crate) child: Option<NodeId>,
    pub(crate) submenu: Option<NodeId>,
    pub(crate) active: bool,
    pub(crate) editing: bool,
    pub(crate) hover_to_edit: bool,
    pub(crate) live_update: bool,
    pub(crate) cancel_on_back: bool,
    pub(crate) filter: EventFilter,
    pub(crate) on_focus: Option<fn(&mut C)>,
    pub(crate) on_blur: Option<fn(&mut C)>,
    pub(crate) on_select: Option<fn(&mut C)>,
    pub(crate) on_back: Option<fn(&mut C)>,
    pub(crate) on_delta: Option<fn(&mut C, Event)>,
}

impl<C> Row<C> {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            child: None,
            submenu: None,
            active: false,
            editing: false,
            hover_to_edit: false,
            live_update: true,
            cancel_on_back: false,
            filter: EventFilter::new(),
            on_focus: None,
            on_blur: None,
            on_select: None,
            on_back: None,
            on_delta: None,
        }
    }

    pub(crate) fn with_child(label: &'static str, child: NodeId) -> Self {
        let mut row = Self::new(label);
        row.child = Some(child);
        row
    }

    pub(crate) fn with_submenu(label: &'static str, submenu: NodeId) -> Self {
        let mut row = Self::new(label);
        row.submenu = Some(submenu);
        row
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Start editing as soon as the cursor lands on this row
    pub fn set_hover_to_edit(&mut self, enable: bool) {
        self.hover_to_edit = enable;
    }

    /// Commit every delta immediately. A committed-on-every-change value
    /// cannot be reverted, so enabling this clears `cancel_on_back`.
    pub fn set_live_update(&mut self, enable: bool) {
        self.live_update = enable;
        if enable {
            self.cancel_on_back = false;
        }
    }

    /// Revert instead of committing when editing ends via Back
    pub fn set_cancel_on_back(&mut self, enable: bool) {
        self.cancel_on_back = enable;
        if enable {
            self.live_update = false;
        }
    }

    pub fn on_focus(&mut self, callback: fn(&mut C)) {
        self.on_focus = Some(callback);
    }

    pub fn on_blur(&mut self, callback: fn(&mut C)) {
        self.on_blur = Some(callback);
    }

    pub fn on_select(&mut self, callback: fn(&mut C)) {
        self.on_select = Some(callback);
    }

    pub fn on_back(&mut self, callback: fn(&mut C)) {
        self.on_back = Some(callback);
    }

    pub fn on_delta(&mut self, callback: fn(&mut C, Event)) {
        self.on_delta = Some(callback);
    }
}

///////////////////////////////////////////////////////////////////
// Event handling
///////////////////////////////////////////////////////////////////

pub(crate) fn handle_event<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    // The child gets first crack at events it filters in. Anything not on
    // the primary control only reached this row because someone routed it
    // here deliberately, so offer it to the child regardless.
    if let Some(child) = tree.row(id).child {
        if tree.can_handle(child, &ev) || !tree.is_primary(&ev) {
            return tree.handle_event(child, ev, ctx);
        }
    }

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

fn handle_nav_select<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) -> Outcome {
    let (submenu, hover_to_edit, live_update) = {
        let row = tree.row(id);
        (row.submenu, row.hover_to_edit, row.live_update)
    };

    // Explicit activation of a linked sub-screen
    if let Some(submenu) = submenu {
        return Outcome::Nav(NavRequest::Push(submenu));
    }

    if !hover_to_edit {
        toggle_editing(tree, id, ctx);
        return Outcome::Handled;
    }

    if !live_update {
        // Explicit save gesture
        commit_edit(tree, id, ctx);
        return Outcome::Handled;
    }

    if let Some(callback) = tree.row(id).on_select {
        callback(ctx);
    }
    Outcome::Handled
}

fn handle_nav_back<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) -> Outcome {
    if !tree.row(id).editing {
        return Outcome::Nav(NavRequest::Pop);
    }

    stop_editing(tree, id, ctx);
    if tree.row(id).hover_to_edit {
        // Hover rows have no separate idle-viewing state to return to
        return Outcome::Nav(NavRequest::Pop);
    }

    if let Some(callback) = tree.row(id).on_back {
        callback(ctx);
    }
    Outcome::Handled
}

fn handle_nav_delta<C>(tree: &mut Tree<C>, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
    let (child, editing, live_update) = {
        let row = tree.row(id);
        (row.child, row.editing, row.live_update)
    };

    if editing {
        if let Some(child) = child {
            if ev.kind.is_directional() {
                tree.handle_event(child, ev, ctx);
            }
            if live_update {
                tree.commit(child, ctx);
            }
            return Outcome::Handled;
        }
    }

    if let Some(callback) = tree.row(id).on_delta {
        callback(ctx, ev);
    }
    Outcome::Handled
}

/// Whether this row would consume the event, as seen by the parent screen
pub(crate) fn can_handle<C>(tree: &Tree<C>, id: NodeId, ev: &Event) -> bool {
    let row = tree.row(id);

    // The child may have filtered in a specific accessory event
    if let Some(child) = row.child {
        if tree.can_handle(child, ev) {
            return true;
        }
    }

    // Accessory controls always route through to the focused row
    if !tree.is_primary(ev) {
        return true;
    }

    match ev.kind {
        // Rows always get first refusal on Select
        Kind::Select => true,
        // The screen consumes Back to navigate unless an explicit edit is
        // in progress
        Kind::Back => !row.hover_to_edit && row.editing,
        // Directional events adjust the value while editing; otherwise the
        // screen keeps them to move its cursor
        k if k.is_directional() => !row.hover_to_edit && row.editing,
        _ => false,
    }
}

///////////////////////////////////////////////////////////////////
// State transitions
///////////////////////////////////////////////////////////////////

pub(crate) fn get_focus<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    tree.row_mut(id).active = true;
    if tree.row(id).hover_to_edit {
        start_editing(tree, id, ctx);
    } else {
        focus_child(tree, id, ctx);
    }
    // Resync before any user callback observes the focus change
    sync(tree, id, ctx);
    if let Some(callback) = tree.row(id).on_focus {
        callback(ctx);
    }
}

pub(crate) fn lose_focus<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    stop_editing(tree, id, ctx);
    tree.row_mut(id).active = false;
    if let Some(callback) = tree.row(id).on_blur {
        callback(ctx);
    }
}

pub(crate) fn start_editing<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    if let Some(child) = tree.row(id).child {
        if tree.is_data_field(child) {
            tree.focus(child, ctx);
        }
    }
    tree.row_mut(id).editing = true;
}

pub(crate) fn stop_editing<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    // Ending an edit that never started must not touch the field: a blur
    // while viewing would otherwise push the working value over model
    // state a pending sync is about to read
    if !tree.row(id).editing {
        return;
    }
    let (child, cancel_on_back) = {
        let row = tree.row(id);
        (row.child, row.cancel_on_back)
    };
    if let Some(child) = child {
        if tree.is_data_field(child) {
            if cancel_on_back {
                tree.cancel(child);
            } else {
                tree.commit(child, ctx);
            }
            tree.blur(child);
        }
    }
    tree.row_mut(id).editing = false;
}

pub(crate) fn toggle_editing<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    if tree.row(id).editing {
        stop_editing(tree, id, ctx);
    } else {
        start_editing(tree, id, ctx);
    }
}

pub(crate) fn commit_edit<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    if let Some(child) = tree.row(id).child {
        tree.commit(child, ctx);
    }
}

pub(crate) fn cancel_edit<C>(tree: &mut Tree<C>, id: NodeId) {
    if let Some(child) = tree.row(id).child {
        tree.cancel(child);
    }
}

fn focus_child<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    if let Some(child) = tree.row(id).child {
        tree.focus(child, ctx);
    }
}

pub(crate) fn sync<C>(tree: &mut Tree<C>, id: NodeId, ctx: &mut C) {
    if let Some(child) = tree.row(id).child {
        tree.sync(child, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Source;
    use crate::field::Field;

    struct Model {
        stored: i32,
    }

    fn setup() -> (Tree<Model>, NodeId, NodeId, Model) {
        let mut tree = Tree::new();
        let screen = tree.add_screen("home").unwrap();
        let row = tree
            .add_field(
                screen,
                Field::new("gain", 5, 0, 10, 1)
                    .with_getter(|m: &mut Model| m.stored)
                    .with_setter(|m: &mut Model, v| m.stored = v),
            )
            .unwrap();
        (tree, screen, row, Model { stored: 5 })
    }

    fn nav(kind: Kind) -> Event {
        Event::new(Source::Encoder, kind, 0)
    }

    #[test]
    fn test_focus_then_edit_then_commit() {
        let (mut tree, _screen, row, mut ctx) = setup();
        get_focus(&mut tree, row, &mut ctx);
        assert!(tree.row(row).is_active());
        assert!(!tree.row(row).is_editing());

        // Select toggles into editing
        let out = handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        assert_eq!(out, Outcome::Handled);
        assert!(tree.row(row).is_editing());

        // Deltas reach the field; live_update commits immediately
        handle_event(&mut tree, row, nav(Kind::NavRight), &mut ctx);
        assert_eq!(tree.field(row).value(), 6);
        assert_eq!(ctx.stored, 6);
    }

    #[test]
    fn test_deltas_ignored_while_viewing() {
        let (mut tree, _screen, row, mut ctx) = setup();
        get_focus(&mut tree, row, &mut ctx);
        handle_event(&mut tree, row, nav(Kind::NavRight), &mut ctx);
        assert_eq!(tree.field(row).value(), 5);
    }

    #[test]
    fn test_cancel_on_back_reverts() {
        let (mut tree, _screen, row, mut ctx) = setup();
        tree.row_mut(row).set_cancel_on_back(true);
        get_focus(&mut tree, row, &mut ctx);
        handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        handle_event(&mut tree, row, nav(Kind::NavRight), &mut ctx);
        handle_event(&mut tree, row, nav(Kind::NavRight), &mut ctx);
        assert_eq!(tree.field(row).value(), 7);

        // Back ends the edit and reverts
        let out = handle_event(&mut tree, row, nav(Kind::Back), &mut ctx);
        assert_eq!(out, Outcome::Handled);
        assert!(!tree.row(row).is_editing());
        assert_eq!(tree.field(row).value(), 5);
        assert_eq!(ctx.stored, 5);
    }

    #[test]
    fn test_blur_while_viewing_leaves_model_untouched() {
        let (mut tree, _screen, row, mut ctx) = setup();
        get_focus(&mut tree, row, &mut ctx);
        assert!(!tree.row(row).is_editing());

        // The model changed externally and has not been synced yet; the
        // blur must not push the stale working value over it
        ctx.stored = 9;
        lose_focus(&mut tree, row, &mut ctx);
        assert_eq!(ctx.stored, 9);

        sync(&mut tree, row, &mut ctx);
        assert_eq!(tree.field(row).value(), 9);
    }

    #[test]
    fn test_back_while_viewing_requests_pop() {
        let (mut tree, _screen, row, mut ctx) = setup();
        get_focus(&mut tree, row, &mut ctx);
        let out = handle_event(&mut tree, row, nav(Kind::Back), &mut ctx);
        assert_eq!(out, Outcome::Nav(NavRequest::Pop));
    }

    #[test]
    fn test_hover_row_back_stops_editing_and_pops() {
        let (mut tree, _screen, row, mut ctx) = setup();
        tree.row_mut(row).set_hover_to_edit(true);
        get_focus(&mut tree, row, &mut ctx);
        assert!(tree.row(row).is_editing());
        let out = handle_event(&mut tree, row, nav(Kind::Back), &mut ctx);
        assert_eq!(out, Outcome::Nav(NavRequest::Pop));
        assert!(!tree.row(row).is_editing());
    }

    #[test]
    fn test_submenu_select_requests_push() {
        let mut tree: Tree<Model> = Tree::new();
        let parent = tree.add_screen("parent").unwrap();
        let child = tree.add_screen("child").unwrap();
        let row = tree.add_submenu(parent, child).unwrap();
        let mut ctx = Model { stored: 0 };
        let out = handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        assert_eq!(out, Outcome::Nav(NavRequest::Push(child)));
    }

    #[test]
    fn test_can_handle_rules() {
        let (mut tree, _screen, row, mut ctx) = setup();

        // Primary directional events are refused while viewing
        assert!(!can_handle(&tree, row, &nav(Kind::NavDown)));
        // Select always wanted
        assert!(can_handle(&tree, row, &nav(Kind::Select)));
        // Back refused while viewing
        assert!(!can_handle(&tree, row, &nav(Kind::Back)));
        // Accessory controls always route through
        assert!(can_handle(
            &tree,
            row,
            &Event::new(Source::Button, Kind::Held, 3)
        ));

        get_focus(&mut tree, row, &mut ctx);
        handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        assert!(tree.row(row).is_editing());
        assert!(can_handle(&tree, row, &nav(Kind::NavDown)));
        assert!(can_handle(&tree, row, &nav(Kind::Back)));
    }

    #[test]
    fn test_hover_row_never_wants_primary_directionals() {
        let (mut tree, _screen, row, mut ctx) = setup();
        tree.row_mut(row).set_hover_to_edit(true);
        get_focus(&mut tree, row, &mut ctx);
        assert!(tree.row(row).is_editing());
        assert!(!can_handle(&tree, row, &nav(Kind::NavDown)));
        assert!(!can_handle(&tree, row, &nav(Kind::Back)));
    }

    #[test]
    fn test_explicit_save_without_live_update() {
        let (mut tree, _screen, row, mut ctx) = setup();
        tree.row_mut(row).set_live_update(false);
        get_focus(&mut tree, row, &mut ctx);
        handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        handle_event(&mut tree, row, nav(Kind::NavRight), &mut ctx);
        assert_eq!(tree.field(row).value(), 6);
        // Deltas are not committed until editing ends
        assert_eq!(ctx.stored, 5);
        handle_event(&mut tree, row, nav(Kind::Select), &mut ctx);
        assert!(!tree.row(row).is_editing());
        assert_eq!(ctx.stored, 6);
    }

    #[test]
    fn test_live_update_disables_cancel_on_back() {
        let (mut tree, _screen, row, _ctx) = setup();
        tree.row_mut(row).set_cancel_on_back(true);
        assert!(!tree.row(row).live_update);
        tree.row_mut(row).set_live_update(true);
        assert!(!tree.row(row).cancel_on_back);
    }
}
