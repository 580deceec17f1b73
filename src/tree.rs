//! Static element tree
//!
//! All screens, rows, and leaf elements live in one bounded arena, built
//! once at startup and never structurally mutated afterwards. Nodes refer
//! to each other by [`NodeId`], which is what the navigation stack and the
//! router's binding tables hold, so no entry can outlive the tree it
//! points into.
//!
//! Behavior is dispatched over the node kind here and implemented in the
//! per-kind modules ([`crate::screen`], [`crate::row`], [`crate::pair`]).

use core::fmt::Write;

use heapless::{String, Vec};

use crate::element::{Note, Toggle, Trigger};
use crate::event::{Event, EventFilter, Kind, Source};
use crate::field::Field;
use crate::pair::Pair;
use crate::render::{RenderError, Renderer};
use crate::row::Row;
use crate::screen::Screen;
use crate::{pair, row, screen, Error};

/// Maximum nodes in one tree
pub const MAX_NODES: usize = 64;

/// Characters per formatted display line
pub const LINE_LEN: usize = 24;

/// Index of a node within its tree
///
/// Ids are only meaningful for the tree that issued them; indexing a
/// different tree with one is a programming error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(u16);

impl NodeId {
    pub(crate) const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Navigation requested by a node handler, applied by the router once the
/// traversal has unwound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavRequest {
    Push(NodeId),
    Pop,
    Replace(NodeId),
}

/// Result of offering an event to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Handled,
    Ignored,
    Nav(NavRequest),
}

impl Outcome {
    pub(crate) fn from_handled(handled: bool) -> Self {
        if handled {
            Outcome::Handled
        } else {
            Outcome::Ignored
        }
    }
}

pub(crate) enum Node<C> {
    Screen(Screen<C>),
    Row(Row<C>),
    Pair(Pair<C>),
    Field(Field<C>),
    Toggle(Toggle<C>),
    Trigger(Trigger<C>),
    Note(Note),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Screen,
    Row,
    Pair,
    Field,
    Toggle,
    Trigger,
    Note,
}

/// The element tree
///
/// `C` is the caller's context type; every callback and model hook in the
/// tree is a plain `fn` over `&mut C`, invoked synchronously.
pub struct Tree<C> {
    nodes: Vec<Node<C>, MAX_NODES>,
    primary: (Source, u8),
}

impl<C> Default for Tree<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Tree<C> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            primary: (Source::Encoder, 0),
        }
    }

    /// Designate the control whose directional events drive cursor
    /// movement. Defaults to encoder 0.
    pub fn set_primary_control(&mut self, source: Source, index: u8) {
        self.primary = (source, index);
    }

    /// True for events produced by the primary navigation control
    pub fn is_primary(&self, ev: &Event) -> bool {
        ev.source == self.primary.0 && ev.index == self.primary.1
    }

    fn alloc(&mut self, node: Node<C>) -> Result<NodeId, Error> {
        let id = NodeId(self.nodes.len() as u16);
        self.nodes.push(node).map_err(|_| Error::TreeFull)?;
        Ok(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
        &mut self.nodes[id.index()]
    }

    fn kind(&self, id: NodeId) -> NodeKind {
        match self.node(id) {
            Node::Screen(_) => NodeKind::Screen,
            Node::Row(_) => NodeKind::Row,
            Node::Pair(_) => NodeKind::Pair,
            Node::Field(_) => NodeKind::Field,
            Node::Toggle(_) => NodeKind::Toggle,
            Node::Trigger(_) => NodeKind::Trigger,
            Node::Note(_) => NodeKind::Note,
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Construction
    ///////////////////////////////////////////////////////////////////

    /// Add an empty screen
    pub fn add_screen(&mut self, title: &'static str) -> Result<NodeId, Error> {
        self.alloc(Node::Screen(Screen::new(title)))
    }

    fn attach_row(&mut self, screen: NodeId, row: NodeId) -> Result<(), Error> {
        self.screen_mut(screen)
            .rows
            .push(row)
            .map_err(|_| Error::ScreenFull)
    }

    /// Wrap a field in a row and append it to `screen`, returning the row
    pub fn add_field(&mut self, screen: NodeId, field: Field<C>) -> Result<NodeId, Error> {
        let label = field.label;
        let child = self.alloc(Node::Field(field))?;
        let row = self.alloc(Node::Row(Row::with_child(label, child)))?;
        self.attach_row(screen, row)?;
        Ok(row)
    }

    /// Wrap a toggle in a row and append it to `screen`
    pub fn add_toggle(&mut self, screen: NodeId, toggle: Toggle<C>) -> Result<NodeId, Error> {
        let label = toggle.label;
        let child = self.alloc(Node::Toggle(toggle))?;
        let row = self.alloc(Node::Row(Row::with_child(label, child)))?;
        self.attach_row(screen, row)?;
        Ok(row)
    }

    /// Wrap a trigger in a row and append it to `screen`
    pub fn add_trigger(&mut self, screen: NodeId, trigger: Trigger<C>) -> Result<NodeId, Error> {
        let label = trigger.label;
        let child = self.alloc(Node::Trigger(trigger))?;
        let row = self.alloc(Node::Row(Row::with_child(label, child)))?;
        self.attach_row(screen, row)?;
        Ok(row)
    }

    /// Append a static label line to `screen`
    pub fn add_note(&mut self, screen: NodeId, label: &'static str) -> Result<NodeId, Error> {
        let child = self.alloc(Node::Note(Note::new(label)))?;
        let row = self.alloc(Node::Row(Row::with_child(label, child)))?;
        self.attach_row(screen, row)?;
        Ok(row)
    }

    /// Link `child` as a sub-screen reachable from a row of `parent`
    pub fn add_submenu(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, Error> {
        let title = self.screen(child).title;
        let row = self.alloc(Node::Row(Row::with_submenu(title, child)))?;
        self.attach_row(parent, row)?;
        Ok(row)
    }

    /// Bundle two fields as one atomic editing unit routed by per-side
    /// encoder indices, appended to `screen`
    pub fn add_pair(
        &mut self,
        screen: NodeId,
        label: &'static str,
        left: Field<C>,
        right: Field<C>,
        left_index: u8,
        right_index: u8,
    ) -> Result<NodeId, Error> {
        let left_label = left.label;
        let right_label = right.label;
        let left_field = self.alloc(Node::Field(left))?;
        let right_field = self.alloc(Node::Field(right))?;
        let left_row = self.alloc(Node::Row(Row::with_child(left_label, left_field)))?;
        let right_row = self.alloc(Node::Row(Row::with_child(right_label, right_field)))?;
        let id = self.alloc(Node::Pair(Pair::new(
            label,
            left_row,
            right_row,
            left_index,
            right_index,
        )))?;
        // Pairs hover-edit by definition; keep both sides coupled
        pair::set_hover_to_edit(self, id, true);
        self.attach_row(screen, id)?;
        Ok(id)
    }

    ///////////////////////////////////////////////////////////////////
    // Typed access
    ///////////////////////////////////////////////////////////////////

    pub fn screen(&self, id: NodeId) -> &Screen<C> {
        match self.node(id) {
            Node::Screen(s) => s,
            _ => panic!("node is not a screen"),
        }
    }

    pub fn screen_mut(&mut self, id: NodeId) -> &mut Screen<C> {
        match self.node_mut(id) {
            Node::Screen(s) => s,
            _ => panic!("node is not a screen"),
        }
    }

    pub fn row(&self, id: NodeId) -> &Row<C> {
        match self.node(id) {
            Node::Row(r) => r,
            _ => panic!("node is not a row"),
        }
    }

    pub fn row_mut(&mut self, id: NodeId) -> &mut Row<C> {
        match self.node_mut(id) {
            Node::Row(r) => r,
            _ => panic!("node is not a row"),
        }
    }

    pub fn field(&self, id: NodeId) -> &Field<C> {
        match self.node(id) {
            Node::Field(f) => f,
            Node::Row(r) => match r.child.map(|c| self.node(c)) {
                Some(Node::Field(f)) => f,
                _ => panic!("row holds no field"),
            },
            _ => panic!("node is not a field"),
        }
    }

    pub fn field_mut(&mut self, id: NodeId) -> &mut Field<C> {
        let id = match self.node(id) {
            Node::Row(r) => r.child.expect("row holds no field"),
            _ => id,
        };
        match self.node_mut(id) {
            Node::Field(f) => f,
            _ => panic!("node is not a field"),
        }
    }

    pub fn toggle_mut(&mut self, id: NodeId) -> &mut Toggle<C> {
        let id = match self.node(id) {
            Node::Row(r) => r.child.expect("row holds no toggle"),
            _ => id,
        };
        match self.node_mut(id) {
            Node::Toggle(t) => t,
            _ => panic!("node is not a toggle"),
        }
    }

    pub fn pair(&self, id: NodeId) -> &Pair<C> {
        match self.node(id) {
            Node::Pair(p) => p,
            _ => panic!("node is not a pair"),
        }
    }

    pub fn pair_mut(&mut self, id: NodeId) -> &mut Pair<C> {
        match self.node_mut(id) {
            Node::Pair(p) => p,
            _ => panic!("node is not a pair"),
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Pair configuration
    //
    // Pair flags are coupled across both sides, so they are set through
    // the tree rather than on the node.
    ///////////////////////////////////////////////////////////////////

    pub fn pair_set_hover_to_edit(&mut self, id: NodeId, enable: bool) {
        pair::set_hover_to_edit(self, id, enable);
    }

    pub fn pair_set_live_update(&mut self, id: NodeId, enable: bool) {
        pair::set_live_update(self, id, enable);
    }

    pub fn pair_set_cancel_on_back(&mut self, id: NodeId, enable: bool) {
        pair::set_cancel_on_back(self, id, enable);
    }

    ///////////////////////////////////////////////////////////////////
    // Event filters
    ///////////////////////////////////////////////////////////////////

    fn filter_mut(&mut self, id: NodeId) -> Option<&mut EventFilter> {
        match self.node_mut(id) {
            Node::Screen(s) => Some(&mut s.filter),
            Node::Row(r) => Some(&mut r.filter),
            Node::Pair(p) => Some(&mut p.filter),
            Node::Field(f) => Some(&mut f.filter),
            Node::Toggle(t) => Some(&mut t.filter),
            Node::Trigger(t) => Some(&mut t.filter),
            Node::Note(_) => None,
        }
    }

    /// Register interest in an event so parents route it to this node
    pub fn register_event(&mut self, id: NodeId, ev: Event) -> Result<(), Error> {
        match self.filter_mut(id) {
            Some(filter) => filter.register(ev),
            None => Ok(()),
        }
    }

    /// Drop a registration. Unknown registrations are a silent no-op.
    pub fn unregister_event(&mut self, id: NodeId, ev: Event) {
        if let Some(filter) = self.filter_mut(id) {
            filter.unregister(ev);
        }
    }

    pub(crate) fn filter_accepts(&self, id: NodeId, ev: &Event) -> bool {
        match self.node(id) {
            Node::Screen(s) => s.filter.accepts(ev),
            Node::Row(r) => r.filter.accepts(ev),
            Node::Pair(p) => p.filter.accepts(ev),
            Node::Field(f) => f.filter.accepts(ev),
            Node::Toggle(t) => t.filter.accepts(ev),
            Node::Trigger(t) => t.filter.accepts(ev),
            Node::Note(_) => false,
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Polymorphic dispatch
    ///////////////////////////////////////////////////////////////////

    pub(crate) fn handle_event(&mut self, id: NodeId, ev: Event, ctx: &mut C) -> Outcome {
        match self.kind(id) {
            NodeKind::Screen => screen::handle_event(self, id, ev, ctx),
            NodeKind::Row => row::handle_event(self, id, ev, ctx),
            NodeKind::Pair => pair::handle_event(self, id, ev, ctx),
            NodeKind::Field => {
                let f = self.field_mut(id);
                match ev.kind {
                    Kind::Sync => {
                        f.sync(ctx);
                        Outcome::Handled
                    }
                    k if k.is_directional() => Outcome::from_handled(f.handle_nav_delta(&ev)),
                    _ => Outcome::Handled,
                }
            }
            NodeKind::Toggle => {
                let handled = match self.node_mut(id) {
                    Node::Toggle(t) => t.handle_event(&ev, ctx),
                    _ => unreachable!(),
                };
                Outcome::from_handled(handled)
            }
            NodeKind::Trigger => {
                let handled = match self.node_mut(id) {
                    Node::Trigger(t) => t.handle_event(&ev, ctx),
                    _ => unreachable!(),
                };
                Outcome::from_handled(handled)
            }
            NodeKind::Note => Outcome::Handled,
        }
    }

    /// Pure query: would this node consume the event if offered it?
    pub(crate) fn can_handle(&self, id: NodeId, ev: &Event) -> bool {
        match self.node(id) {
            Node::Screen(_) => false,
            Node::Row(_) => row::can_handle(self, id, ev),
            Node::Pair(_) => pair::can_handle(self, id, ev),
            _ => self.filter_accepts(id, ev),
        }
    }

    pub(crate) fn get_focus(&mut self, id: NodeId, ctx: &mut C) {
        match self.kind(id) {
            NodeKind::Row => row::get_focus(self, id, ctx),
            NodeKind::Pair => pair::get_focus(self, id, ctx),
            _ => self.sync(id, ctx),
        }
    }

    pub(crate) fn lose_focus(&mut self, id: NodeId, ctx: &mut C) {
        match self.kind(id) {
            NodeKind::Row => row::lose_focus(self, id, ctx),
            NodeKind::Pair => pair::lose_focus(self, id, ctx),
            _ => {}
        }
    }

    pub(crate) fn handle_enter(&mut self, id: NodeId, ctx: &mut C) {
        match self.kind(id) {
            NodeKind::Screen => screen::handle_enter(self, id, ctx),
            _ => self.sync(id, ctx),
        }
    }

    pub(crate) fn handle_exit(&mut self, id: NodeId, ctx: &mut C) {
        if self.kind(id) == NodeKind::Screen {
            screen::handle_exit(self, id, ctx);
        }
    }

    pub(crate) fn sync(&mut self, id: NodeId, ctx: &mut C) {
        match self.kind(id) {
            NodeKind::Screen => screen::sync(self, id, ctx),
            NodeKind::Row => row::sync(self, id, ctx),
            NodeKind::Pair => pair::sync(self, id, ctx),
            NodeKind::Field => self.field_mut(id).sync(ctx),
            _ => {}
        }
    }

    pub(crate) fn commit(&mut self, id: NodeId, ctx: &mut C) {
        if let Node::Field(f) = self.node_mut(id) {
            f.commit(ctx);
        }
    }

    pub(crate) fn cancel(&mut self, id: NodeId) {
        if let Node::Field(f) = self.node_mut(id) {
            f.cancel();
        }
    }

    /// Element-level focus: bring the value up to date before it is shown
    /// highlighted
    pub(crate) fn focus(&mut self, id: NodeId, ctx: &mut C) {
        self.sync(id, ctx);
    }

    pub(crate) fn blur(&mut self, _id: NodeId) {}

    pub(crate) fn is_data_field(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Field(_))
    }

    /// Commit a row's (or pair's) pending edit to the model, e.g. from a
    /// save-confirmation popup
    pub fn commit_edits(&mut self, id: NodeId, ctx: &mut C) {
        match self.kind(id) {
            NodeKind::Row => row::commit_edit(self, id, ctx),
            NodeKind::Pair => pair::commit_edit(self, id, ctx),
            NodeKind::Field => self.commit(id, ctx),
            _ => {}
        }
    }

    /// Revert a row's (or pair's) pending edit
    pub fn cancel_edits(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::Row => row::cancel_edit(self, id),
            NodeKind::Pair => pair::cancel_edit(self, id),
            NodeKind::Field => self.cancel(id),
            _ => {}
        }
    }

    /// True while the node is an actively edited row or pair
    pub fn is_editing(&self, id: NodeId) -> bool {
        match self.node(id) {
            Node::Row(r) => r.editing,
            Node::Pair(p) => p.editing,
            _ => false,
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Sleep gate
    ///////////////////////////////////////////////////////////////////

    pub fn is_sleeping(&self, id: NodeId) -> bool {
        match self.node(id) {
            Node::Screen(s) => s.sleeping,
            _ => false,
        }
    }

    pub(crate) fn sleep(&mut self, id: NodeId) {
        if let Node::Screen(s) = self.node_mut(id) {
            s.sleeping = true;
        }
    }

    pub(crate) fn wake(&mut self, id: NodeId) {
        if let Node::Screen(s) = self.node_mut(id) {
            s.sleeping = false;
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Drawing
    ///////////////////////////////////////////////////////////////////

    pub(crate) fn draw(&self, id: NodeId, r: &mut dyn Renderer) -> Result<(), RenderError> {
        match self.node(id) {
            Node::Screen(_) => screen::draw(self, id, r),
            _ => {
                let mut line: String<LINE_LEN> = String::new();
                self.format_row_line(id, &mut line);
                r.draw_text(0, 0, &line)
            }
        }
    }

    /// Render one row into a text line. Returns the column span of the
    /// value when it should be highlighted.
    pub(crate) fn format_row_line(
        &self,
        id: NodeId,
        out: &mut String<LINE_LEN>,
    ) -> Option<(u8, u8)> {
        match self.node(id) {
            Node::Row(r) => {
                let _ = out.push(if r.active { '>' } else { ' ' });
                if let Some(sub) = r.submenu {
                    let _ = out.push_str(self.screen(sub).title);
                    return None;
                }
                let child = match r.child {
                    Some(child) => child,
                    None => {
                        let _ = out.push_str(r.label);
                        return None;
                    }
                };
                if let Node::Note(note) = self.node(child) {
                    let _ = out.push_str(note.label);
                    return None;
                }
                let _ = out.push_str(self.element_label(child));
                let _ = out.push_str(": ");
                let _ = out.push(if r.editing { '[' } else { ' ' });
                let start = out.len() as u8;
                self.format_value(child, out);
                let end = out.len() as u8;
                if r.editing {
                    let _ = out.push(']');
                    Some((start, end))
                } else {
                    None
                }
            }
            Node::Pair(p) => {
                let _ = out.push(if p.active { '[' } else { ' ' });
                self.format_pair_side(p.left, out);
                while out.len() < LINE_LEN / 2 {
                    let _ = out.push(' ');
                }
                self.format_pair_side(p.right, out);
                if p.active {
                    let _ = out.push(']');
                }
                None
            }
            _ => {
                let _ = out.push(' ');
                let _ = out.push_str(self.element_label(id));
                None
            }
        }
    }

    fn format_pair_side(&self, row_id: NodeId, out: &mut String<LINE_LEN>) {
        let row = self.row(row_id);
        if let Some(child) = row.child {
            let _ = out.push_str(self.element_label(child));
            let _ = out.push_str(": ");
            self.format_value(child, out);
        }
    }

    fn element_label(&self, id: NodeId) -> &'static str {
        match self.node(id) {
            Node::Screen(s) => s.title,
            Node::Row(r) => r.label,
            Node::Pair(p) => p.label,
            Node::Field(f) => f.label,
            Node::Toggle(t) => t.label,
            Node::Trigger(t) => t.label,
            Node::Note(n) => n.label,
        }
    }

    fn format_value(&self, id: NodeId, out: &mut String<LINE_LEN>) {
        match self.node(id) {
            Node::Field(f) => {
                let _ = write!(out, "{}", f.value());
            }
            Node::Toggle(t) => {
                let _ = out.push_str(t.value_label());
            }
            _ => {}
        }
    }
}
