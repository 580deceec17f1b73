//! Event router: binding tables and the ordered dispatch pipeline
//!
//! Every normalized event funnels through [`Router::dispatch`], which
//! decides who sees it: a pending resync first, then the frame path for
//! Draw, then the two binding tables, then the sleep/wake gate, and
//! finally the stack top with the default handler as the single fallback.
//!
//! Node handlers never mutate the stack directly. Navigation they request
//! comes back as an [`Outcome::Nav`] value and is applied here after the
//! tree traversal has unwound, so nested enter/exit hooks always run
//! against a consistent stack. Exclusive access through `&mut` stands in
//! for the re-entrant lock a shared-pointer design would need; the driver
//! serializes input and draw by owning the router (directly or behind its
//! executor's mutex).

use heapless::FnvIndexMap;

use crate::event::{Event, Kind, Source};
use crate::render::{RenderError, Renderer};
use crate::stack::NavStack;
use crate::tree::{NavRequest, NodeId, Outcome, Tree};
use crate::Error;

/// Maximum simultaneous bindings per table
pub const MAX_BINDINGS: usize = 8;

type BindingTable = FnvIndexMap<(Source, u8), NodeId, MAX_BINDINGS>;

/// Binding tables, navigation stack, and dispatch state
pub struct Router<C> {
    stack: NavStack,
    /// Persistent control overrides
    hardwired: BindingTable,
    /// Transient popup/modal overrides, checked first
    popup: BindingTable,
    sync_pending: bool,
    default_handler: Option<fn(&mut C, Event)>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self {
            stack: NavStack::new(),
            hardwired: BindingTable::new(),
            popup: BindingTable::new(),
            sync_pending: false,
            default_handler: None,
        }
    }

    pub fn top(&self) -> Option<NodeId> {
        self.stack.top()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.stack.root()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Ask for a resynchronization pass before the next event is handled
    pub fn request_sync(&mut self) {
        self.sync_pending = true;
    }

    /// Fallback for events nothing else handled
    pub fn set_default_handler(&mut self, handler: fn(&mut C, Event)) {
        self.default_handler = Some(handler);
    }

    ///////////////////////////////////////////////////////////////////
    // Binding tables
    ///////////////////////////////////////////////////////////////////

    /// Persistently divert all events from a control to `target`. The
    /// target is also registered as a wildcard listener for that control
    /// so it can filter the events back in. Rebinding a key unregisters
    /// the displaced target; a failed bind leaves no registration behind.
    pub fn bind(
        &mut self,
        tree: &mut Tree<C>,
        source: Source,
        index: u8,
        target: NodeId,
    ) -> Result<(), Error> {
        let key = (source, index);
        let wildcard = Event::new(source, Kind::Any, index);

        let displaced = self
            .hardwired
            .insert(key, target)
            .map_err(|_| Error::BindingsFull)?;
        if let Err(err) = tree.register_event(target, wildcard) {
            // Roll the table back so binding and registration stay in step
            match displaced {
                Some(prev) => {
                    let _ = self.hardwired.insert(key, prev);
                }
                None => {
                    self.hardwired.remove(&key);
                }
            }
            return Err(err);
        }
        if let Some(prev) = displaced {
            if prev != target {
                tree.unregister_event(prev, wildcard);
            }
        }
        Ok(())
    }

    /// Remove a hardwired binding, dropping the wildcard registration it
    /// installed. Unknown keys are a silent no-op.
    pub fn unbind(&mut self, tree: &mut Tree<C>, source: Source, index: u8) {
        if let Some(target) = self.hardwired.remove(&(source, index)) {
            tree.unregister_event(target, Event::new(source, Kind::Any, index));
        }
    }

    /// Temporarily divert all events from a control to `target` (modal
    /// editors, popups). No listener registration is installed.
    pub fn bind_popup(&mut self, source: Source, index: u8, target: NodeId) -> Result<(), Error> {
        self.popup
            .insert((source, index), target)
            .map_err(|_| Error::BindingsFull)?;
        Ok(())
    }

    pub fn unbind_popup(&mut self, source: Source, index: u8) {
        self.popup.remove(&(source, index));
    }

    ///////////////////////////////////////////////////////////////////
    // Dispatch
    ///////////////////////////////////////////////////////////////////

    /// Run one event through the pipeline
    pub fn dispatch(
        &mut self,
        tree: &mut Tree<C>,
        renderer: &mut dyn Renderer,
        ctx: &mut C,
        ev: Event,
    ) -> Result<(), RenderError> {
        let top = match self.stack.top() {
            Some(top) => top,
            // Legitimately empty before the first push
            None => return Ok(()),
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("dispatch {}", ev);

        if ev.kind == Kind::Sync {
            self.sync_pending = true;
        }

        // A pending resync runs before anything else this call, Draw
        // included, so no stale value is ever acted on or drawn
        if self.sync_pending {
            let outcome = tree.handle_event(top, Event::sync(), ctx);
            self.apply(tree, ctx, outcome);
            self.sync_pending = false;
        }

        if ev.kind == Kind::Draw {
            renderer.clear()?;
            tree.draw(top, renderer)?;
            renderer.present()?;
            return Ok(());
        }

        // A binding always owns its control's events, win or lose: the
        // target's result is final and never falls through to the stack
        // or the default handler
        if let Some(&target) = self.popup.get(&(ev.source, ev.index)) {
            let outcome = tree.handle_event(target, ev, ctx);
            self.apply(tree, ctx, outcome);
            return Ok(());
        }

        if let Some(&target) = self.hardwired.get(&(ev.source, ev.index)) {
            let outcome = tree.handle_event(target, ev, ctx);
            self.apply(tree, ctx, outcome);
            return Ok(());
        }

        // First event after sleep wakes the screen and is absorbed
        if tree.is_sleeping(top) {
            #[cfg(feature = "defmt")]
            defmt::trace!("wake {}", top);
            tree.wake(top);
            return Ok(());
        }

        let outcome = tree.handle_event(top, ev, ctx);
        if self.apply(tree, ctx, outcome) {
            return Ok(());
        }

        if let Some(handler) = self.default_handler {
            handler(ctx, ev);
        }
        Ok(())
    }

    /// Apply a handler outcome, performing any navigation it requested.
    /// Returns the definitive handled/not-handled result.
    fn apply(&mut self, tree: &mut Tree<C>, ctx: &mut C, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Handled => true,
            Outcome::Ignored => false,
            Outcome::Nav(NavRequest::Push(id)) => self.push_menu(tree, ctx, id),
            Outcome::Nav(NavRequest::Pop) => self.pop_menu(tree, ctx),
            Outcome::Nav(NavRequest::Replace(id)) => {
                self.overwrite_top(tree, ctx, id);
                true
            }
        }
    }

    ///////////////////////////////////////////////////////////////////
    // Stack navigation
    ///////////////////////////////////////////////////////////////////

    /// Exit the current top and enter `id` on top of it. Refuses
    /// double-pushing the current top and pushing past capacity.
    pub fn push_menu(&mut self, tree: &mut Tree<C>, ctx: &mut C, id: NodeId) -> bool {
        if self.stack.top() == Some(id) || self.stack.is_full() {
            return false;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("push_menu {}", id);

        if let Some(top) = self.stack.top() {
            tree.handle_exit(top, ctx);
        }
        let pushed = self.stack.push(id);
        debug_assert!(pushed);
        tree.handle_enter(id, ctx);
        pushed
    }

    /// Exit and remove the top, entering the screen underneath. When only
    /// the root remains it is put to sleep instead; the stack is never
    /// emptied.
    pub fn pop_menu(&mut self, tree: &mut Tree<C>, ctx: &mut C) -> bool {
        let top = match self.stack.top() {
            Some(top) => top,
            None => return false,
        };

        if Some(top) == self.stack.root() {
            #[cfg(feature = "defmt")]
            defmt::trace!("root sleep {}", top);
            tree.sleep(top);
            return true;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("pop_menu {}", top);

        tree.handle_exit(top, ctx);
        if let Some(new_top) = self.stack.pop() {
            tree.handle_enter(new_top, ctx);
        }
        true
    }

    /// Replace the top with `id`, returning the replaced screen. Used for
    /// "show this instead, but remember where to return" flows: from A
    /// navigate to B, and when B would pop, overwrite it with a
    /// confirmation screen so Back lands on A afterwards.
    pub fn overwrite_top(&mut self, tree: &mut Tree<C>, ctx: &mut C, id: NodeId) -> Option<NodeId> {
        let popped = self.stack.top();
        if let Some(top) = popped {
            tree.handle_exit(top, ctx);
            self.stack.pop();
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("overwrite_top {}", id);

        // `id` may already be the surviving top, in which case the push is
        // refused as a duplicate, but that screen was exited when it was
        // first covered and still needs re-entry
        if self.stack.push(id) || self.stack.top() == Some(id) {
            tree.handle_enter(id, ctx);
        }
        popped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    struct Model;

    fn setup() -> (Tree<Model>, Router<Model>, NodeId, NodeId, NodeId) {
        let mut tree: Tree<Model> = Tree::new();
        let screen = tree.add_screen("bindings").unwrap();
        let a = tree.add_field(screen, Field::new("a", 0, 0, 9, 1)).unwrap();
        let b = tree.add_field(screen, Field::new("b", 0, 0, 9, 1)).unwrap();
        let c = tree.add_field(screen, Field::new("c", 0, 0, 9, 1)).unwrap();
        (tree, Router::new(), a, b, c)
    }

    #[test]
    fn test_failed_bind_leaves_no_registration() {
        let (mut tree, mut router, a, b, c) = setup();
        // Fill the table, spreading keys so no single filter overflows
        for index in 0..4 {
            router.bind(&mut tree, Source::Button, index, a).unwrap();
        }
        for index in 4..MAX_BINDINGS as u8 {
            router.bind(&mut tree, Source::Button, index, b).unwrap();
        }

        let overflow = router.bind(&mut tree, Source::Button, 99, c);
        assert_eq!(overflow, Err(Error::BindingsFull));
        // The refused target must not claim the control's events
        assert!(!tree.filter_accepts(c, &Event::new(Source::Button, Kind::Select, 99)));
    }

    #[test]
    fn test_rebind_unregisters_displaced_target() {
        let (mut tree, mut router, a, b, _c) = setup();
        let claimed = Event::new(Source::Encoder, Kind::Select, 3);

        router.bind(&mut tree, Source::Encoder, 3, a).unwrap();
        assert!(tree.filter_accepts(a, &claimed));

        router.bind(&mut tree, Source::Encoder, 3, b).unwrap();
        assert!(!tree.filter_accepts(a, &claimed));
        assert!(tree.filter_accepts(b, &claimed));

        router.unbind(&mut tree, Source::Encoder, 3);
        assert!(!tree.filter_accepts(b, &claimed));
    }
}
