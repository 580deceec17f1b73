//! Driver-facing context
//!
//! [`Ui`] bundles the tree, router, renderer, and the caller's context
//! into one explicitly constructed value the driver loop owns. The driver
//! feeds normalized events into [`Ui::dispatch`], periodically calls
//! [`Ui::draw`] and [`Ui::request_sync`], and applies its idle policy via
//! [`Ui::pop_menu`] on the root / [`Ui::sleeping`].

use crate::event::{Event, Source};
use crate::render::{RenderError, Renderer};
use crate::router::Router;
use crate::tree::{NodeId, Tree};
use crate::Error;

/// The assembled UI engine
pub struct Ui<C, R: Renderer> {
    pub tree: Tree<C>,
    router: Router<C>,
    renderer: R,
    pub ctx: C,
}

impl<C, R: Renderer> Ui<C, R> {
    /// Assemble the engine and show `root`. The root stays on the stack
    /// for the lifetime of the UI; it sleeps instead of popping.
    pub fn new(mut tree: Tree<C>, root: NodeId, renderer: R, mut ctx: C) -> Self {
        let mut router = Router::new();
        router.push_menu(&mut tree, &mut ctx, root);
        Self {
            tree,
            router,
            renderer,
            ctx,
        }
    }

    /// Feed one normalized event through the dispatch pipeline
    pub fn dispatch(&mut self, ev: Event) -> Result<(), RenderError> {
        self.router
            .dispatch(&mut self.tree, &mut self.renderer, &mut self.ctx, ev)
    }

    /// Render one frame
    pub fn draw(&mut self) -> Result<(), RenderError> {
        self.dispatch(Event::draw())
    }

    /// Resynchronize working values from the model before the next event
    pub fn request_sync(&mut self) {
        self.router.request_sync();
    }

    pub fn push_menu(&mut self, id: NodeId) -> bool {
        self.router.push_menu(&mut self.tree, &mut self.ctx, id)
    }

    pub fn pop_menu(&mut self) -> bool {
        self.router.pop_menu(&mut self.tree, &mut self.ctx)
    }

    pub fn overwrite_top(&mut self, id: NodeId) -> Option<NodeId> {
        self.router.overwrite_top(&mut self.tree, &mut self.ctx, id)
    }

    pub fn bind(&mut self, source: Source, index: u8, target: NodeId) -> Result<(), Error> {
        self.router.bind(&mut self.tree, source, index, target)
    }

    pub fn unbind(&mut self, source: Source, index: u8) {
        self.router.unbind(&mut self.tree, source, index);
    }

    pub fn bind_popup(&mut self, source: Source, index: u8, target: NodeId) -> Result<(), Error> {
        self.router.bind_popup(source, index, target)
    }

    pub fn unbind_popup(&mut self, source: Source, index: u8) {
        self.router.unbind_popup(source, index);
    }

    pub fn set_default_handler(&mut self, handler: fn(&mut C, Event)) {
        self.router.set_default_handler(handler);
    }

    pub fn top(&self) -> Option<NodeId> {
        self.router.top()
    }

    pub fn depth(&self) -> usize {
        self.router.depth()
    }

    /// True while the visible screen is asleep; the driver can skip its
    /// draw timer entirely until the next input arrives
    pub fn sleeping(&self) -> bool {
        self.router
            .top()
            .map(|top| self.tree.is_sleeping(top))
            .unwrap_or(false)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
