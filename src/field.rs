//! Editable numeric value with a committed/working double buffer
//!
//! `working` is what the user is adjusting; `committed` is authoritative.
//! Keeping them separate makes back/cancel an exact revert and lets a
//! periodic resync run during navigation without disturbing an edit
//! gesture that has not been committed yet.

use crate::event::{Event, EventFilter, Kind};

/// A bounded integer field
///
/// The optional getter/setter hooks connect the field to external model
/// state; they are only ever invoked from [`Field::sync`] and
/// [`Field::commit`].
pub struct Field<C> {
    pub(crate) label: &'static str,
    committed: i32,
    working: i32,
    min: i32,
    max: i32,
    step: i32,
    big_step: i32,
    wrap: bool,
    getter: Option<fn(&mut C) -> i32>,
    setter: Option<fn(&mut C, i32)>,
    pub(crate) filter: EventFilter,
}

impl<C> Field<C> {
    pub fn new(label: &'static str, initial: i32, min: i32, max: i32, step: i32) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            label,
            committed: initial,
            working: initial,
            min,
            max,
            step,
            big_step: 0,
            wrap: false,
            getter: None,
            setter: None,
            filter: EventFilter::new(),
        }
    }

    /// Wrap to the opposite bound on single-step overflow instead of
    /// clamping
    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    /// Enable the coarse step used by the secondary direction pair
    pub fn with_big_step(mut self, big_step: i32) -> Self {
        self.big_step = big_step;
        self
    }

    /// Read committed state from the external model on every sync
    pub fn with_getter(mut self, getter: fn(&mut C) -> i32) -> Self {
        self.getter = Some(getter);
        self
    }

    /// Push committed state to the external model on every commit
    pub fn with_setter(mut self, setter: fn(&mut C, i32)) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The value currently shown and adjusted
    pub fn value(&self) -> i32 {
        self.working
    }

    pub fn committed(&self) -> i32 {
        self.committed
    }

    /// Adjust the working value, clamping to `[min, max]`. With wrap
    /// enabled, a delta of exactly one step that would cross a bound lands
    /// on the opposite bound instead; larger deltas still clamp.
    pub fn apply_delta(&mut self, delta: i32) {
        // Saturating keeps the boundary comparison sound for bounds near
        // the integer extremes
        let next = self.working.saturating_add(delta);
        if delta > 0 {
            if next <= self.max {
                self.working = next;
            } else if self.wrap && delta == self.step {
                self.working = self.min;
            } else {
                self.working = self.max;
            }
        } else if delta < 0 {
            if next >= self.min {
                self.working = next;
            } else if self.wrap && delta == -self.step {
                self.working = self.max;
            } else {
                self.working = self.min;
            }
        }
    }

    /// Map a directional event onto a delta. Left/Right apply the fine
    /// step; Up/Down apply the coarse step when one is configured and are
    /// otherwise not handled.
    pub(crate) fn handle_nav_delta(&mut self, ev: &Event) -> bool {
        match ev.kind {
            Kind::NavLeft => {
                self.apply_delta(-self.step);
                true
            }
            Kind::NavRight => {
                self.apply_delta(self.step);
                true
            }
            Kind::NavUp if self.big_step != 0 => {
                self.apply_delta(-self.big_step);
                true
            }
            Kind::NavDown if self.big_step != 0 => {
                self.apply_delta(self.big_step);
                true
            }
            _ => false,
        }
    }

    /// Refresh from the external model and discard any in-progress edit
    pub fn sync(&mut self, ctx: &mut C) {
        if let Some(getter) = self.getter {
            self.committed = getter(ctx).clamp(self.min, self.max);
        }
        self.working = self.committed;
    }

    /// Make the working value authoritative and push it to the model
    pub fn commit(&mut self, ctx: &mut C) {
        self.committed = self.working;
        if let Some(setter) = self.setter {
            setter(ctx, self.committed);
        }
    }

    /// Revert the working value to the last committed one
    pub fn cancel(&mut self) {
        self.working = self.committed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Source;
    use proptest::prelude::*;

    struct Model {
        stored: i32,
        sets: usize,
    }

    fn field(initial: i32, min: i32, max: i32, step: i32) -> Field<Model> {
        Field::new("test", initial, min, max, step)
    }

    #[test]
    fn test_clamp_at_max_without_wrap() {
        let mut f = field(10, 0, 10, 1);
        f.apply_delta(1);
        assert_eq!(f.value(), 10);
    }

    #[test]
    fn test_wrap_at_max_with_single_step() {
        let mut f = field(10, 0, 10, 1).with_wrap();
        f.apply_delta(1);
        assert_eq!(f.value(), 0);
    }

    #[test]
    fn test_wrap_at_min_with_single_step() {
        let mut f = field(0, 0, 10, 1).with_wrap();
        f.apply_delta(-1);
        assert_eq!(f.value(), 10);
    }

    #[test]
    fn test_big_delta_clamps_even_with_wrap() {
        let mut f = field(9, 0, 10, 1).with_wrap();
        f.apply_delta(5);
        assert_eq!(f.value(), 10);
        f.apply_delta(-12);
        assert_eq!(f.value(), 0);
    }

    #[test]
    fn test_delta_clamps_at_integer_extremes() {
        let mut f = field(i32::MAX - 1, 0, i32::MAX, 1);
        f.apply_delta(2);
        assert_eq!(f.value(), i32::MAX);

        let mut f = field(i32::MIN + 1, i32::MIN, 0, 1);
        f.apply_delta(-2);
        assert_eq!(f.value(), i32::MIN);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut f = field(5, 0, 10, 1);
        f.apply_delta(0);
        assert_eq!(f.value(), 5);
    }

    #[test]
    fn test_wrap_then_commit() {
        // min=0, max=3, step=1, wrap, committed=3
        let mut ctx = Model { stored: 0, sets: 0 };
        let mut f = Field::<Model>::new("n", 3, 0, 3, 1)
            .with_wrap()
            .with_setter(|m, v| {
                m.stored = v;
                m.sets += 1;
            });
        f.apply_delta(1);
        assert_eq!(f.value(), 0);
        f.commit(&mut ctx);
        assert_eq!(f.committed(), 0);
        assert_eq!(ctx.stored, 0);
        assert_eq!(ctx.sets, 1);
    }

    #[test]
    fn test_commit_then_cancel_is_noop() {
        let mut ctx = Model { stored: 0, sets: 0 };
        let mut f = field(5, 0, 10, 1);
        f.apply_delta(2);
        f.commit(&mut ctx);
        f.cancel();
        assert_eq!(f.value(), 7);
        assert_eq!(f.committed(), 7);
    }

    #[test]
    fn test_cancel_restores_committed_after_many_deltas() {
        let mut f = field(4, 0, 10, 1);
        f.apply_delta(3);
        f.apply_delta(-1);
        f.apply_delta(2);
        f.cancel();
        assert_eq!(f.value(), 4);
    }

    #[test]
    fn test_sync_reads_getter_and_discards_edit() {
        let mut ctx = Model { stored: 8, sets: 0 };
        let mut f = field(2, 0, 10, 1).with_getter(|m| m.stored);
        f.apply_delta(3);
        f.sync(&mut ctx);
        assert_eq!(f.committed(), 8);
        assert_eq!(f.value(), 8);
    }

    #[test]
    fn test_nav_delta_mapping() {
        let mut f = field(5, 0, 100, 2).with_big_step(10);
        assert!(f.handle_nav_delta(&Event::new(Source::Encoder, Kind::NavRight, 0)));
        assert_eq!(f.value(), 7);
        assert!(f.handle_nav_delta(&Event::new(Source::Encoder, Kind::NavLeft, 0)));
        assert_eq!(f.value(), 5);
        assert!(f.handle_nav_delta(&Event::new(Source::Encoder, Kind::NavDown, 0)));
        assert_eq!(f.value(), 15);
        assert!(f.handle_nav_delta(&Event::new(Source::Encoder, Kind::NavUp, 0)));
        assert_eq!(f.value(), 5);
    }

    #[test]
    fn test_nav_updown_unhandled_without_big_step() {
        let mut f = field(5, 0, 100, 2);
        assert!(!f.handle_nav_delta(&Event::new(Source::Encoder, Kind::NavUp, 0)));
        assert_eq!(f.value(), 5);
    }

    proptest! {
        #[test]
        fn prop_working_stays_in_range(deltas in proptest::collection::vec(-20i32..20, 0..64)) {
            let mut f = field(3, -5, 12, 1).with_wrap();
            for d in deltas {
                f.apply_delta(d);
                prop_assert!(f.value() >= -5 && f.value() <= 12);
            }
        }

        #[test]
        fn prop_cancel_always_restores_committed(deltas in proptest::collection::vec(-3i32..3, 0..32)) {
            let mut f = field(7, 0, 20, 1);
            for d in deltas {
                f.apply_delta(d);
            }
            f.cancel();
            prop_assert_eq!(f.value(), 7);
        }
    }
}
