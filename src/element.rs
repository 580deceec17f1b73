//! Simple leaf elements: toggles, triggers, and static notes
//!
//! These cover the non-numeric row contents: a boolean flipped by one
//! registered control, a fire-and-forget action, and a plain label line.

use crate::event::{Event, EventFilter};

/// Boolean element flipped by its registered trigger event
///
/// The value toggles first, then the change callback fires. Events that do
/// not match the registration are reported as not handled so a bound
/// accessory control can fall through.
pub struct Toggle<C> {
    pub(crate) label: &'static str,
    on_label: &'static str,
    off_label: &'static str,
    value: bool,
    on_change: Option<fn(&mut C)>,
    pub(crate) filter: EventFilter,
}

impl<C> Toggle<C> {
    pub fn new(label: &'static str, on_label: &'static str, off_label: &'static str) -> Self {
        Self {
            label,
            on_label,
            off_label,
            value: false,
            on_change: None,
            filter: EventFilter::new(),
        }
    }

    pub fn with_initial(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    pub fn with_trigger(mut self, trigger: Event) -> Result<Self, crate::Error> {
        self.filter.register(trigger)?;
        Ok(self)
    }

    pub fn with_on_change(mut self, callback: fn(&mut C)) -> Self {
        self.on_change = Some(callback);
        self
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    pub fn value_label(&self) -> &'static str {
        if self.value {
            self.on_label
        } else {
            self.off_label
        }
    }

    /// Flip on a matching event; `false` for everything else
    pub(crate) fn handle_event(&mut self, ev: &Event, ctx: &mut C) -> bool {
        if self.filter.accepts(ev) {
            self.value = !self.value;
            if let Some(callback) = self.on_change {
                callback(ctx);
            }
            return true;
        }
        false
    }
}

/// Fire-and-forget action bound to one or more registered events
pub struct Trigger<C> {
    pub(crate) label: &'static str,
    action: Option<fn(&mut C)>,
    pub(crate) filter: EventFilter,
}

impl<C> Trigger<C> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            action: None,
            filter: EventFilter::new(),
        }
    }

    pub fn with_trigger(mut self, trigger: Event) -> Result<Self, crate::Error> {
        self.filter.register(trigger)?;
        Ok(self)
    }

    pub fn with_action(mut self, action: fn(&mut C)) -> Self {
        self.action = Some(action);
        self
    }

    /// Fire on a matching event. Non-matching events are absorbed, the
    /// trigger is a terminal handler.
    pub(crate) fn handle_event(&mut self, ev: &Event, ctx: &mut C) -> bool {
        if self.filter.accepts(ev) {
            if let Some(action) = self.action {
                action(ctx);
            }
        }
        true
    }
}

/// Static label line with no interaction
pub struct Note {
    pub(crate) label: &'static str,
}

impl Note {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Kind, Source};

    struct Counter {
        fired: usize,
    }

    #[test]
    fn test_toggle_flips_then_fires_callback() {
        let mut ctx = Counter { fired: 0 };
        let trigger = Event::new(Source::Button, Kind::Released, 2);
        let mut toggle = Toggle::new("mute", "on", "off")
            .with_trigger(trigger)
            .unwrap()
            .with_on_change(|c: &mut Counter| c.fired += 1);

        assert!(!toggle.value());
        assert!(toggle.handle_event(&trigger, &mut ctx));
        assert!(toggle.value());
        assert_eq!(toggle.value_label(), "on");
        assert_eq!(ctx.fired, 1);
    }

    #[test]
    fn test_toggle_ignores_other_events() {
        let mut ctx = Counter { fired: 0 };
        let mut toggle = Toggle::new("mute", "on", "off")
            .with_trigger(Event::new(Source::Button, Kind::Released, 2))
            .unwrap();
        let other = Event::new(Source::Button, Kind::Released, 3);
        assert!(!toggle.handle_event(&other, &mut ctx));
        assert!(!toggle.value());
    }

    #[test]
    fn test_trigger_fires_only_on_match_but_absorbs_all() {
        let mut ctx = Counter { fired: 0 };
        let trigger_ev = Event::new(Source::Gate, Kind::Held, 0);
        let mut trigger = Trigger::new("fire")
            .with_trigger(trigger_ev)
            .unwrap()
            .with_action(|c: &mut Counter| c.fired += 1);

        assert!(trigger.handle_event(&trigger_ev, &mut ctx));
        assert_eq!(ctx.fired, 1);
        assert!(trigger.handle_event(&Event::new(Source::Gate, Kind::Held, 1), &mut ctx));
        assert_eq!(ctx.fired, 1);
    }
}
