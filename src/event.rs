//! Normalized input events and per-node event filters
//!
//! Every physical control is reported to the engine as a `{source, kind,
//! index}` triple. The scanner/debouncer that produces these lives outside
//! this crate; nothing here assumes a polling rate or electrical detail.

use heapless::Vec;

/// Maximum events a single node can register interest in
pub const MAX_FILTER_EVENTS: usize = 4;

/// Logical input channel class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// Momentary push button
    Button,
    /// Rotary encoder (rotation and integrated switch)
    Encoder,
    /// Two-position toggle switch
    Toggle,
    /// Gate/trigger input jack
    Gate,
    /// Synthetic events generated by the engine or driver
    System,
}

/// What the control did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Kind {
    /// No-op placeholder
    None,
    NavUp,
    NavDown,
    NavLeft,
    NavRight,
    /// Encoder click / confirm gesture
    Select,
    /// Back / escape gesture
    Back,
    /// Button held past the long-press threshold
    Held,
    /// Button released
    Released,
    /// Render one frame
    Draw,
    /// Refresh working values from the external model
    Sync,
    /// Wildcard, matches any kind at the same source and index
    Any,
}

impl Kind {
    /// Cursor direction for a directional event: Up/Left move toward
    /// lower indices, Down/Right toward higher ones.
    pub fn direction(self) -> i32 {
        match self {
            Kind::NavUp | Kind::NavLeft => -1,
            Kind::NavDown | Kind::NavRight => 1,
            _ => 0,
        }
    }

    /// True for the four directional kinds
    pub fn is_directional(self) -> bool {
        matches!(
            self,
            Kind::NavUp | Kind::NavDown | Kind::NavLeft | Kind::NavRight
        )
    }
}

/// A normalized input event
///
/// `index` distinguishes multiple controls of the same source class
/// (encoder 0, encoder 1, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    pub source: Source,
    pub kind: Kind,
    pub index: u8,
}

impl Event {
    pub const fn new(source: Source, kind: Kind, index: u8) -> Self {
        Self {
            source,
            kind,
            index,
        }
    }

    /// The synthetic resync event the router sends to the stack top
    pub const fn sync() -> Self {
        Self::new(Source::System, Kind::Sync, 0)
    }

    /// The synthetic frame event the driver dispatches to redraw
    pub const fn draw() -> Self {
        Self::new(Source::System, Kind::Draw, 0)
    }

    /// Wildcard matching: same source, same index, and equal kinds unless
    /// either side is [`Kind::Any`].
    pub fn matches(&self, other: &Event) -> bool {
        self.source == other.source
            && self.index == other.index
            && (self.kind == other.kind || self.kind == Kind::Any || other.kind == Kind::Any)
    }
}

/// Bounded set of events a node has registered interest in
///
/// Membership is tested under [`Event::matches`], so registering a
/// wildcard (`Kind::Any`) claims every kind on that control.
#[derive(Debug, Default)]
pub struct EventFilter {
    events: Vec<Event, MAX_FILTER_EVENTS>,
}

impl EventFilter {
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// True if any registered event matches `ev`
    pub fn accepts(&self, ev: &Event) -> bool {
        self.events.iter().any(|reg| reg.matches(ev))
    }

    /// Register an event. Duplicates (exact equality) are ignored.
    pub fn register(&mut self, ev: Event) -> Result<(), crate::Error> {
        if self.events.iter().any(|reg| *reg == ev) {
            return Ok(());
        }
        self.events.push(ev).map_err(|_| crate::Error::FilterFull)
    }

    /// Remove an exact registration. Unknown events are a silent no-op.
    pub fn unregister(&mut self, ev: Event) {
        self.events.retain(|reg| *reg != ev);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact() {
        let a = Event::new(Source::Encoder, Kind::NavLeft, 0);
        let b = Event::new(Source::Encoder, Kind::NavLeft, 0);
        assert!(a.matches(&b));
    }

    #[test]
    fn test_matches_requires_source_and_index() {
        let a = Event::new(Source::Encoder, Kind::Select, 0);
        assert!(!a.matches(&Event::new(Source::Button, Kind::Select, 0)));
        assert!(!a.matches(&Event::new(Source::Encoder, Kind::Select, 1)));
    }

    #[test]
    fn test_wildcard_matches_either_side() {
        let any = Event::new(Source::Gate, Kind::Any, 2);
        let held = Event::new(Source::Gate, Kind::Held, 2);
        assert!(any.matches(&held));
        assert!(held.matches(&any));
    }

    #[test]
    fn test_wildcard_still_scoped_to_control() {
        let any = Event::new(Source::Gate, Kind::Any, 2);
        assert!(!any.matches(&Event::new(Source::Gate, Kind::Held, 3)));
    }

    #[test]
    fn test_filter_accepts_under_match() {
        let mut filter = EventFilter::new();
        filter
            .register(Event::new(Source::Button, Kind::Any, 1))
            .unwrap();
        assert!(filter.accepts(&Event::new(Source::Button, Kind::Held, 1)));
        assert!(!filter.accepts(&Event::new(Source::Button, Kind::Held, 0)));
    }

    #[test]
    fn test_filter_capacity_is_recoverable() {
        let mut filter = EventFilter::new();
        for idx in 0..MAX_FILTER_EVENTS as u8 {
            filter
                .register(Event::new(Source::Gate, Kind::Held, idx))
                .unwrap();
        }
        let overflow = filter.register(Event::new(Source::Gate, Kind::Held, 99));
        assert_eq!(overflow, Err(crate::Error::FilterFull));
        // Existing registrations are untouched
        assert!(filter.accepts(&Event::new(Source::Gate, Kind::Held, 0)));
    }

    #[test]
    fn test_filter_unregister_unknown_is_noop() {
        let mut filter = EventFilter::new();
        filter
            .register(Event::new(Source::Gate, Kind::Held, 0))
            .unwrap();
        filter.unregister(Event::new(Source::Gate, Kind::Held, 7));
        assert!(filter.accepts(&Event::new(Source::Gate, Kind::Held, 0)));
    }

    #[test]
    fn test_direction() {
        assert_eq!(Kind::NavUp.direction(), -1);
        assert_eq!(Kind::NavLeft.direction(), -1);
        assert_eq!(Kind::NavDown.direction(), 1);
        assert_eq!(Kind::NavRight.direction(), 1);
        assert_eq!(Kind::Select.direction(), 0);
    }
}
