//! Back/forward history: a linear stack of locations with a cursor.
//!
//! Pushing while not at the tip discards the forward entries. Pushing the
//! location that is already current is a no-op. Every mutation schedules
//! one deferred notification; the owner's event loop delivers them with
//! [`NavigationHistory::dispatch_notifications`] once the current handler
//! has returned, so listeners always see settled state.

use vmd_types::Location;

/// Settled state handed to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStatus {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub position: Option<usize>,
    pub len: usize,
}

type Listener = Box<dyn FnMut(HistoryStatus)>;

/// Token returned by [`NavigationHistory::subscribe`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription leaves no way to unsubscribe"]
pub struct Subscription(u64);

/// Per-window navigation history.
pub struct NavigationHistory {
    entries: Vec<Location>,
    position: Option<usize>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    pending: usize,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            position: None,
            listeners: Vec::new(),
            next_listener_id: 0,
            pending: 0,
        }
    }

    /// Make `location` the current entry.
    ///
    /// Returns the current entry afterwards, which is the existing one when
    /// `location` equals it.
    pub fn push(&mut self, location: Location) -> &Location {
        if let Some(pos) = self.position
            && self.entries[pos] == location
        {
            return &self.entries[pos];
        }

        if let Some(pos) = self.position {
            self.entries.truncate(pos + 1);
        }
        self.entries.push(location);
        let tip = self.entries.len() - 1;
        self.position = Some(tip);
        self.schedule_notification();
        &self.entries[tip]
    }

    /// Whether stepping back `steps` entries stays inside the history.
    pub fn can_go_back(&self, steps: usize) -> bool {
        self.position.is_some_and(|pos| pos >= steps)
    }

    /// Whether stepping forward `steps` entries stays inside the history.
    pub fn can_go_forward(&self, steps: usize) -> bool {
        self.position
            .and_then(|pos| pos.checked_add(steps))
            .is_some_and(|target| target < self.entries.len())
    }

    /// Step back, clamping at the oldest entry.
    pub fn back(&mut self, steps: usize) -> Option<&Location> {
        if let Some(pos) = self.position {
            self.position = Some(pos.saturating_sub(steps));
        }
        self.schedule_notification();
        self.current()
    }

    /// Step forward, clamping at the newest entry.
    pub fn forward(&mut self, steps: usize) -> Option<&Location> {
        if self.can_go_forward(steps) {
            self.position = self.position.map(|pos| pos + steps);
        } else if !self.entries.is_empty() {
            self.position = Some(self.entries.len() - 1);
        }
        self.schedule_notification();
        self.current()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&Location> {
        self.position.map(|pos| &self.entries[pos])
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_go_back: self.can_go_back(1),
            can_go_forward: self.can_go_forward(1),
            position: self.position,
            len: self.entries.len(),
        }
    }

    /// Register a listener, called once per mutation on the next dispatch.
    pub fn subscribe(&mut self, listener: impl FnMut(HistoryStatus) + 'static) -> Subscription {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Remove the listener behind `subscription`.
    ///
    /// Returns `false` when it was already removed.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    /// Number of notifications waiting for the next dispatch.
    pub fn pending_notifications(&self) -> usize {
        self.pending
    }

    /// Deliver every pending notification.
    ///
    /// Each mutation since the last dispatch yields one call per listener;
    /// all calls observe the current (settled) status. Returns the number
    /// of mutations delivered.
    pub fn dispatch_notifications(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        if pending == 0 {
            return 0;
        }
        let status = self.status();
        for _ in 0..pending {
            for (_, listener) in &mut self.listeners {
                listener(status);
            }
        }
        pending
    }

    fn schedule_notification(&mut self) {
        self.pending += 1;
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NavigationHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationHistory")
            .field("entries", &self.entries)
            .field("position", &self.position)
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending)
            .finish()
    }
}
