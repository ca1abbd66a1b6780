use crate::dto::output::NotificationEvent;

///
/// In-memory state of one logical stream: ordered notification list
/// (newest first, insertion-ordered), incrementally maintained unread
/// counter and the transport liveness flag.
///
/// Every operation keeps the invariant
/// `unread_count == events.iter().filter(|e| !e.read).count()`.
/// The counter is updated incrementally on insert/mark/remove;
/// [Self::recount] recomputes it by full scan so tests can reconcile.
///
#[derive(Debug, Default)]
pub struct StreamState {
    events: Vec<NotificationEvent>,
    unread_count: usize,
    connected: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    ///
    /// Prepends an inbound event. Safe to call with an id that is already
    /// present: reconnects redeliver frames, a duplicate must not
    /// double-insert or double-count.
    ///
    /// ### Returns
    /// `true` when the event was inserted, `false` for a duplicate
    ///
    pub fn apply_inbound(&mut self, event: NotificationEvent) -> bool {
        let duplicate = self.events.iter().any(|existing| existing.id == event.id);
        if duplicate {
            tracing::trace!(id = event.id, "duplicate event absorbed");
            return false;
        }

        if !event.read {
            self.unread_count += 1;
        }
        self.events.insert(0, event);

        true
    }

    ///
    /// ### Returns
    /// `true` when an unread event was marked, `false` for an unknown id
    /// or an event that was already read
    ///
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(event) = self
            .events
            .iter_mut()
            .find(|event| event.id == id && !event.read)
        else {
            return false;
        };

        event.read = true;
        self.unread_count = self.unread_count.saturating_sub(1);

        true
    }

    pub fn mark_all_read(&mut self) {
        for event in &mut self.events {
            event.read = true;
        }
        self.unread_count = 0;
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(idx) = self.events.iter().position(|event| event.id == id) else {
            return false;
        };

        let removed = self.events.remove(idx);
        if !removed.read {
            self.unread_count = self.unread_count.saturating_sub(1);
        }

        true
    }

    pub fn clear_all(&mut self) {
        self.events.clear();
        self.unread_count = 0;
    }

    ///
    /// Replaces the list with a server-provided snapshot and recomputes
    /// the unread counter by full scan. The one operation allowed to
    /// recount, since it establishes ground truth.
    ///
    pub fn hydrate(&mut self, events: Vec<NotificationEvent>) {
        self.events = events;
        self.unread_count = self.recount();
    }

    ///
    /// Seeds the unread counter from a REST baseline when no message
    /// payloads are cached yet (chat stream on a fresh session). The
    /// counter may exceed the cached event count until the next hydrate.
    ///
    pub fn seed_unread(&mut self, count: usize) {
        self.unread_count = count;
    }

    pub fn recount(&self) -> usize {
        self.events.iter().filter(|event| !event.read).count()
    }
}
