//! Snapshot-based undo/redo.
//!
//! The stack stores full JSON snapshots. Replays (undo/redo) are guarded by a
//! small state machine so that saves triggered by the replay itself are
//! dropped, explicit saves requested mid-replay run once it finishes, and a
//! second replay request waits in a single slot instead of racing.

/// Replay state of the history engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayState {
    #[default]
    Idle,
    Replaying,
    /// Replaying, and an explicit save is waiting for the replay to end.
    PendingAfterReplay,
}

/// Direction of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDirection {
    Undo,
    Redo,
}

/// Where a save request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    /// Scene events (object added/removed/modified).
    Engine,
    /// A command that mutates state outside the event path, such as a
    /// workspace resize.
    Command,
}

/// Outcome of [`History::request_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Serialize the scene and [`History::push`] it now.
    Record,
    Skip,
    /// Saved once the current replay finishes.
    Deferred,
}

/// What to do after a replay ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayCompletion {
    /// A deferred save must be recorded now.
    pub flush_pending_save: bool,
    /// A queued replay to run next.
    pub next: Option<ReplayDirection>,
}

/// Undo/redo stack of scene snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<String>,
    current: usize,
    state: ReplayState,
    in_flight: Option<ReplayDirection>,
    queued: Option<ReplayDirection>,
    limit: Option<usize>,
}

impl History {
    /// Create an empty history. `limit` caps the number of snapshots kept.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::default()
        }
    }

    /// Reset the stack to exactly one entry.
    pub fn seed(&mut self, snapshot: String) {
        self.snapshots = vec![snapshot];
        self.current = 0;
        self.state = ReplayState::Idle;
        self.in_flight = None;
        self.queued = None;
    }

    /// Decide whether a save should be recorded.
    pub fn request_save(&mut self, origin: SaveOrigin, skip: bool) -> SaveDecision {
        if skip {
            return SaveDecision::Skip;
        }
        match (self.state, origin) {
            (ReplayState::Idle, _) => SaveDecision::Record,
            (_, SaveOrigin::Engine) => {
                log::debug!("history: dropping save triggered by replay");
                SaveDecision::Skip
            }
            (_, SaveOrigin::Command) => {
                log::debug!("history: deferring save until replay ends");
                self.state = ReplayState::PendingAfterReplay;
                SaveDecision::Deferred
            }
        }
    }

    /// Append a snapshot, discarding any redo branch.
    pub fn push(&mut self, snapshot: String) {
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push(snapshot);
        self.current = self.snapshots.len() - 1;

        if let Some(limit) = self.limit {
            let excess = self.snapshots.len().saturating_sub(limit);
            if excess > 0 {
                self.snapshots.drain(..excess);
                self.current -= excess;
            }
        }
    }

    /// Start a replay and return the snapshot to load.
    ///
    /// Returns `None` when there is nothing to replay in that direction, or
    /// when a replay is already running (the request is then queued, last
    /// request wins).
    pub fn begin_replay(&mut self, direction: ReplayDirection) -> Option<String> {
        if self.state != ReplayState::Idle {
            log::debug!("history: queueing {direction:?} behind running replay");
            self.queued = Some(direction);
            return None;
        }
        let target = self.target(direction)?;
        let snapshot = self.snapshots.get(target)?.clone();
        self.state = ReplayState::Replaying;
        self.in_flight = Some(direction);
        Some(snapshot)
    }

    /// End the running replay. On success the index moves to the replayed
    /// snapshot; on failure it stays where it was.
    pub fn finish_replay(&mut self, success: bool) -> ReplayCompletion {
        let direction = self.in_flight.take();
        if let Some(target) = direction.filter(|_| success).and_then(|d| self.target(d)) {
            self.current = target;
        }
        let flush_pending_save = self.state == ReplayState::PendingAfterReplay;
        self.state = ReplayState::Idle;
        ReplayCompletion {
            flush_pending_save,
            next: self.queued.take(),
        }
    }

    fn target(&self, direction: ReplayDirection) -> Option<usize> {
        match direction {
            ReplayDirection::Undo if self.can_undo() => Some(self.current - 1),
            ReplayDirection::Redo if self.can_redo() => Some(self.current + 1),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn is_replaying(&self) -> bool {
        self.state != ReplayState::Idle
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The snapshot at the current index.
    pub fn current(&self) -> Option<&str> {
        self.snapshots.get(self.current).map(String::as_str)
    }
}
