//! Pool lifecycle state machine

/// Lifecycle state of a connection pool.
///
/// The normal progression is `Uninitialized → Initializing → Ready →
/// ShuttingDown → Closed`. Initialization that produces zero usable
/// connections jumps straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// No resources have been created yet
    Uninitialized,
    /// The factory is being run to build the initial stock
    Initializing,
    /// Steady state: acquire/release and both background tasks operate
    Ready,
    /// New acquires fail fast; remaining handles are being closed
    ShuttingDown,
    /// Terminal state
    Closed,
}

impl PoolState {
    /// Whether the pool is accepting acquire calls.
    pub fn is_open(self) -> bool {
        matches!(self, PoolState::Ready)
    }

    /// Whether this is the terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, PoolState::Closed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: PoolState) -> bool {
        use PoolState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Ready)
                | (Initializing, Closed)
                | (Ready, ShuttingDown)
                | (ShuttingDown, Closed)
        )
    }
}
