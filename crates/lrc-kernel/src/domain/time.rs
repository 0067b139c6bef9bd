//! # Time Synchronization Engine
//!
//! Per-federate logical time state: the regulating/constrained flags, the
//! lookahead and the time-advance sub-state.
//!
//! ```text
//! [Idle] ──request(T)──→ [Requested{T}] ──not constrained──→ current = T, [Idle]
//!                              │
//!                              └── constrained: wait for coordinator
//!                                        │
//!                              grant(T) ─┘──→ [Granted{T}] ──complete──→ [Idle]
//! ```
//!
//! Current time never decreases. Cross-federate safety of a constrained grant
//! is decided by the federation coordinator, never here.

use crate::error::{KernelError, KernelResult};
use lrc_types::{LogicalInterval, LogicalTime, Message};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Outstanding time-advance request state.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum AdvanceState {
    #[default]
    Idle,
    /// Waiting for the coordinator to grant `target`.
    Requested { target: LogicalTime },
    /// Grant applied, callback not yet delivered.
    Granted { time: LogicalTime },
}

/// Result of a time-advance request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AdvanceDecision {
    /// Not constrained: current time already moved to the target.
    Granted(LogicalTime),
    /// Constrained: the grant will arrive through the inbound queue.
    Pending(LogicalTime),
}

/// What the federation coordinator needs to compute safe grant thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeReport {
    pub current: LogicalTime,
    /// Present only while regulating.
    pub lookahead: Option<LogicalInterval>,
    pub constrained: bool,
}

/// Read-only snapshot is a plain copy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeStatus {
    current: LogicalTime,
    regulating: bool,
    constrained: bool,
    lookahead: LogicalInterval,
    advance: AdvanceState,
}

impl Default for TimeStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeStatus {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: LogicalTime::INITIAL,
            regulating: false,
            constrained: false,
            lookahead: LogicalInterval::ZERO,
            advance: AdvanceState::Idle,
        }
    }

    pub fn current(&self) -> LogicalTime {
        self.current
    }

    pub fn is_regulating(&self) -> bool {
        self.regulating
    }

    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    pub fn lookahead(&self) -> LogicalInterval {
        self.lookahead
    }

    pub fn advance(&self) -> AdvanceState {
        self.advance
    }

    /// Lowest timestamp this federate may still put on an outgoing message:
    /// the current time, or the target of an outstanding advance.
    ///
    /// The federation coordinator bounds regulating federates by the same
    /// value, so nothing is ever sent below a time already granted to others.
    pub fn send_floor(&self) -> LogicalTime {
        match self.advance {
            AdvanceState::Requested { target } if target > self.current => target,
            _ => self.current,
        }
    }

    pub fn report(&self) -> TimeReport {
        TimeReport {
            current: self.current,
            lookahead: self.regulating.then_some(self.lookahead),
            constrained: self.constrained,
        }
    }

    /// Flag toggles are refused while an advance is outstanding.
    fn ensure_idle(&self) -> KernelResult<()> {
        match self.advance {
            AdvanceState::Idle => Ok(()),
            AdvanceState::Requested { target } => {
                Err(KernelError::AdvanceAlreadyPending { pending: target })
            }
            AdvanceState::Granted { time } => Err(KernelError::AdvanceAlreadyPending { pending: time }),
        }
    }

    fn ensure_lookahead(lookahead: LogicalInterval) -> KernelResult<()> {
        if lookahead.is_valid() {
            Ok(())
        } else {
            Err(KernelError::InvalidLookahead { lookahead })
        }
    }

    pub fn enable_regulation(&mut self, lookahead: LogicalInterval) -> KernelResult<()> {
        if self.regulating {
            return Err(KernelError::TimeRegulationAlreadyEnabled);
        }
        Self::ensure_lookahead(lookahead)?;
        self.ensure_idle()?;

        self.regulating = true;
        self.lookahead = lookahead;
        Ok(())
    }

    pub fn disable_regulation(&mut self) -> KernelResult<()> {
        if !self.regulating {
            return Err(KernelError::TimeRegulationNotEnabled);
        }
        self.ensure_idle()?;

        self.regulating = false;
        self.lookahead = LogicalInterval::ZERO;
        Ok(())
    }

    pub fn enable_constrained(&mut self) -> KernelResult<()> {
        if self.constrained {
            return Err(KernelError::TimeConstrainedAlreadyEnabled);
        }
        self.ensure_idle()?;

        self.constrained = true;
        Ok(())
    }

    pub fn disable_constrained(&mut self) -> KernelResult<()> {
        if !self.constrained {
            return Err(KernelError::TimeConstrainedNotEnabled);
        }
        self.ensure_idle()?;

        self.constrained = false;
        Ok(())
    }

    pub fn modify_lookahead(&mut self, lookahead: LogicalInterval) -> KernelResult<()> {
        if !self.regulating {
            return Err(KernelError::TimeRegulationNotEnabled);
        }
        Self::ensure_lookahead(lookahead)?;

        self.lookahead = lookahead;
        Ok(())
    }

    /// Start a time advance to `target`.
    ///
    /// Target must be strictly greater than the current time and no other
    /// request may be outstanding. A federate that is not constrained is
    /// granted on the spot.
    pub fn request_advance(&mut self, target: LogicalTime) -> KernelResult<AdvanceDecision> {
        if !target.is_valid() {
            return Err(KernelError::InvalidLogicalTime { time: target });
        }
        if target <= self.current {
            return Err(KernelError::TimeMustAdvance {
                requested: target,
                current: self.current,
            });
        }
        self.ensure_idle()?;

        self.advance = AdvanceState::Requested { target };

        if self.constrained {
            return Ok(AdvanceDecision::Pending(target));
        }

        self.current = target;
        self.advance = AdvanceState::Idle;
        Ok(AdvanceDecision::Granted(target))
    }

    /// `Requested -> Idle` when the coordinator never accepted the request.
    pub(crate) fn abandon_advance(&mut self) {
        if matches!(self.advance, AdvanceState::Requested { .. }) {
            self.advance = AdvanceState::Idle;
        }
    }

    /// Coordinator grant for the outstanding request: `Requested -> Granted`.
    pub fn apply_grant(&mut self, time: LogicalTime) -> KernelResult<()> {
        match self.advance {
            AdvanceState::Requested { target } if target == time => {
                self.current = time;
                self.advance = AdvanceState::Granted { time };
                Ok(())
            }
            _ => Err(KernelError::UnexpectedGrant { granted: time }),
        }
    }

    /// Grant callback delivered: `Granted -> Idle`.
    pub fn complete_grant(&mut self) -> KernelResult<LogicalTime> {
        match self.advance {
            AdvanceState::Granted { time } => {
                self.advance = AdvanceState::Idle;
                Ok(time)
            }
            _ => Err(KernelError::UnexpectedGrant {
                granted: self.current,
            }),
        }
    }
}

/// A timestamped delivery waiting for the local clock to reach it.
#[derive(Debug)]
struct Held {
    time: LogicalTime,
    seq: u64,
    message: Message,
}

impl PartialEq for Held {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Held {}

impl PartialOrd for Held {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Held {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Time-stamp-ordered holding queue of a constrained federate.
///
/// Messages with equal timestamps are released in arrival order.
#[derive(Debug, Default)]
pub struct TsoQueue {
    held: BinaryHeap<Reverse<Held>>,
    next_seq: u64,
}

impl TsoQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `message` until the clock reaches `time`.
    pub fn hold(&mut self, time: LogicalTime, message: Message) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.held.push(Reverse(Held { time, seq, message }));
    }

    /// Remove and return every message with timestamp `<= time`, earliest first.
    pub fn release_through(&mut self, time: LogicalTime) -> Vec<Message> {
        let mut released = Vec::new();
        while let Some(Reverse(next)) = self.held.peek() {
            if next.time.total_cmp(&time) == Ordering::Greater {
                break;
            }
            if let Some(Reverse(held)) = self.held.pop() {
                released.push(held.message);
            }
        }
        released
    }

    /// Remove and return everything, earliest first.
    pub fn drain_all(&mut self) -> Vec<Message> {
        let mut all = Vec::with_capacity(self.held.len());
        while let Some(Reverse(held)) = self.held.pop() {
            all.push(held.message);
        }
        all
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}
