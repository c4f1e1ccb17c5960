// Counter adjustment: absolute readings to per-interval deltas
use crate::domain::channel::CounterType;

/// Share of the previous reading an increment-only counter may drop to before
/// the drop counts as a device reset rather than a misread.
pub const INCREMENT_RESET_TOLERANCE: f64 = 0.9;

/// Mirror of [`INCREMENT_RESET_TOLERANCE`] for decrement-only counters.
pub const DECREMENT_RESET_TOLERANCE: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
    /// Plain difference, no reset detection.
    Bidirectional,
}

impl From<CounterType> for Direction {
    fn from(counter_type: CounterType) -> Self {
        match counter_type {
            CounterType::AlwaysIncrement => Direction::Increment,
            CounterType::AlwaysDecrement => Direction::Decrement,
            CounterType::IncrementAndDecrement => Direction::Bidirectional,
        }
    }
}

/// Outcome of comparing one reading against the last accepted one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterStep {
    /// First reading of the sequence; it only sets the baseline.
    Baseline,
    /// No reading at this timestamp.
    Missing,
    Advance(f64),
    /// Within tolerance but against the counter direction; reported as zero.
    Stale,
    /// Device counter reset; the raw reading is reported as the delta.
    Reset(f64),
}

impl CounterStep {
    pub fn delta(self) -> Option<f64> {
        match self {
            CounterStep::Baseline | CounterStep::Missing => None,
            CounterStep::Advance(delta) | CounterStep::Reset(delta) => Some(delta),
            CounterStep::Stale => Some(0.0),
        }
    }

    pub fn is_reset(self) -> bool {
        matches!(self, CounterStep::Reset(_))
    }

    /// Whether the reading becomes the new baseline.
    pub fn advances(self) -> bool {
        matches!(
            self,
            CounterStep::Baseline | CounterStep::Advance(_) | CounterStep::Reset(_)
        )
    }
}

/// Classifies `current` against the last accepted reading `previous`.
pub fn counter_step(direction: Direction, previous: f64, current: f64) -> CounterStep {
    match direction {
        Direction::Increment => {
            if current >= previous * INCREMENT_RESET_TOLERANCE {
                if current >= previous {
                    CounterStep::Advance(current - previous)
                } else {
                    CounterStep::Stale
                }
            } else {
                CounterStep::Reset(current)
            }
        }
        Direction::Decrement => {
            if current <= previous * DECREMENT_RESET_TOLERANCE {
                if current <= previous {
                    CounterStep::Advance(current - previous)
                } else {
                    CounterStep::Stale
                }
            } else {
                CounterStep::Reset(current)
            }
        }
        Direction::Bidirectional => CounterStep::Advance(current - previous),
    }
}

/// Left-to-right fold state: the last accepted absolute reading.
#[derive(Debug, Clone, Copy)]
pub struct CounterTracker {
    direction: Direction,
    previous: Option<f64>,
}

impl CounterTracker {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            previous: None,
        }
    }

    pub fn observe(&mut self, reading: Option<f64>) -> CounterStep {
        let Some(current) = reading else {
            return CounterStep::Missing;
        };
        let step = match self.previous {
            None => CounterStep::Baseline,
            Some(previous) => counter_step(self.direction, previous, current),
        };
        if step.advances() {
            self.previous = Some(current);
        }
        step
    }
}
