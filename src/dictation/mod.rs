//! Dictation engine: curriculum sequencing, scoring and progress write-through
//!
//! # Components
//! - `engine.rs`: the session state machine
//! - `plan.rs`: daily unit queue and word-list padding
//! - `event.rs`: events handed to the presentation layer
//! - `policy.rs`: retry policy, daily cap and word targets
//! - `sequence.rs`: finite restartable sequences used for unit and word queues

pub mod engine;
pub mod event;
pub mod plan;
pub mod policy;
pub mod sequence;

pub use engine::{
    Clock, DictationEngine, DictationError, FixedClock, LocalClock, Phase, SessionOutcome,
    STOP_WORD,
};
pub use event::{DictationEvent, SessionSummary};
pub use plan::DayPlan;
pub use policy::{DictationPolicy, RetryPolicy};
