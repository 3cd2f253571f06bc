use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::event::{DictationEvent, SessionSummary};
use super::plan::{self, CompletionLog, DayPlan};
use super::policy::DictationPolicy;
use super::sequence::{Sequence, Step};
use crate::catalog::Catalog;
use crate::progress::{DayKey, ProgressRepository, StoreError, StudentRecord};

/// Typing this word ends the session without penalty
pub const STOP_WORD: &str = "стоп";

/// Dictation state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not in dictation mode
    Idle,
    /// Waiting for the student code
    AwaitingStudentId,
    /// Selecting the next unit
    UnitActive,
    /// Waiting for the student to type the prompted word
    WordActive,
    /// All planned units are done
    SessionComplete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How the most recent session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every planned unit was taken
    Completed(SessionSummary),
    /// The student typed the stop word
    Stopped(SessionSummary),
    /// The daily cap was already used up
    DailyLimitReached,
    /// A failure ended the session
    Aborted,
}

/// Errors returned by the dictation engine
#[derive(Debug, Error)]
pub enum DictationError {
    /// Operation called in a phase that doesn't accept it
    #[error("{operation} is not allowed in phase {phase}")]
    InvalidPhase {
        /// Rejected operation
        operation: &'static str,
        /// Phase at the time of the call
        phase: Phase,
    },

    /// Student code was blank
    #[error("student id is empty")]
    EmptyStudentId,

    /// A planned unit is not in the catalog
    #[error("unit {0:?} is missing from the catalog")]
    MissingCatalogEntry(String),

    /// Progress could not be read or saved
    #[error("progress store failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Source of the current calendar day
pub trait Clock {
    /// Today's day key
    fn today(&self) -> DayKey;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> DayKey {
        DayKey::today()
    }
}

/// Clock pinned to one day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DayKey);

impl Clock for FixedClock {
    fn today(&self) -> DayKey {
        self.0
    }
}

struct Session {
    student_id: String,
    day: DayKey,
    record: StudentRecord,
    units: Sequence<String>,
    capped: bool,
    unit: Option<String>,
    unit_errors: u32,
    words: Sequence<String>,
    word: Option<String>,
    attempts_left: u32,
    history: HashSet<String>,
    summary: SessionSummary,
}

/// Runs dictation sessions against a catalog and a progress repository
///
/// Every scored failure is written through to the repository before the
/// engine moves on.
pub struct DictationEngine<R: ProgressRepository> {
    catalog: Catalog,
    store: R,
    policy: DictationPolicy,
    clock: Box<dyn Clock>,
    phase: Phase,
    session: Option<Session>,
    completions: CompletionLog,
    outcome: Option<SessionOutcome>,
}

impl<R: ProgressRepository> DictationEngine<R> {
    /// Creates an idle engine using the local clock
    pub fn new(catalog: Catalog, store: R, policy: DictationPolicy) -> Self {
        Self {
            catalog,
            store,
            policy,
            clock: Box::new(LocalClock),
            phase: Phase::Idle,
            session: None,
            completions: CompletionLog::default(),
            outcome: None,
        }
    }

    /// Replaces the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// How the last session ended, until a new one starts
    pub const fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Word the student is asked to type
    pub fn current_prompt_word(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.word.as_deref())
    }

    /// Unit in progress
    pub fn current_unit(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.unit.as_deref())
    }

    /// Student of the active session
    pub fn student_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.student_id.as_str())
    }

    /// Word counts of the active session
    pub fn summary(&self) -> Option<SessionSummary> {
        self.session.as_ref().map(|s| s.summary)
    }

    /// Tries left for the current word
    pub fn attempts_left(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.attempts_left)
    }

    /// Working copy of the active student's record
    pub fn record(&self) -> Option<&StudentRecord> {
        self.session.as_ref().map(|s| &s.record)
    }

    /// Progress repository
    pub const fn store(&self) -> &R {
        &self.store
    }

    /// Switches into dictation mode and asks for the student code
    ///
    /// Ignored while a session is running.
    pub fn enter_dictation(&mut self) -> Vec<DictationEvent> {
        match self.phase {
            Phase::Idle | Phase::SessionComplete | Phase::AwaitingStudentId => {
                info!(from = %self.phase, "dictation mode: → AwaitingStudentId");
                self.phase = Phase::AwaitingStudentId;
                vec![DictationEvent::AskStudentId]
            }
            Phase::UnitActive | Phase::WordActive => {
                debug!(phase = %self.phase, "enter_dictation during session (ignored)");
                Vec::new()
            }
        }
    }

    /// Leaves dictation mode, dropping any session without penalty
    pub fn exit(&mut self) {
        if self.session.take().is_some() {
            info!("session discarded on mode exit");
        }
        self.phase = Phase::Idle;
    }

    /// Computes today's units for a student without starting a session
    ///
    /// Unknown students are registered.
    ///
    /// # Errors
    /// Returns error if the student's record can't be loaded
    pub fn plan_for(&mut self, student_id: &str) -> Result<DayPlan, DictationError> {
        let record = self.store.load(student_id)?;
        Ok(plan::plan_day(
            &self.catalog,
            &self.policy,
            student_id,
            &record,
            self.clock.today(),
            &self.completions,
        ))
    }

    /// Starts a session for the given student code
    ///
    /// # Errors
    /// Returns error if not awaiting a student code, the code is blank, the
    /// record can't be loaded, or a planned unit is missing from the catalog
    pub fn begin_session(&mut self, student_id: &str) -> Result<Vec<DictationEvent>, DictationError> {
        if self.phase != Phase::AwaitingStudentId {
            return Err(DictationError::InvalidPhase {
                operation: "begin_session",
                phase: self.phase,
            });
        }

        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(DictationError::EmptyStudentId);
        }

        let day = self.clock.today();
        let record = self.store.load(student_id)?;
        let plan = plan::plan_day(
            &self.catalog,
            &self.policy,
            student_id,
            &record,
            day,
            &self.completions,
        );
        self.outcome = None;

        let (units, capped) = match plan {
            DayPlan::NoMoreToday { done } => {
                info!(student = student_id, %day, done, "daily unit cap reached");
                self.phase = Phase::Idle;
                self.outcome = Some(SessionOutcome::DailyLimitReached);
                return Ok(vec![DictationEvent::DailyLimitReached]);
            }
            DayPlan::Units { units, capped } => (units, capped),
        };

        info!(
            student = student_id,
            %day,
            units = ?units,
            capped,
            "session started: AwaitingStudentId → UnitActive"
        );

        let session = Session {
            student_id: student_id.to_owned(),
            day,
            record,
            units: Sequence::new(units),
            capped,
            unit: None,
            unit_errors: 0,
            words: Sequence::default(),
            word: None,
            attempts_left: 0,
            history: HashSet::new(),
            summary: SessionSummary::default(),
        };

        let mut events = vec![DictationEvent::StopHint];
        self.advance(session, &mut events)?;
        Ok(events)
    }

    /// Scores a submitted word
    ///
    /// The stop word is checked before the target comparison, so it never
    /// counts as a mistake.
    ///
    /// # Errors
    /// Returns error if no word is active, the failure could not be persisted
    /// (the session is then aborted), or a later unit is missing from the
    /// catalog
    pub fn submit_word(&mut self, text: &str) -> Result<Vec<DictationEvent>, DictationError> {
        let mut session = match (self.phase, self.session.take()) {
            (Phase::WordActive, Some(session)) => session,
            (phase, session) => {
                self.session = session;
                return Err(DictationError::InvalidPhase {
                    operation: "submit_word",
                    phase,
                });
            }
        };

        let answer = text.trim().to_lowercase();
        let mut events = Vec::new();

        if answer == STOP_WORD {
            info!(
                student = %session.student_id,
                correct = session.summary.correct,
                incorrect = session.summary.incorrect,
                "stop word: WordActive → Idle"
            );
            self.phase = Phase::Idle;
            self.outcome = Some(SessionOutcome::Stopped(session.summary));
            events.push(DictationEvent::Stopped(session.summary));
            return Ok(events);
        }

        let expected = session.word.clone().unwrap_or_default();
        if answer == expected {
            debug!(word = %expected, "correct");
            session.summary.correct += 1;
            events.push(DictationEvent::Correct);
            self.advance(session, &mut events)?;
            return Ok(events);
        }

        session.attempts_left = session.attempts_left.saturating_sub(1);
        if session.attempts_left > 0 {
            debug!(word = %expected, answer = %answer, attempts_left = session.attempts_left, "miss");
            events.push(DictationEvent::Incorrect {
                attempts_left: session.attempts_left,
            });
            self.session = Some(session);
            return Ok(events);
        }

        let unit = session.unit.clone().unwrap_or_default();
        let grade = session
            .record
            .record_failure(session.day, &unit, answer.clone())
            .grade;
        session.summary.incorrect += 1;
        session.unit_errors += 1;

        if let Err(e) = self.store.save(&session.student_id, &session.record) {
            warn!(student = %session.student_id, error = %e, "failed to persist mistake, aborting session");
            self.phase = Phase::Idle;
            self.outcome = Some(SessionOutcome::Aborted);
            return Err(e.into());
        }
        info!(
            student = %session.student_id,
            unit = %unit,
            expected = %expected,
            answer = %answer,
            grade,
            "mistake recorded"
        );

        events.push(DictationEvent::WordFailed { expected });
        self.advance(session, &mut events)?;
        Ok(events)
    }

    /// Moves to the next word, finishing units and the session as needed
    fn advance(
        &mut self,
        mut session: Session,
        events: &mut Vec<DictationEvent>,
    ) -> Result<(), DictationError> {
        loop {
            if let Step::Item(word) = session.words.advance() {
                session.word = Some(word.clone());
                session.attempts_left = self.policy.retry.attempts_per_word();
                events.push(DictationEvent::PromptWord(word.clone()));
                self.phase = Phase::WordActive;
                self.session = Some(session);
                return Ok(());
            }
            session.word = None;

            if let Some(unit) = session.unit.take() {
                info!(
                    student = %session.student_id,
                    unit = %unit,
                    errors = session.unit_errors,
                    "unit finished: WordActive → UnitActive"
                );
                self.completions.mark(&session.student_id, session.day, &unit);
                session.summary.units_finished += 1;
                events.push(DictationEvent::UnitFinished {
                    unit,
                    errors: session.unit_errors,
                });
            }
            self.phase = Phase::UnitActive;

            let unit = match session.units.advance() {
                Step::Item(unit) => unit.clone(),
                Step::Exhausted => {
                    info!(
                        student = %session.student_id,
                        summary = ?session.summary,
                        "unit queue exhausted: UnitActive → SessionComplete"
                    );
                    self.phase = Phase::SessionComplete;
                    self.outcome = Some(SessionOutcome::Completed(session.summary));
                    events.push(DictationEvent::SessionComplete {
                        summary: session.summary,
                        daily_limit_reached: session.capped,
                    });
                    return Ok(());
                }
            };

            let Some(words) = plan::build_word_list(
                &self.catalog,
                &unit,
                self.policy.words_per_unit,
                &session.history,
            ) else {
                self.phase = Phase::Idle;
                self.outcome = Some(SessionOutcome::Aborted);
                return Err(DictationError::MissingCatalogEntry(unit));
            };

            debug!(unit = %unit, words = ?words, "unit word list");
            session.history.extend(words.iter().cloned());
            events.push(DictationEvent::UnitStarted {
                unit: unit.clone(),
                words: words.len(),
            });
            session.words = Sequence::new(words);
            session.unit = Some(unit);
            session.unit_errors = 0;
        }
    }
}
