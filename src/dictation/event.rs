use crate::catalog::INITIAL_ASSESSMENT;

/// Word counts for one dictation session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Words typed correctly
    pub correct: u32,
    /// Words recorded as failed
    pub incorrect: u32,
    /// Units finished in this session
    pub units_finished: usize,
}

/// Something the engine wants said to the student
///
/// The engine never speaks itself; the presentation layer turns these into
/// speech via [`DictationEvent::speech`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// Ask for the student code
    AskStudentId,
    /// Explain how to stop
    StopHint,
    /// The daily unit cap is used up
    DailyLimitReached,
    /// A unit begins
    UnitStarted {
        /// Unit name
        unit: String,
        /// Number of words in this unit
        words: usize,
    },
    /// Type this word next
    PromptWord(String),
    /// The last submission matched
    Correct,
    /// The last submission missed but tries remain
    Incorrect {
        /// Tries left for this word
        attempts_left: u32,
    },
    /// The word was recorded as failed
    WordFailed {
        /// The word that was expected
        expected: String,
    },
    /// A unit ended
    UnitFinished {
        /// Unit name
        unit: String,
        /// Failed words in this unit
        errors: u32,
    },
    /// Every planned unit is done
    SessionComplete {
        /// Word counts
        summary: SessionSummary,
        /// The daily cap stopped the session early
        daily_limit_reached: bool,
    },
    /// The student typed the stop word
    Stopped(SessionSummary),
}

impl DictationEvent {
    /// Russian phrase to announce
    pub fn speech(&self) -> String {
        match self {
            Self::AskStudentId => "Введите свой код ученика".to_owned(),
            Self::StopHint => "Чтобы остановить программу наберите слово СТОП".to_owned(),
            Self::DailyLimitReached => {
                "На сегодня диктанты закончены. Приходите завтра".to_owned()
            }
            Self::UnitStarted { unit, .. } if unit == INITIAL_ASSESSMENT => {
                "Входной диктант".to_owned()
            }
            Self::UnitStarted { unit, .. } => format!("Диктант на букву {unit}"),
            Self::PromptWord(word) if word.chars().count() == 1 => {
                format!("Наберите букву {word}")
            }
            Self::PromptWord(word) => format!("Наберите слово {word}"),
            Self::Correct => "Правильно!".to_owned(),
            Self::Incorrect { attempts_left } => {
                format!("Неправильно! Осталось попыток: {attempts_left}")
            }
            Self::WordFailed { expected } => format!("Неправильно! Правильно: {expected}"),
            Self::UnitFinished { errors, .. } => format!("Диктант окончен. Ошибок: {errors}"),
            Self::SessionComplete {
                summary,
                daily_limit_reached,
            } => {
                let mut text = format!(
                    "Все диктанты пройдены. Правильных ответов {}. Неправильных ответов {}",
                    summary.correct, summary.incorrect
                );
                if *daily_limit_reached {
                    text.push_str(". На сегодня всё");
                }
                text
            }
            Self::Stopped(summary) => format!(
                "Ваше количество правильных ответов {}. Ваше количество неправильных ответов {}",
                summary.correct, summary.incorrect
            ),
        }
    }

    /// Whether this event ends the session
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DailyLimitReached | Self::SessionComplete { .. } | Self::Stopped(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_letter_vs_word() {
        assert_eq!(
            DictationEvent::PromptWord("а".to_owned()).speech(),
            "Наберите букву а"
        );
        assert_eq!(
            DictationEvent::PromptWord("мама".to_owned()).speech(),
            "Наберите слово мама"
        );
    }

    #[test]
    fn test_stopped_reports_counts() {
        let summary = SessionSummary {
            correct: 4,
            incorrect: 1,
            units_finished: 0,
        };
        let text = DictationEvent::Stopped(summary).speech();
        assert!(text.contains("правильных ответов 4"));
        assert!(text.contains("неправильных ответов 1"));
    }

    #[test]
    fn test_terminal_events() {
        assert!(DictationEvent::DailyLimitReached.is_terminal());
        assert!(DictationEvent::Stopped(SessionSummary::default()).is_terminal());
        assert!(!DictationEvent::Correct.is_terminal());
        assert!(!DictationEvent::UnitFinished {
            unit: "А".to_owned(),
            errors: 0
        }
        .is_terminal());
    }

    #[test]
    fn test_assessment_unit_name() {
        let event = DictationEvent::UnitStarted {
            unit: INITIAL_ASSESSMENT.to_owned(),
            words: 10,
        };
        assert_eq!(event.speech(), "Входной диктант");
    }
}
