/// What happens when a submitted word doesn't match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Every miss is recorded and the dictation moves on
    Immediate,
    /// The student gets this many tries per word; only the last miss is recorded
    Attempts(u32),
}

impl RetryPolicy {
    /// Tries allowed per word (at least one)
    pub fn attempts_per_word(self) -> u32 {
        match self {
            Self::Immediate => 1,
            Self::Attempts(n) => n.max(1),
        }
    }
}

/// Knobs of the dictation curriculum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictationPolicy {
    /// Retry behaviour on mismatch
    pub retry: RetryPolicy,
    /// Units a student may take per day, `None` for no limit
    pub daily_unit_cap: Option<usize>,
    /// Whether new students start with the initial assessment unit
    pub initial_assessment: bool,
    /// Target word count per unit when padding with earlier words
    pub words_per_unit: usize,
}

impl Default for DictationPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::Attempts(3),
            daily_unit_cap: Some(2),
            initial_assessment: true,
            words_per_unit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_per_word() {
        assert_eq!(RetryPolicy::Immediate.attempts_per_word(), 1);
        assert_eq!(RetryPolicy::Attempts(3).attempts_per_word(), 3);
        assert_eq!(RetryPolicy::Attempts(0).attempts_per_word(), 1);
    }
}
