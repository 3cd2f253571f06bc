//! Daily unit queue and per-unit word lists
//!
//! Both computations are pure: the same catalog, record and completion log
//! always produce the same plan.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::policy::DictationPolicy;
use crate::catalog::{Catalog, INITIAL_ASSESSMENT};
use crate::progress::{DayKey, StudentRecord};

/// Units for one student on one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayPlan {
    /// Units to take, in order; `capped` is set when the daily cap cut the list
    Units {
        /// Unit names in curriculum order
        units: Vec<String>,
        /// Whether more units were available than the cap allows
        capped: bool,
    },
    /// The daily cap is already used up
    NoMoreToday {
        /// Units already done today
        done: usize,
    },
}

impl DayPlan {
    /// Planned units; empty when nothing more may be taken today
    pub fn units(&self) -> &[String] {
        match self {
            Self::Units { units, .. } => units,
            Self::NoMoreToday { .. } => &[],
        }
    }
}

/// Units finished during this process, per student and day
///
/// A unit finished without errors leaves nothing in the persisted record, so
/// this log is what keeps it from being offered again the same day.
#[derive(Debug, Clone, Default)]
pub struct CompletionLog {
    finished: HashMap<String, BTreeMap<DayKey, BTreeSet<String>>>,
}

impl CompletionLog {
    /// Marks a unit finished
    pub fn mark(&mut self, student_id: &str, day: DayKey, unit: &str) {
        self.finished
            .entry(student_id.to_owned())
            .or_default()
            .entry(day)
            .or_default()
            .insert(unit.to_owned());
    }

    /// Units the student finished on `day`
    pub fn finished_on(&self, student_id: &str, day: DayKey) -> impl Iterator<Item = &str> {
        self.finished
            .get(student_id)
            .and_then(|days| days.get(&day))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Whether the student finished `unit` on any day
    pub fn finished_ever(&self, student_id: &str, unit: &str) -> bool {
        self.finished
            .get(student_id)
            .is_some_and(|days| days.values().any(|units| units.contains(unit)))
    }
}

/// Computes today's unit queue for a student
///
/// The assessment comes first until it has been taken. Letter units follow in
/// catalog order, skipping any unit already done today. The daily cap counts
/// every unit done today, including ones from earlier sessions.
pub fn plan_day(
    catalog: &Catalog,
    policy: &DictationPolicy,
    student_id: &str,
    record: &StudentRecord,
    day: DayKey,
    log: &CompletionLog,
) -> DayPlan {
    let done: BTreeSet<&str> = record
        .day(day)
        .into_iter()
        .flat_map(|d| d.keys().map(String::as_str))
        .chain(log.finished_on(student_id, day))
        .collect();

    let remaining = match policy.daily_unit_cap {
        Some(cap) if done.len() >= cap => return DayPlan::NoMoreToday { done: done.len() },
        Some(cap) => cap - done.len(),
        None => usize::MAX,
    };

    let assessment_pending = policy.initial_assessment
        && !record.has_unit_on_any_day(INITIAL_ASSESSMENT)
        && !log.finished_ever(student_id, INITIAL_ASSESSMENT);

    let candidates: Vec<String> = catalog
        .ordered_units(assessment_pending)
        .into_iter()
        .filter(|unit| !done.contains(unit))
        .map(str::to_owned)
        .collect();

    let capped = candidates.len() > remaining;
    let units = candidates.into_iter().take(remaining).collect();
    DayPlan::Units { units, capped }
}

/// Builds the word list for one unit
///
/// The unit's own words always come first. If there are fewer than `target`,
/// words from earlier units (nearest first) are borrowed, skipping anything
/// already in the list or in `history`. Returns `None` if the catalog doesn't
/// know the unit.
pub fn build_word_list(
    catalog: &Catalog,
    unit: &str,
    target: usize,
    history: &HashSet<String>,
) -> Option<Vec<String>> {
    let own = catalog.words_for(unit)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut words: Vec<String> = own
        .iter()
        .filter(|w| seen.insert(w.as_str()))
        .cloned()
        .collect();

    let borrowed = catalog
        .units_before(unit)
        .flat_map(|u| u.words.iter())
        .filter(|w| !history.contains(w.as_str()));
    for word in borrowed {
        if words.len() >= target {
            break;
        }
        if seen.insert(word.as_str()) {
            words.push(word.clone());
        }
    }

    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CurriculumUnit;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn small_catalog() -> Catalog {
        let unit = |name: &str, words: &[&str]| CurriculumUnit {
            name: name.to_owned(),
            words: words.iter().map(|&w| w.to_owned()).collect(),
        };
        Catalog::new(
            vec!["дом".to_owned(), "кот".to_owned()],
            vec![
                unit("А", &["а", "мама", "папа", "рама", "лапа", "каша"]),
                unit("О", &["он", "сом", "кот", "нос", "дом", "окно"]),
                unit("У", &["ум", "утка", "мама"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_student_starts_with_assessment() {
        let plan = plan_day(
            &small_catalog(),
            &DictationPolicy::default(),
            "S1",
            &StudentRecord::default(),
            day("01-01-2030"),
            &CompletionLog::default(),
        );
        assert_eq!(
            plan,
            DayPlan::Units {
                units: vec![INITIAL_ASSESSMENT.to_owned(), "А".to_owned()],
                capped: true,
            }
        );
    }

    #[test]
    fn test_plan_is_idempotent() {
        let catalog = Catalog::builtin();
        let policy = DictationPolicy::default();
        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), "А", "x".to_owned());
        let log = CompletionLog::default();

        let first = plan_day(&catalog, &policy, "S1", &record, day("02-01-2030"), &log);
        let second = plan_day(&catalog, &policy, "S1", &record, day("02-01-2030"), &log);
        assert_eq!(first, second);
    }

    #[test]
    fn test_skips_units_done_today() {
        let policy = DictationPolicy {
            daily_unit_cap: None,
            ..DictationPolicy::default()
        };
        let today = day("01-01-2030");
        let mut record = StudentRecord::default();
        record.record_failure(today, "А", "x".to_owned());
        let mut log = CompletionLog::default();
        log.mark("S1", today, INITIAL_ASSESSMENT);

        let plan = plan_day(&small_catalog(), &policy, "S1", &record, today, &log);
        assert_eq!(plan.units(), ["О", "У"]);
    }

    #[test]
    fn test_assessment_only_once() {
        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), INITIAL_ASSESSMENT, "x".to_owned());

        let plan = plan_day(
            &small_catalog(),
            &DictationPolicy::default(),
            "S1",
            &record,
            day("02-01-2030"),
            &CompletionLog::default(),
        );
        assert_eq!(plan.units(), ["А", "О"]);
    }

    #[test]
    fn test_assessment_disabled() {
        let policy = DictationPolicy {
            initial_assessment: false,
            ..DictationPolicy::default()
        };
        let plan = plan_day(
            &small_catalog(),
            &policy,
            "S1",
            &StudentRecord::default(),
            day("01-01-2030"),
            &CompletionLog::default(),
        );
        assert_eq!(plan.units(), ["А", "О"]);
    }

    #[test]
    fn test_cap_reached() {
        let today = day("01-01-2030");
        let mut log = CompletionLog::default();
        log.mark("S1", today, INITIAL_ASSESSMENT);
        log.mark("S1", today, "А");

        let plan = plan_day(
            &small_catalog(),
            &DictationPolicy::default(),
            "S1",
            &StudentRecord::default(),
            today,
            &log,
        );
        assert_eq!(plan, DayPlan::NoMoreToday { done: 2 });
        assert!(plan.units().is_empty());
    }

    #[test]
    fn test_cap_counts_recorded_and_logged_units() {
        let today = day("01-01-2030");
        let mut record = StudentRecord::default();
        record.record_failure(today, INITIAL_ASSESSMENT, "x".to_owned());
        let mut log = CompletionLog::default();
        log.mark("S1", today, INITIAL_ASSESSMENT);

        let plan = plan_day(
            &small_catalog(),
            &DictationPolicy::default(),
            "S1",
            &record,
            today,
            &log,
        );
        assert_eq!(plan.units(), ["А"]);
    }

    #[test]
    fn test_log_is_per_student_and_day() {
        let mut log = CompletionLog::default();
        log.mark("S1", day("01-01-2030"), "А");
        assert_eq!(log.finished_on("S1", day("02-01-2030")).count(), 0);
        assert_eq!(log.finished_on("S2", day("01-01-2030")).count(), 0);
        assert!(log.finished_ever("S1", "А"));
        assert!(!log.finished_ever("S2", "А"));
    }

    #[test]
    fn test_word_list_pads_from_earlier_units() {
        let catalog = small_catalog();
        let words = build_word_list(&catalog, "У", 10, &HashSet::new()).unwrap();

        assert_eq!(words.len(), 10);
        assert_eq!(&words[..3], ["ум", "утка", "мама"]);
        // nearest earlier unit first
        assert_eq!(&words[3..9], ["он", "сом", "кот", "нос", "дом", "окно"]);
        assert_eq!(words[9], "а");
    }

    #[test]
    fn test_word_list_has_no_duplicates_and_skips_history() {
        let catalog = small_catalog();
        let history: HashSet<String> = ["он", "сом", "а"].iter().map(|&w| w.to_owned()).collect();
        let words = build_word_list(&catalog, "У", 10, &history).unwrap();

        let unique: HashSet<&String> = words.iter().collect();
        assert_eq!(unique.len(), words.len());
        assert!(!words.iter().any(|w| w == "он" || w == "сом" || w == "а"));
        for own in ["ум", "утка", "мама"] {
            assert!(words.iter().any(|w| w == own));
        }
        assert_eq!(words.len(), 10);
    }

    #[test]
    fn test_word_list_short_when_history_runs_out() {
        let catalog = small_catalog();
        let words = build_word_list(&catalog, "А", 10, &HashSet::new()).unwrap();
        assert_eq!(words.len(), 6);
    }

    #[test]
    fn test_own_words_kept_even_if_in_history() {
        let catalog = small_catalog();
        let history: HashSet<String> = ["мама".to_owned()].into_iter().collect();
        let words = build_word_list(&catalog, "А", 10, &history).unwrap();
        assert!(words.iter().any(|w| w == "мама"));
    }

    #[test]
    fn test_builtin_units_all_reach_target_or_use_everything() {
        let catalog = Catalog::builtin();
        for unit in catalog.ordered_units(true) {
            let words = build_word_list(&catalog, unit, 10, &HashSet::new()).unwrap();
            let own = catalog.words_for(unit).unwrap();
            assert!(words.len() >= own.len().min(10), "{unit}");
            if unit != "А" && unit != INITIAL_ASSESSMENT {
                assert!(words.len() >= 10, "{unit} has {} words", words.len());
            }
        }
    }

    #[test]
    fn test_unknown_unit() {
        assert!(build_word_list(&small_catalog(), "Щ", 10, &HashSet::new()).is_none());
    }
}
