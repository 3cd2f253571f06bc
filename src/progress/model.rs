use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Grade assigned before any error is counted
pub const MAX_GRADE: u8 = 10;
/// Lowest grade a unit can reach
pub const MIN_GRADE: u8 = 1;

const DAY_FORMAT: &str = "%d-%m-%Y";

/// Calendar day used as the per-day record key (`DD-MM-YYYY` on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Day key for a calendar date
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today in the local time zone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Underlying date
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DAY_FORMAT).map(Self)
    }
}

impl PartialOrd for DayKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DayKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Outcome of one unit on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitResult {
    /// Number of failed words
    pub errors: u32,
    /// Submitted text for each failed word, in order
    pub mistakes: Vec<String>,
    /// Grade in `1..=10`, lowered by one per error
    pub grade: u8,
}

impl UnitResult {
    fn fresh() -> Self {
        Self {
            errors: 0,
            mistakes: Vec::new(),
            grade: MAX_GRADE,
        }
    }

    fn record_error(&mut self, mistake: String) {
        self.errors = self.errors.saturating_add(1);
        self.mistakes.push(mistake);
        if self.grade > MIN_GRADE {
            self.grade = self.grade.min(MAX_GRADE + 1) - 1;
        }
    }
}

/// Unit name to result, for one day
pub type DayRecord = BTreeMap<String, UnitResult>;

/// Everything recorded for one student, keyed by `DD-MM-YYYY`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord {
    days: BTreeMap<String, DayRecord>,
}

impl StudentRecord {
    /// Record for one day, if anything was recorded
    pub fn day(&self, day: DayKey) -> Option<&DayRecord> {
        self.days.get(&day.to_string())
    }

    /// Result of one unit on one day
    pub fn unit(&self, day: DayKey, unit: &str) -> Option<&UnitResult> {
        self.day(day).and_then(|d| d.get(unit))
    }

    /// Records a failed word, creating the unit entry on first failure
    ///
    /// Returns the updated result.
    pub fn record_failure(&mut self, day: DayKey, unit: &str, mistake: String) -> &UnitResult {
        let result = self
            .days
            .entry(day.to_string())
            .or_default()
            .entry(unit.to_owned())
            .or_insert_with(UnitResult::fresh);
        result.record_error(mistake);
        result
    }

    /// Whether any day contains an entry for `unit`
    pub fn has_unit_on_any_day(&self, unit: &str) -> bool {
        self.days.values().any(|d| d.contains_key(unit))
    }

    /// Days in chronological order; keys that don't parse as dates sort last
    pub fn days_chronological(&self) -> Vec<(&str, &DayRecord)> {
        let mut days: Vec<(&str, &DayRecord)> =
            self.days.iter().map(|(k, v)| (k.as_str(), v)).collect();
        days.sort_by_key(|&(k, _)| {
            let parsed = k.parse::<DayKey>().ok();
            (parsed.is_none(), parsed, k)
        });
        days
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// The whole persisted document: student id to student record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressDb {
    students: BTreeMap<String, StudentRecord>,
}

impl ProgressDb {
    /// Record for a student
    pub fn student(&self, student_id: &str) -> Option<&StudentRecord> {
        self.students.get(student_id)
    }

    /// Replaces (or inserts) a student's record
    pub fn put(&mut self, student_id: &str, record: StudentRecord) {
        self.students.insert(student_id.to_owned(), record);
    }

    /// Student ids in sorted order
    pub fn student_ids(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    /// Number of students
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Whether there are no students
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_day_key_round_trip_format() {
        let key = day("01-01-2030");
        assert_eq!(key.to_string(), "01-01-2030");
        assert!("2030-01-01".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_day_key_orders_chronologically() {
        assert!(day("02-01-2030") > day("31-12-2029"));
        assert!(day("01-02-2030") > day("31-01-2030"));
    }

    #[test]
    fn test_first_failure_creates_grade_nine() {
        let mut record = StudentRecord::default();
        let result = record.record_failure(day("01-01-2030"), "А", "мамма".to_owned());
        assert_eq!(result.errors, 1);
        assert_eq!(result.mistakes, vec!["мамма"]);
        assert_eq!(result.grade, 9);
    }

    #[test]
    fn test_second_failure() {
        let mut record = StudentRecord::default();
        let d = day("01-01-2030");
        record.record_failure(d, "А", "w1".to_owned());
        let result = record.record_failure(d, "А", "w2".to_owned()).clone();
        assert_eq!(
            result,
            UnitResult {
                errors: 2,
                mistakes: vec!["w1".to_owned(), "w2".to_owned()],
                grade: 8,
            }
        );
    }

    #[test]
    fn test_grade_is_monotone_with_floor() {
        let mut record = StudentRecord::default();
        let d = day("01-01-2030");
        let mut previous = MAX_GRADE;
        for i in 0..25 {
            let grade = record.record_failure(d, "О", format!("x{i}")).grade;
            assert!(grade <= previous);
            assert!(grade >= MIN_GRADE);
            previous = grade;
        }
        assert_eq!(previous, MIN_GRADE);
        assert_eq!(record.unit(d, "О").unwrap().errors, 25);
    }

    #[test]
    fn test_out_of_range_grade_never_rises() {
        let mut record: StudentRecord = serde_json::from_value(serde_json::json!({
            "01-01-2030": {
                "А": {"errors": 12, "mistakes": [], "grade": 0},
                "О": {"errors": 0, "mistakes": [], "grade": 15}
            }
        }))
        .unwrap();
        let d = day("01-01-2030");
        assert_eq!(record.record_failure(d, "А", "x".to_owned()).grade, 0);
        assert_eq!(record.record_failure(d, "О", "x".to_owned()).grade, MAX_GRADE);
        assert_eq!(record.record_failure(d, "О", "y".to_owned()).grade, 9);
    }

    #[test]
    fn test_new_day_starts_fresh() {
        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), "А", "x".to_owned());
        let result = record.record_failure(day("02-01-2030"), "А", "y".to_owned());
        assert_eq!(result.grade, 9);
        assert!(record.has_unit_on_any_day("А"));
        assert!(!record.has_unit_on_any_day("О"));
    }

    #[test]
    fn test_days_chronological() {
        let mut record = StudentRecord::default();
        record.record_failure(day("02-01-2030"), "А", "x".to_owned());
        record.record_failure(day("31-12-2029"), "А", "x".to_owned());
        record.days.insert("garbage".to_owned(), DayRecord::new());
        let keys: Vec<&str> = record.days_chronological().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["31-12-2029", "02-01-2030", "garbage"]);
    }

    #[test]
    fn test_wire_shape() {
        let mut db = ProgressDb::default();
        let mut record = StudentRecord::default();
        record.record_failure(day("01-01-2030"), "А", "мамма".to_owned());
        db.put("S1", record);

        let value = serde_json::to_value(&db).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "S1": {"01-01-2030": {"А": {"errors": 1, "mistakes": ["мамма"], "grade": 9}}}
            })
        );

        let back: ProgressDb = serde_json::from_value(value).unwrap();
        assert_eq!(back, db);
    }
}
