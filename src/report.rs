use anyhow::{bail, Result};

use crate::progress::{ProgressDb, StudentRecord};

/// Renders the progress report
///
/// Without a student, every student is listed in turn. Days are in calendar
/// order; a unit with no mistakes has no "Ошибки" line.
///
/// # Errors
/// Returns error if the requested student has no record
pub fn render(db: &ProgressDb, student: Option<&str>) -> Result<String> {
    if let Some(id) = student {
        let Some(record) = db.student(id) else {
            bail!("student {id:?} not found");
        };
        return Ok(render_student(id, record));
    }

    if db.is_empty() {
        return Ok("Нет учеников\n".to_owned());
    }

    let ids: Vec<&str> = db.student_ids().collect();
    let mut out = format!("Ученики: {}\n", ids.join(", "));
    for id in ids {
        if let Some(record) = db.student(id) {
            out.push('\n');
            out.push_str(&render_student(id, record));
        }
    }
    Ok(out)
}

fn render_student(id: &str, record: &StudentRecord) -> String {
    let mut out = format!("{id}\n");
    if record.is_empty() {
        out.push_str("  Нет диктантов\n");
        return out;
    }
    for (day, units) in record.days_chronological() {
        out.push_str(&format!("  {day}\n"));
        for (unit, result) in units {
            out.push_str(&format!(
                "    {unit}: Ошибок {}, Оценка {}\n",
                result.errors, result.grade
            ));
            if !result.mistakes.is_empty() {
                out.push_str(&format!("      Ошибки: {}\n", result.mistakes.join(", ")));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::DayKey;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn db() -> ProgressDb {
        let mut record = StudentRecord::default();
        record.record_failure(day("02-01-2030"), "О", "сн".to_owned());
        record.record_failure(day("31-12-2029"), "А", "мпма".to_owned());
        record.record_failure(day("31-12-2029"), "А", "мама ".to_owned());

        let mut db = ProgressDb::default();
        db.put("S1", record);
        db.put("S2", StudentRecord::default());
        db
    }

    #[test]
    fn test_single_student_days_in_calendar_order() {
        let text = render(&db(), Some("S1")).unwrap();
        assert_eq!(
            text,
            "S1\n  31-12-2029\n    А: Ошибок 2, Оценка 8\n      Ошибки: мпма, мама \n  02-01-2030\n    О: Ошибок 1, Оценка 9\n      Ошибки: сн\n"
        );
    }

    #[test]
    fn test_all_students() {
        let text = render(&db(), None).unwrap();
        assert!(text.starts_with("Ученики: S1, S2\n"));
        assert!(text.contains("S2\n  Нет диктантов\n"));
    }

    #[test]
    fn test_unknown_student() {
        assert!(render(&db(), Some("S9")).is_err());
    }

    #[test]
    fn test_empty_db() {
        assert_eq!(render(&ProgressDb::default(), None).unwrap(), "Нет учеников\n");
    }
}
