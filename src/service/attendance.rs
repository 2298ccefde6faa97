use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use derive_more::Display;
use sqlx::MySqlPool;
use tracing::warn;

use crate::directory::EmployeeDirectory;
use crate::engine::sequencer::{self, ActionError};
use crate::model::attendance::{AttendanceAction, AttendanceRecord};
use crate::model::employee_config::EmployeeConfig;

const RECORD_COLUMNS: &str = "id, employee_id, employee_name, date, check_in, check_out, \
     break_in, break_out, status, break_duration_seconds, break_overrun, version";

#[derive(Debug, Display)]
pub enum SubmitError {
    /// No configuration row for the employee; blocks the action entirely.
    #[display(fmt = "Employee configuration not found")]
    UnknownEmployee,
    /// State-machine guard violation, surfaced verbatim to the caller.
    #[display(fmt = "{}", _0)]
    Rejected(ActionError),
    /// Lost a concurrent race for the same record; the caller may retry.
    #[display(fmt = "Attendance record was updated concurrently")]
    Conflict,
    #[display(fmt = "storage error: {}", _0)]
    Storage(sqlx::Error),
}

impl From<ActionError> for SubmitError {
    fn from(err: ActionError) -> Self {
        SubmitError::Rejected(err)
    }
}

impl From<sqlx::Error> for SubmitError {
    fn from(err: sqlx::Error) -> Self {
        SubmitError::Storage(err)
    }
}

/// Run one attendance action end to end: configuration lookup, open-record
/// location, state-machine validation, atomic persist. Returns the new record
/// snapshot on acceptance.
pub async fn submit_action(
    pool: &MySqlPool,
    directory: &EmployeeDirectory,
    employee_id: &str,
    employee_name: &str,
    action: AttendanceAction,
    timestamp: DateTime<Utc>,
) -> Result<AttendanceRecord, SubmitError> {
    let config = directory
        .lookup(employee_id)
        .await?
        .ok_or(SubmitError::UnknownEmployee)?;

    let existing = locate_open_record(pool, &config, timestamp).await?;
    let transition = sequencer::apply(existing, action, timestamp, employee_name, &config)?;

    let record = if transition.created {
        insert_record(pool, transition.record).await?
    } else {
        update_record(pool, transition.record).await?
    };

    if action == AttendanceAction::Breakout && record.break_overrun {
        warn!(
            employee_id,
            break_duration_seconds = record.break_duration_seconds,
            allowed_minutes = config.max_break_duration_minutes,
            "break allowance exceeded"
        );
    }

    Ok(record)
}

/// Current-day view for an employee: the configuration plus today's record,
/// if one exists.
pub async fn today_status(
    pool: &MySqlPool,
    directory: &EmployeeDirectory,
    employee_id: &str,
    now: DateTime<Utc>,
) -> Result<(EmployeeConfig, Option<AttendanceRecord>), SubmitError> {
    let config = directory
        .lookup(employee_id)
        .await?
        .ok_or(SubmitError::UnknownEmployee)?;
    let record = locate_open_record(pool, &config, now).await?;
    Ok((config, record))
}

/// Locate the record an action at instant `at` belongs to.
///
/// The action's UTC date wins; when it has no record, the previous UTC date's
/// record is used exactly when `continues_previous_day` says so.
async fn locate_open_record(
    pool: &MySqlPool,
    config: &EmployeeConfig,
    at: DateTime<Utc>,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let anchor = at.date_naive();
    if let Some(record) = find_by_day(pool, &config.employee_id, anchor).await? {
        return Ok(Some(record));
    }

    let previous = find_by_day(pool, &config.employee_id, anchor - Duration::days(1)).await?;
    if continues_previous_day(config, at, previous.as_ref()) {
        Ok(previous)
    } else {
        Ok(None)
    }
}

/// The overnight date-anchor decision: does an action at `at` continue the
/// previous UTC date's record?
///
/// Only for overnight-shift employees, only in the early morning (the same
/// before-noon window the classifier uses), and only while that record is
/// still open. Day-shift employees never get the fallback, so yesterday's
/// forgotten check-out cannot block today's check-in.
fn continues_previous_day(
    config: &EmployeeConfig,
    at: DateTime<Utc>,
    previous: Option<&AttendanceRecord>,
) -> bool {
    if !config.is_overnight_shift() || at.time().hour() >= 12 {
        return false;
    }
    previous.is_some_and(|record| record.check_out.is_none())
}

async fn find_by_day(
    pool: &MySqlPool,
    employee_id: &str,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE employee_id = ? AND date = ?"
    ))
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Insert the check-in record. The `(employee_id, date)` unique key makes
/// creation atomic: the loser of a concurrent double-submit hits a
/// duplicate-key error, which is the same "Already checked in today"
/// rejection a sequential duplicate gets.
async fn insert_record(
    pool: &MySqlPool,
    record: AttendanceRecord,
) -> Result<AttendanceRecord, SubmitError> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance_records
            (id, employee_id, employee_name, date, check_in, status, break_overrun, version)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(&record.id)
    .bind(&record.employee_id)
    .bind(&record.employee_name)
    .bind(record.date)
    .bind(record.check_in)
    .bind(record.status)
    .bind(record.break_overrun)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(record),
        Err(e) => {
            if is_duplicate_key(&e) {
                return Err(SubmitError::Rejected(ActionError::AlreadyCheckedIn));
            }
            Err(SubmitError::Storage(e))
        }
    }
}

/// Versioned update. Zero rows affected means another request got there
/// first; the caller sees a conflict instead of silently losing the race.
async fn update_record(
    pool: &MySqlPool,
    mut record: AttendanceRecord,
) -> Result<AttendanceRecord, SubmitError> {
    let result = sqlx::query(
        r#"
        UPDATE attendance_records
        SET check_out = ?, break_in = ?, break_out = ?,
            break_duration_seconds = ?, break_overrun = ?, version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(record.check_out)
    .bind(record.break_in)
    .bind(record.break_out)
    .bind(record.break_duration_seconds)
    .bind(record.break_overrun)
    .bind(&record.id)
    .bind(record.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SubmitError::Conflict);
    }

    record.version += 1;
    Ok(record)
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}

#[derive(Debug, Default)]
pub struct RecordFilter {
    pub employee_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// Typed bind values for the dynamically assembled review query.
enum FilterValue {
    Str(String),
    Date(NaiveDate),
}

/// Administrative review: records matching the filter, newest first,
/// paginated. Returns the page plus the unpaginated total.
pub async fn list_records(
    pool: &MySqlPool,
    filter: &RecordFilter,
    page: u32,
    per_page: u32,
) -> Result<(Vec<AttendanceRecord>, i64), sqlx::Error> {
    let mut clauses = String::new();
    let mut values: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = &filter.employee_id {
        clauses.push_str(" AND employee_id = ?");
        values.push(FilterValue::Str(employee_id.clone()));
    }
    if let Some(from) = filter.from {
        clauses.push_str(" AND date >= ?");
        values.push(FilterValue::Date(from));
    }
    if let Some(to) = filter.to {
        clauses.push_str(" AND date <= ?");
        values.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance_records WHERE 1=1{clauses}");
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
    for value in &values {
        count_query = match value {
            FilterValue::Str(v) => count_query.bind(v.clone()),
            FilterValue::Date(v) => count_query.bind(*v),
        };
    }
    let (total,) = count_query.fetch_one(pool).await?;

    let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
    let list_sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE 1=1{clauses} \
         ORDER BY date DESC, employee_id LIMIT ? OFFSET ?"
    );
    let mut list_query = sqlx::query_as::<_, AttendanceRecord>(&list_sql);
    for value in values {
        list_query = match value {
            FilterValue::Str(v) => list_query.bind(v),
            FilterValue::Date(v) => list_query.bind(v),
        };
    }
    let data = list_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((data, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn config(start: &str, end: &str) -> EmployeeConfig {
        EmployeeConfig {
            employee_id: "E1".into(),
            employee_name: "Test Employee".into(),
            office_start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            office_end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            required_hours: 8,
            flexible_start: false,
            grace_period_minutes: 10,
            max_break_duration_minutes: 90,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn shift_record(cfg: &EmployeeConfig, check_in: &str) -> AttendanceRecord {
        sequencer::apply(
            None,
            AttendanceAction::Checkin,
            at(check_in),
            "Test Employee",
            cfg,
        )
        .unwrap()
        .record
    }

    #[test]
    fn post_midnight_action_continues_open_overnight_shift() {
        let cfg = config("17:00", "01:00");
        let record = shift_record(&cfg, "2026-01-05T17:05:00Z");

        assert!(continues_previous_day(
            &cfg,
            at("2026-01-06T00:30:00Z"),
            Some(&record)
        ));
    }

    #[test]
    fn checked_out_overnight_shift_is_not_continued() {
        let cfg = config("17:00", "01:00");
        let record = shift_record(&cfg, "2026-01-05T17:05:00Z");
        let record = sequencer::apply(
            Some(record),
            AttendanceAction::Checkout,
            at("2026-01-06T00:10:00Z"),
            "",
            &cfg,
        )
        .unwrap()
        .record;

        assert!(!continues_previous_day(
            &cfg,
            at("2026-01-06T00:30:00Z"),
            Some(&record)
        ));
    }

    #[test]
    fn evening_action_starts_a_new_overnight_record() {
        // The next shift's check-in at 17:10 must not land on yesterday's
        // still-open record.
        let cfg = config("17:00", "01:00");
        let record = shift_record(&cfg, "2026-01-05T17:05:00Z");

        assert!(!continues_previous_day(
            &cfg,
            at("2026-01-06T17:10:00Z"),
            Some(&record)
        ));
    }

    #[test]
    fn day_shift_never_falls_back_to_yesterday() {
        // A forgotten check-out yesterday must not block today's check-in.
        let cfg = config("09:00", "17:00");
        let record = shift_record(&cfg, "2026-01-05T09:00:00Z");

        assert!(!continues_previous_day(
            &cfg,
            at("2026-01-06T08:55:00Z"),
            Some(&record)
        ));
    }

    #[test]
    fn no_previous_record_means_no_fallback() {
        let cfg = config("17:00", "01:00");
        assert!(!continues_previous_day(
            &cfg,
            at("2026-01-06T00:30:00Z"),
            None
        ));
    }
}
