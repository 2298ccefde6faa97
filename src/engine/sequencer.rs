use chrono::{DateTime, Utc};
use derive_more::Display;
use uuid::Uuid;

use crate::engine::classifier;
use crate::model::attendance::{AttendanceAction, AttendanceRecord, DayState};
use crate::model::employee_config::EmployeeConfig;

/// A guard violation. These surface verbatim to the caller as 400s and are
/// never retried server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ActionError {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "Please check in first")]
    NotCheckedIn,
    #[display(fmt = "Already checked out today")]
    AlreadyCheckedOut,
    #[display(fmt = "Please complete break first")]
    BreakStillOpen,
    #[display(fmt = "Break already started")]
    BreakAlreadyStarted,
    #[display(fmt = "Only one break allowed per day")]
    OneBreakPerDay,
    #[display(fmt = "Break not started")]
    BreakNotStarted,
    #[display(fmt = "Break already completed")]
    BreakAlreadyCompleted,
    #[display(fmt = "Break start time is before check-in")]
    BreakInBeforeCheckIn,
    #[display(fmt = "Break end time is before break start")]
    BreakOutBeforeBreakIn,
    #[display(fmt = "Check-out time is before check-in")]
    CheckOutBeforeCheckIn,
}

/// An accepted action: the record snapshot to persist, and whether it is a
/// fresh insert (check-in) or a versioned update of an existing row.
#[derive(Debug, Clone)]
pub struct Transition {
    pub record: AttendanceRecord,
    pub created: bool,
}

/// Run one action through the per-day state machine.
///
/// Guards are evaluated against the persisted record only; client-held state
/// is never trusted. Rejections leave the record untouched.
pub fn apply(
    existing: Option<AttendanceRecord>,
    action: AttendanceAction,
    at: DateTime<Utc>,
    employee_name: &str,
    config: &EmployeeConfig,
) -> Result<Transition, ActionError> {
    let Some(mut record) = existing else {
        return match action {
            AttendanceAction::Checkin => Ok(Transition {
                record: AttendanceRecord {
                    id: Uuid::new_v4().to_string(),
                    employee_id: config.employee_id.clone(),
                    employee_name: employee_name.to_string(),
                    date: at.date_naive(),
                    check_in: Some(at),
                    check_out: None,
                    break_in: None,
                    break_out: None,
                    status: classifier::classify(at, config),
                    break_duration_seconds: None,
                    break_overrun: false,
                    version: 0,
                },
                created: true,
            }),
            AttendanceAction::Breakin | AttendanceAction::Checkout => {
                Err(ActionError::NotCheckedIn)
            }
            AttendanceAction::Breakout => Err(ActionError::BreakNotStarted),
        };
    };

    match (record.state(), action) {
        (_, AttendanceAction::Checkin) => Err(ActionError::AlreadyCheckedIn),

        (DayState::CheckedOut, _) => Err(ActionError::AlreadyCheckedOut),

        (DayState::CheckedIn, AttendanceAction::Breakin) => {
            if record.check_in.is_some_and(|check_in| at < check_in) {
                return Err(ActionError::BreakInBeforeCheckIn);
            }
            record.break_in = Some(at);
            Ok(Transition {
                record,
                created: false,
            })
        }
        (DayState::OnBreak, AttendanceAction::Breakin) => Err(ActionError::BreakAlreadyStarted),
        (DayState::BreakDone, AttendanceAction::Breakin) => Err(ActionError::OneBreakPerDay),

        (DayState::OnBreak, AttendanceAction::Breakout) => {
            let Some(break_in) = record.break_in else {
                return Err(ActionError::BreakNotStarted);
            };
            if at < break_in {
                return Err(ActionError::BreakOutBeforeBreakIn);
            }
            let duration = (at - break_in).num_seconds();
            record.break_out = Some(at);
            record.break_duration_seconds = Some(duration);
            record.break_overrun =
                duration > i64::from(config.max_break_duration_minutes) * 60;
            Ok(Transition {
                record,
                created: false,
            })
        }
        (DayState::CheckedIn, AttendanceAction::Breakout) => Err(ActionError::BreakNotStarted),
        (DayState::BreakDone, AttendanceAction::Breakout) => Err(ActionError::BreakAlreadyCompleted),

        (DayState::CheckedIn | DayState::BreakDone, AttendanceAction::Checkout) => {
            if record.check_in.is_some_and(|check_in| at < check_in) {
                return Err(ActionError::CheckOutBeforeCheckIn);
            }
            record.check_out = Some(at);
            Ok(Transition {
                record,
                created: false,
            })
        }
        (DayState::OnBreak, AttendanceAction::Checkout) => Err(ActionError::BreakStillOpen),

        (DayState::Empty, _) => Err(ActionError::NotCheckedIn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use chrono::NaiveTime;

    fn config() -> EmployeeConfig {
        EmployeeConfig {
            employee_id: "E1".into(),
            employee_name: "Test Employee".into(),
            office_start_time: NaiveTime::parse_from_str("09:00", "%H:%M").unwrap(),
            office_end_time: NaiveTime::parse_from_str("17:00", "%H:%M").unwrap(),
            required_hours: 8,
            flexible_start: false,
            grace_period_minutes: 10,
            max_break_duration_minutes: 30,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn checked_in() -> AttendanceRecord {
        apply(
            None,
            AttendanceAction::Checkin,
            at("2026-01-05T09:00:00Z"),
            "Test Employee",
            &config(),
        )
        .unwrap()
        .record
    }

    #[test]
    fn check_in_creates_record_with_status_and_date() {
        let t = apply(
            None,
            AttendanceAction::Checkin,
            at("2026-01-05T09:07:00Z"),
            "Test Employee",
            &config(),
        )
        .unwrap();

        assert!(t.created);
        assert_eq!(t.record.status, AttendanceStatus::Grace);
        assert_eq!(t.record.date, at("2026-01-05T09:07:00Z").date_naive());
        assert_eq!(t.record.check_in, Some(at("2026-01-05T09:07:00Z")));
        assert_eq!(t.record.state(), DayState::CheckedIn);
        assert_eq!(t.record.version, 0);
    }

    #[test]
    fn full_day_with_break_reaches_checked_out() {
        let cfg = config();
        let r = checked_in();

        let r = apply(Some(r), AttendanceAction::Breakin, at("2026-01-05T13:00:00Z"), "", &cfg)
            .unwrap()
            .record;
        assert_eq!(r.state(), DayState::OnBreak);

        // Checkout mid-break is rejected.
        let err = apply(
            Some(r.clone()),
            AttendanceAction::Checkout,
            at("2026-01-05T13:30:00Z"),
            "",
            &cfg,
        )
        .unwrap_err();
        assert_eq!(err, ActionError::BreakStillOpen);
        assert_eq!(err.to_string(), "Please complete break first");

        let r = apply(Some(r), AttendanceAction::Breakout, at("2026-01-05T14:00:00Z"), "", &cfg)
            .unwrap()
            .record;
        assert_eq!(r.state(), DayState::BreakDone);
        assert_eq!(r.break_duration_seconds, Some(3600));

        let r = apply(Some(r), AttendanceAction::Checkout, at("2026-01-05T17:00:00Z"), "", &cfg)
            .unwrap()
            .record;
        assert_eq!(r.state(), DayState::CheckedOut);
    }

    #[test]
    fn day_without_break_reaches_checked_out() {
        let r = checked_in();
        let r = apply(
            Some(r),
            AttendanceAction::Checkout,
            at("2026-01-05T17:00:00Z"),
            "",
            &config(),
        )
        .unwrap()
        .record;
        assert_eq!(r.state(), DayState::CheckedOut);
        assert_eq!(r.break_duration_seconds, None);
    }

    #[test]
    fn duplicate_check_in_is_rejected_every_time() {
        let r = checked_in();
        for _ in 0..3 {
            let err = apply(
                Some(r.clone()),
                AttendanceAction::Checkin,
                at("2026-01-05T10:00:00Z"),
                "Test Employee",
                &config(),
            )
            .unwrap_err();
            assert_eq!(err, ActionError::AlreadyCheckedIn);
            assert_eq!(err.to_string(), "Already checked in today");
        }
    }

    #[test]
    fn actions_before_check_in_are_rejected() {
        let cfg = config();
        let t = at("2026-01-05T09:00:00Z");

        assert_eq!(
            apply(None, AttendanceAction::Breakin, t, "", &cfg).unwrap_err(),
            ActionError::NotCheckedIn
        );
        assert_eq!(
            apply(None, AttendanceAction::Checkout, t, "", &cfg).unwrap_err(),
            ActionError::NotCheckedIn
        );
        assert_eq!(
            apply(None, AttendanceAction::Breakout, t, "", &cfg).unwrap_err(),
            ActionError::BreakNotStarted
        );
    }

    #[test]
    fn only_one_break_cycle_per_day() {
        let cfg = config();
        let r = checked_in();
        let r = apply(Some(r), AttendanceAction::Breakin, at("2026-01-05T12:00:00Z"), "", &cfg)
            .unwrap()
            .record;

        assert_eq!(
            apply(
                Some(r.clone()),
                AttendanceAction::Breakin,
                at("2026-01-05T12:05:00Z"),
                "",
                &cfg
            )
            .unwrap_err(),
            ActionError::BreakAlreadyStarted
        );

        let r = apply(Some(r), AttendanceAction::Breakout, at("2026-01-05T12:30:00Z"), "", &cfg)
            .unwrap()
            .record;

        assert_eq!(
            apply(
                Some(r.clone()),
                AttendanceAction::Breakin,
                at("2026-01-05T15:00:00Z"),
                "",
                &cfg
            )
            .unwrap_err(),
            ActionError::OneBreakPerDay
        );
        assert_eq!(
            apply(Some(r), AttendanceAction::Breakout, at("2026-01-05T15:00:00Z"), "", &cfg)
                .unwrap_err(),
            ActionError::BreakAlreadyCompleted
        );
    }

    #[test]
    fn checked_out_day_rejects_everything() {
        let cfg = config();
        let r = apply(
            Some(checked_in()),
            AttendanceAction::Checkout,
            at("2026-01-05T17:00:00Z"),
            "",
            &cfg,
        )
        .unwrap()
        .record;

        assert_eq!(
            apply(
                Some(r.clone()),
                AttendanceAction::Checkin,
                at("2026-01-05T18:00:00Z"),
                "",
                &cfg
            )
            .unwrap_err(),
            ActionError::AlreadyCheckedIn
        );
        for action in [
            AttendanceAction::Breakin,
            AttendanceAction::Breakout,
            AttendanceAction::Checkout,
        ] {
            assert_eq!(
                apply(Some(r.clone()), action, at("2026-01-05T18:00:00Z"), "", &cfg).unwrap_err(),
                ActionError::AlreadyCheckedOut
            );
        }
    }

    #[test]
    fn break_in_before_check_in_is_rejected() {
        // A replayed break-in whose captured timestamp precedes the check-in
        // must not produce break_in < check_in on the record.
        let r = checked_in(); // 09:00
        let err = apply(
            Some(r.clone()),
            AttendanceAction::Breakin,
            at("2026-01-05T08:30:00Z"),
            "",
            &config(),
        )
        .unwrap_err();

        assert_eq!(err, ActionError::BreakInBeforeCheckIn);
        assert_eq!(r.break_in, None);
    }

    #[test]
    fn break_out_before_break_in_is_rejected() {
        let cfg = config();
        let r = apply(
            Some(checked_in()),
            AttendanceAction::Breakin,
            at("2026-01-05T13:00:00Z"),
            "",
            &cfg,
        )
        .unwrap()
        .record;

        assert_eq!(
            apply(
                Some(r),
                AttendanceAction::Breakout,
                at("2026-01-05T12:59:00Z"),
                "",
                &cfg
            )
            .unwrap_err(),
            ActionError::BreakOutBeforeBreakIn
        );
    }

    #[test]
    fn check_out_before_check_in_is_rejected() {
        assert_eq!(
            apply(
                Some(checked_in()),
                AttendanceAction::Checkout,
                at("2026-01-05T08:00:00Z"),
                "",
                &config()
            )
            .unwrap_err(),
            ActionError::CheckOutBeforeCheckIn
        );
    }

    #[test]
    fn long_break_is_flagged_but_does_not_block_checkout() {
        let cfg = config(); // 30 minute allowance
        let r = apply(
            Some(checked_in()),
            AttendanceAction::Breakin,
            at("2026-01-05T12:00:00Z"),
            "",
            &cfg,
        )
        .unwrap()
        .record;
        let r = apply(Some(r), AttendanceAction::Breakout, at("2026-01-05T13:15:00Z"), "", &cfg)
            .unwrap()
            .record;

        assert!(r.break_overrun);
        assert_eq!(r.break_duration_seconds, Some(75 * 60));

        let r = apply(Some(r), AttendanceAction::Checkout, at("2026-01-05T17:00:00Z"), "", &cfg)
            .unwrap()
            .record;
        assert_eq!(r.state(), DayState::CheckedOut);
    }

    #[test]
    fn rejection_leaves_record_unchanged() {
        let cfg = config();
        let r = checked_in();
        let before = r.clone();

        let _ = apply(
            Some(r.clone()),
            AttendanceAction::Checkin,
            at("2026-01-05T10:00:00Z"),
            "",
            &cfg,
        );
        assert_eq!(r.check_in, before.check_in);
        assert_eq!(r.status, before.status);
        assert_eq!(r.version, before.version);
    }
}
