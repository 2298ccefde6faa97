use chrono::{DateTime, Duration, Timelike, Utc};

use crate::model::attendance::AttendanceStatus;
use crate::model::employee_config::EmployeeConfig;

/// Classify a check-in against the employee's office start time.
///
/// Pure and deterministic: the only instants involved are the check-in itself
/// and the office start derived from it. Flexible-start employees are always
/// on time.
pub fn classify(check_in: DateTime<Utc>, config: &EmployeeConfig) -> AttendanceStatus {
    if config.flexible_start {
        return AttendanceStatus::OnTime;
    }

    let mut office_instant = check_in
        .date_naive()
        .and_time(config.office_start_time)
        .and_utc();

    // Overnight shifts (e.g. 17:00–01:00): a check-in logged after midnight
    // belongs to the previous day's shift, so the anchor moves back one day.
    if config.is_overnight_shift() && check_in.time().hour() < 12 {
        office_instant -= Duration::days(1);
    }

    let grace_end = office_instant + Duration::minutes(i64::from(config.grace_period_minutes));

    if check_in <= office_instant {
        AttendanceStatus::OnTime
    } else if check_in <= grace_end {
        AttendanceStatus::Grace
    } else {
        AttendanceStatus::Late
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn fixed_config(start: &str, end: &str, grace: u32) -> EmployeeConfig {
        EmployeeConfig {
            employee_id: "EMP-1".into(),
            employee_name: "Test Employee".into(),
            office_start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            office_end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            required_hours: 8,
            flexible_start: false,
            grace_period_minutes: grace,
            max_break_duration_minutes: 90,
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn nine_oclock_shift_with_ten_minute_grace() {
        let config = fixed_config("09:00", "17:00", 10);

        assert_eq!(
            classify(at("2026-01-05T08:59:00Z"), &config),
            AttendanceStatus::OnTime
        );
        assert_eq!(
            classify(at("2026-01-05T09:00:00Z"), &config),
            AttendanceStatus::OnTime
        );
        assert_eq!(
            classify(at("2026-01-05T09:07:00Z"), &config),
            AttendanceStatus::Grace
        );
        assert_eq!(
            classify(at("2026-01-05T09:10:00Z"), &config),
            AttendanceStatus::Grace
        );
        assert_eq!(
            classify(at("2026-01-05T09:11:00Z"), &config),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn flexible_start_is_always_on_time() {
        let mut config = fixed_config("09:00", "17:00", 10);
        config.flexible_start = true;

        for ts in [
            "2026-01-05T04:00:00Z",
            "2026-01-05T09:10:00Z",
            "2026-01-05T15:30:00Z",
            "2026-01-05T23:59:59Z",
        ] {
            assert_eq!(classify(at(ts), &config), AttendanceStatus::OnTime);
        }
    }

    #[test]
    fn overnight_shift_anchors_post_midnight_check_in_to_previous_day() {
        // 17:00–01:00 shift; 00:20 belongs to yesterday's 17:00 anchor.
        let config = fixed_config("17:00", "01:00", 10);

        assert_eq!(
            classify(at("2026-01-06T00:20:00Z"), &config),
            AttendanceStatus::Late
        );
        // Before the anchor on the evening itself.
        assert_eq!(
            classify(at("2026-01-05T16:45:00Z"), &config),
            AttendanceStatus::OnTime
        );
        // Within grace on the evening itself.
        assert_eq!(
            classify(at("2026-01-05T17:08:00Z"), &config),
            AttendanceStatus::Grace
        );
    }

    #[test]
    fn overnight_anchor_does_not_fire_for_afternoon_check_in() {
        let config = fixed_config("17:00", "01:00", 10);
        // 13:00 is past noon, so the anchor stays on the same day.
        assert_eq!(
            classify(at("2026-01-05T13:00:00Z"), &config),
            AttendanceStatus::OnTime
        );
    }

    #[test]
    fn classification_is_monotonic_in_check_in_time() {
        let config = fixed_config("09:00", "17:00", 10);
        let rank = |s: AttendanceStatus| match s {
            AttendanceStatus::OnTime => 0,
            AttendanceStatus::Grace => 1,
            AttendanceStatus::Late => 2,
        };

        let base = at("2026-01-05T08:30:00Z");
        let mut previous = 0;
        for minute in 0..120 {
            let status = classify(base + Duration::minutes(minute), &config);
            assert!(rank(status) >= previous, "classification went backwards");
            previous = rank(status);
        }
    }
}
