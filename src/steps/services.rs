use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use time::{util::days_in_year_month, Date, Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::common::{percent, round_to, start_of_week, to_f64};
use crate::error::AppError;
use crate::steps::dto::{CreateDailyStepsRequest, DailyStepsDetails, UpdateDailyStepsRequest};
use crate::steps::repo_types::{
    DailySteps, StepGoal, StepStreak, MAX_ACTIVE_MINUTES, MAX_DAILY_GOAL, MAX_DAILY_STEPS,
    MIN_DAILY_GOAL,
};

const MAX_PERIOD_DAYS: i64 = 365;

pub fn validate_daily_goal(daily_goal: i32) -> Result<(), AppError> {
    if daily_goal < MIN_DAILY_GOAL {
        return Err(AppError::validation(
            "daily_goal",
            "Daily goal must be at least 1,000 steps",
        ));
    }
    if daily_goal > MAX_DAILY_GOAL {
        return Err(AppError::validation(
            "daily_goal",
            "Daily goal cannot exceed 100,000 steps",
        ));
    }
    Ok(())
}

pub fn validate_daily_steps(r: &DailySteps, today: Date) -> Result<(), AppError> {
    if r.date > today {
        return Err(AppError::validation("date", "Cannot log steps for future dates"));
    }
    if r.steps < 0 {
        return Err(AppError::validation("steps", "Steps cannot be negative"));
    }
    if r.steps > MAX_DAILY_STEPS {
        return Err(AppError::validation("steps", "Steps seem unrealistic (max: 200,000)"));
    }
    if r.distance_km.is_some_and(|d| d < Decimal::ZERO) {
        return Err(AppError::validation(
            "distance_km",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if r.calories_burned.is_some_and(|c| c < 0) {
        return Err(AppError::validation(
            "calories_burned",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if r.active_minutes.is_some_and(|m| !(0..=MAX_ACTIVE_MINUTES).contains(&m)) {
        return Err(AppError::validation(
            "active_minutes",
            "Active minutes must be between 0 and 1440.",
        ));
    }
    Ok(())
}

pub fn draft_daily_steps(user_id: Uuid, req: CreateDailyStepsRequest, today: Date) -> DailySteps {
    let now = OffsetDateTime::now_utc();
    DailySteps {
        id: Uuid::nil(),
        user_id,
        date: req.date.unwrap_or(today),
        steps: req.steps,
        distance_km: req.distance_km,
        calories_burned: req.calories_burned,
        active_minutes: req.active_minutes,
        notes: req.notes,
        source: req.source,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_daily_steps_edit(r: &mut DailySteps, u: UpdateDailyStepsRequest) {
    if let Some(v) = u.date {
        r.date = v;
    }
    if let Some(v) = u.steps {
        r.steps = v;
    }
    if let Some(v) = u.source {
        r.source = v;
    }
    r.distance_km = u.distance_km.or(r.distance_km);
    r.calories_burned = u.calories_burned.or(r.calories_burned);
    r.active_minutes = u.active_minutes.or(r.active_minutes);
    r.notes = u.notes.or(r.notes.take());
}

/// Streak recomputation only cares about records for yesterday or today.
pub fn touches_streak(record_date: Date, today: Date) -> bool {
    record_date >= today - Duration::days(1)
}

/// Brings the user's streak up to date for `today`: one lookup of
/// yesterday's record, at most one write.
pub async fn update_streak(
    db: &PgPool,
    user_id: Uuid,
    today: Date,
) -> Result<StepStreak, AppError> {
    let mut streak = StepStreak::get_or_create(db, user_id, today).await?;
    let daily_goal = StepGoal::find_for_user(db, user_id)
        .await?
        .map(|g| g.daily_goal);

    let yesterday_steps = if daily_goal.is_some() && streak.last_updated != today {
        DailySteps::find_by_date(db, user_id, today - Duration::days(1))
            .await?
            .map(|r| r.steps)
    } else {
        None
    };

    if streak.advance(daily_goal, yesterday_steps, today) {
        streak = streak.save(db).await?;
        debug!(
            %user_id,
            current = streak.current_streak,
            longest = streak.longest_streak,
            "streak updated"
        );
    }
    Ok(streak)
}

/// `period` query value, defaulting when absent.
pub fn parse_period(raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if (1..=MAX_PERIOD_DAYS).contains(&days) => Ok(days),
        _ => Err(AppError::BadRequest("Invalid period parameter".into())),
    }
}

/// Inclusive window of `period` days ending today.
pub fn period_window(today: Date, period: i64) -> (Date, Date) {
    (today - Duration::days(period - 1), today)
}

pub fn week_bounds(today: Date) -> (Date, Date) {
    let start = start_of_week(today);
    (start, start + Duration::days(6))
}

pub fn month_bounds(today: Date) -> (Date, Date) {
    let start = today - Duration::days(i64::from(today.day()) - 1);
    let len = days_in_year_month(today.year(), today.month());
    (start, start + Duration::days(i64::from(len) - 1))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub total_steps: i64,
    pub total_distance_km: f64,
    pub total_calories: i64,
    pub total_active_minutes: i64,
    pub average_steps: i64,
    pub average_distance_km: f64,
    pub average_calories: i64,
    pub days_recorded: i64,
    pub days_goal_met: i64,
    pub goal_achievement_rate: f64,
    pub highest_steps: i32,
    pub highest_steps_date: Option<Date>,
    pub current_streak: i32,
    pub longest_streak: i32,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Averages skip records that lack the field. Streak values are read as
/// stored, not recomputed.
pub fn step_summary(
    records: &[DailySteps],
    goal: Option<&StepGoal>,
    streak: &StepStreak,
) -> StepSummary {
    let steps: Vec<i64> = records.iter().map(|r| i64::from(r.steps)).collect();
    let distances: Vec<f64> = records.iter().filter_map(|r| r.distance_km).map(to_f64).collect();
    let calories: Vec<i64> = records
        .iter()
        .filter_map(|r| r.calories_burned)
        .map(i64::from)
        .collect();

    let total_steps: i64 = steps.iter().sum();
    let total_distance: f64 = distances.iter().sum();
    let total_calories: i64 = calories.iter().sum();

    let days_recorded = records.len() as i64;
    let days_goal_met = goal.map_or(0, |g| {
        records.iter().filter(|r| r.steps >= g.daily_goal).count() as i64
    });

    let mut highest: Option<&DailySteps> = None;
    for r in records {
        if highest.map_or(true, |h| r.steps > h.steps) {
            highest = Some(r);
        }
    }

    StepSummary {
        total_steps,
        total_distance_km: round_to(total_distance, 2),
        total_calories,
        total_active_minutes: records
            .iter()
            .filter_map(|r| r.active_minutes)
            .map(i64::from)
            .sum(),
        average_steps: mean(total_steps as f64, steps.len()).round() as i64,
        average_distance_km: round_to(mean(total_distance, distances.len()), 2),
        average_calories: mean(total_calories as f64, calories.len()).round() as i64,
        days_recorded,
        days_goal_met,
        goal_achievement_rate: round_to(percent(days_goal_met as f64, days_recorded as f64), 1),
        highest_steps: highest.map_or(0, |h| h.steps),
        highest_steps_date: highest.map(|h| h.date),
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: Date,
    pub steps: i32,
    pub goal_achieved: bool,
    pub day_name: String,
}

/// Monday through Sunday of the week containing `today`; days without a
/// record show zero steps.
pub fn weekly(records: &[DailySteps], daily_goal: i32, today: Date) -> Vec<WeekDay> {
    let by_date: HashMap<Date, i32> = records.iter().map(|r| (r.date, r.steps)).collect();
    let (start, _) = week_bounds(today);
    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let steps = by_date.get(&date).copied();
            WeekDay {
                date,
                steps: steps.unwrap_or(0),
                goal_achieved: steps.is_some_and(|s| s >= daily_goal),
                day_name: date.weekday().to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MonthlySteps {
    pub month: String,
    pub start_date: Date,
    pub end_date: Date,
    pub total_steps: i64,
    pub days_recorded: i64,
    pub average_steps: i64,
    pub daily_data: Vec<DailyStepsDetails>,
}

/// `records` are the current month's, oldest first.
pub fn monthly(records: Vec<DailySteps>, daily_goal: Option<i32>, today: Date) -> MonthlySteps {
    let (start_date, end_date) = month_bounds(today);
    let total_steps: i64 = records.iter().map(|r| i64::from(r.steps)).sum();
    let days_recorded = records.len() as i64;
    MonthlySteps {
        month: format!("{} {}", today.month(), today.year()),
        start_date,
        end_date,
        total_steps,
        days_recorded,
        average_steps: mean(total_steps as f64, records.len()).round() as i64,
        daily_data: records
            .into_iter()
            .map(|r| DailyStepsDetails::new(r, daily_goal))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: Date,
    pub steps: i32,
    pub distance_km: f64,
    pub calories: i32,
    pub goal: i32,
    pub goal_achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub period_days: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub goal: i32,
    pub data: Vec<ChartPoint>,
}

pub fn chart_data(records: &[DailySteps], daily_goal: i32, today: Date, period: i64) -> ChartData {
    let by_date: HashMap<Date, &DailySteps> = records.iter().map(|r| (r.date, r)).collect();
    let (start_date, end_date) = period_window(today, period);
    let data = (0..period)
        .map(|offset| {
            let date = start_date + Duration::days(offset);
            let record = by_date.get(&date);
            ChartPoint {
                date,
                steps: record.map_or(0, |r| r.steps),
                distance_km: record.and_then(|r| r.distance_km).map_or(0.0, to_f64),
                calories: record.and_then(|r| r.calories_burned).unwrap_or(0),
                goal: daily_goal,
                goal_achieved: record.is_some_and(|r| r.steps >= daily_goal),
            }
        })
        .collect();
    ChartData {
        period_days: period,
        start_date,
        end_date,
        goal: daily_goal,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::repo_types::tests::{record, streak};
    use time::macros::date;

    const TODAY: Date = date!(2026 - 10 - 15);

    fn goal(daily_goal: i32) -> StepGoal {
        let now = OffsetDateTime::now_utc();
        StepGoal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            daily_goal,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn summary_over_nothing_is_zeroed() {
        let s = step_summary(&[], None, &streak(TODAY));
        assert_eq!(s.total_steps, 0);
        assert_eq!(s.days_recorded, 0);
        assert_eq!(s.average_steps, 0);
        assert_eq!(s.goal_achievement_rate, 0.0);
        assert_eq!(s.highest_steps, 0);
        assert_eq!(s.highest_steps_date, None);
    }

    #[test]
    fn summary_aggregates_and_skips_missing_fields() {
        let mut a = record(date!(2026 - 10 - 13), 12_000);
        a.distance_km = Some(Decimal::new(960, 2));
        a.calories_burned = Some(600);
        a.active_minutes = Some(70);
        let b = record(date!(2026 - 10 - 14), 6_001);
        let mut c = record(date!(2026 - 10 - 15), 15_000);
        c.distance_km = Some(Decimal::new(1200, 2));

        let mut st = streak(TODAY);
        st.current_streak = 2;
        st.longest_streak = 5;

        let s = step_summary(&[a, b, c], Some(&goal(10_000)), &st);
        assert_eq!(s.total_steps, 33_001);
        assert_eq!(s.average_steps, 11_000);
        assert_eq!(s.total_distance_km, 21.6);
        // b has no distance, so only two records are averaged
        assert_eq!(s.average_distance_km, 10.8);
        assert_eq!(s.total_calories, 600);
        assert_eq!(s.average_calories, 600);
        assert_eq!(s.total_active_minutes, 70);
        assert_eq!(s.days_recorded, 3);
        assert_eq!(s.days_goal_met, 2);
        assert_eq!(s.goal_achievement_rate, 66.7);
        assert_eq!(s.highest_steps, 15_000);
        assert_eq!(s.highest_steps_date, Some(date!(2026 - 10 - 15)));
        assert_eq!((s.current_streak, s.longest_streak), (2, 5));
    }

    #[test]
    fn no_goal_means_no_days_met() {
        let s = step_summary(&[record(TODAY, 50_000)], None, &streak(TODAY));
        assert_eq!(s.days_goal_met, 0);
        assert_eq!(s.goal_achievement_rate, 0.0);
    }

    #[test]
    fn weekly_has_seven_days_from_monday() {
        let records = [record(date!(2026 - 10 - 13), 11_000), record(TODAY, 3_000)];
        let week = weekly(&records, 10_000, TODAY);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date!(2026 - 10 - 12));
        assert_eq!(week[0].day_name, "Monday");
        assert_eq!(week[6].date, date!(2026 - 10 - 18));
        assert_eq!(week[6].day_name, "Sunday");
        assert_eq!(week[0].steps, 0);
        assert!(!week[0].goal_achieved);
        assert!(week[1].goal_achieved);
        assert_eq!(week[3].steps, 3_000);
        assert!(!week[3].goal_achieved);
    }

    #[test]
    fn monthly_covers_calendar_month() {
        let records = vec![
            record(date!(2026 - 10 - 01), 4_000),
            record(date!(2026 - 10 - 02), 5_001),
        ];
        let m = monthly(records, Some(5_000), TODAY);
        assert_eq!(m.month, "October 2026");
        assert_eq!(m.start_date, date!(2026 - 10 - 01));
        assert_eq!(m.end_date, date!(2026 - 10 - 31));
        assert_eq!(m.total_steps, 9_001);
        assert_eq!(m.average_steps, 4_501);
        assert!(m.daily_data[1].goal_achieved);
    }

    #[test]
    fn month_bounds_handle_february() {
        assert_eq!(
            month_bounds(date!(2028 - 02 - 10)),
            (date!(2028 - 02 - 01), date!(2028 - 02 - 29))
        );
        assert_eq!(
            month_bounds(date!(2026 - 12 - 31)),
            (date!(2026 - 12 - 01), date!(2026 - 12 - 31))
        );
    }

    #[test]
    fn chart_fills_every_day_in_period() {
        let mut r = record(date!(2026 - 10 - 14), 10_500);
        r.distance_km = Some(Decimal::new(840, 2));
        r.calories_burned = Some(525);
        let chart = chart_data(&[r], 10_000, TODAY, 7);
        assert_eq!(chart.period_days, 7);
        assert_eq!(chart.start_date, date!(2026 - 10 - 09));
        assert_eq!(chart.end_date, TODAY);
        assert_eq!(chart.data.len(), 7);
        let point = &chart.data[5];
        assert_eq!(point.date, date!(2026 - 10 - 14));
        assert_eq!(point.distance_km, 8.4);
        assert_eq!(point.calories, 525);
        assert!(point.goal_achieved);
        assert_eq!(chart.data[6].steps, 0);
    }

    #[test]
    fn period_parsing() {
        assert_eq!(parse_period(None, 30).unwrap(), 30);
        assert_eq!(parse_period(Some("14"), 30).unwrap(), 14);
        assert!(matches!(parse_period(Some("abc"), 30), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_period(Some("0"), 30), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn daily_steps_validation() {
        let mut r = record(date!(2026 - 10 - 16), 1_000);
        assert!(matches!(
            validate_daily_steps(&r, TODAY),
            Err(AppError::Validation { field: "date", .. })
        ));
        r.date = TODAY;
        r.steps = 200_001;
        assert!(matches!(
            validate_daily_steps(&r, TODAY),
            Err(AppError::Validation { field: "steps", .. })
        ));
        r.steps = 5_000;
        r.active_minutes = Some(1_441);
        assert!(matches!(
            validate_daily_steps(&r, TODAY),
            Err(AppError::Validation { field: "active_minutes", .. })
        ));
    }

    #[test]
    fn daily_goal_bounds() {
        assert!(validate_daily_goal(999).is_err());
        assert!(validate_daily_goal(1_000).is_ok());
        assert!(validate_daily_goal(100_000).is_ok());
        assert!(validate_daily_goal(100_001).is_err());
    }

    #[test]
    fn streak_only_for_recent_records() {
        assert!(touches_streak(TODAY, TODAY));
        assert!(touches_streak(date!(2026 - 10 - 14), TODAY));
        assert!(!touches_streak(date!(2026 - 10 - 13), TODAY));
    }
}
