use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{AssessmentPlan, DailyFeedback, Event};

use super::feedback::round2;

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    /// Month in `YYYY-MM` form
    pub month: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FacultyMonthly {
    pub faculty_email: String,
    pub responses: usize,
    pub average_rating: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthlyReport {
    pub month: String,
    pub responses: usize,
    pub average_rating: f64,
    pub previous_month_average: f64,
    pub average_delta: f64,
    pub rating_distribution: [usize; 5],
    pub per_faculty: Vec<FacultyMonthly>,
    pub plans_total: usize,
    pub plans_completed: usize,
    pub plan_completion_pct: f64,
    pub events: usize,
}

/// GET /api/reports/monthly?month=YYYY-MM - dashboard aggregation over one
/// calendar month (faculty, admin). Joins the month's feedback, assessment
/// plans, and events, and compares the overall average against the previous
/// month.
pub async fn monthly_report(
    State(state): State<AppState>,
    Query(query): Query<MonthlyReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some((start, end)) = month_window(&query.month) else {
        return Err(ApiError::bad_request("month must be formatted as YYYY-MM"));
    };
    let (prev_start, prev_end) = previous_window(start);

    let (current, previous, plans, events) = futures::try_join!(
        async {
            state
                .store
                .from("daily_feedback")
                .gte("date", start)?
                .lte("date", end)?
                .fetch::<DailyFeedback>()
                .await
        },
        async {
            state
                .store
                .from("daily_feedback")
                .gte("date", prev_start)?
                .lte("date", prev_end)?
                .fetch::<DailyFeedback>()
                .await
        },
        async {
            state
                .store
                .from("assessment_plans")
                .gte("planned_date", start)?
                .lte("planned_date", end)?
                .fetch::<AssessmentPlan>()
                .await
        },
        async {
            state
                .store
                .from("events")
                .gte("event_date", start)?
                .lte("event_date", end)?
                .fetch::<Event>()
                .await
        },
    )?;

    let report = build_monthly_report(&query.month, &current, &previous, &plans, &events);
    Ok(Json(json!({ "success": true, "data": report })))
}

fn month_window(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    let (next_year, next_month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some((start, end))
}

fn previous_window(start: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (year, month) = if start.month() == 1 {
        (start.year() - 1, 12)
    } else {
        (start.year(), start.month() - 1)
    };
    // Construction cannot fail: month is 1..=12 and day 1 always exists
    let prev_start =
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(start);
    let prev_end = start.pred_opt().unwrap_or(start);
    (prev_start, prev_end)
}

fn average(rows: &[DailyFeedback]) -> f64 {
    let rated: Vec<i32> = rows
        .iter()
        .map(|r| r.rating)
        .filter(|r| (1..=5).contains(r))
        .collect();
    if rated.is_empty() {
        return 0.0;
    }
    round2(rated.iter().sum::<i32>() as f64 / rated.len() as f64)
}

fn build_monthly_report(
    month: &str,
    current: &[DailyFeedback],
    previous: &[DailyFeedback],
    plans: &[AssessmentPlan],
    events: &[Event],
) -> MonthlyReport {
    let mut distribution = [0usize; 5];
    let mut by_faculty: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
    for row in current {
        if (1..=5).contains(&row.rating) {
            distribution[(row.rating - 1) as usize] += 1;
            by_faculty
                .entry(row.faculty_email.as_str())
                .or_default()
                .push(row.rating);
        }
    }

    let responses: usize = distribution.iter().sum();
    let average_rating = average(current);
    let previous_month_average = average(previous);
    let average_delta = round2(average_rating - previous_month_average);

    let per_faculty = by_faculty
        .into_iter()
        .map(|(email, ratings)| FacultyMonthly {
            faculty_email: email.to_string(),
            responses: ratings.len(),
            average_rating: round2(
                ratings.iter().sum::<i32>() as f64 / ratings.len() as f64,
            ),
        })
        .collect();

    let plans_total = plans.len();
    let plans_completed = plans.iter().filter(|p| p.status == "completed").count();
    let plan_completion_pct = if plans_total == 0 {
        0.0
    } else {
        round2(plans_completed as f64 * 100.0 / plans_total as f64)
    };

    MonthlyReport {
        month: month.to_string(),
        responses,
        average_rating,
        previous_month_average,
        average_delta,
        rating_distribution: distribution,
        per_faculty,
        plans_total,
        plans_completed,
        plan_completion_pct,
        events: events.len(),
    }
}
