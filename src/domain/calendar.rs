use chrono::{Datelike, NaiveDate};

/// First and last day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    // ---
    let first = day.with_day(1).unwrap_or(day);
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);

    (first, last)
}

/// Resolves the inclusive date window of a history request.
///
/// No bounds at all means the month containing `today`. A single bound leaves
/// the other side open.
pub fn resolve_window(
    today: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    // ---
    match (start, end) {
        (None, None) => {
            let (first, last) = month_bounds(today);
            (Some(first), Some(last))
        }
        bounds => bounds,
    }
}
