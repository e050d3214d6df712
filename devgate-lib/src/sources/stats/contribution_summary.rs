use super::{ContributionSummary, MonthlyContribution};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Number of calendar months covered by a contribution summary.
pub const CONTRIBUTION_MONTHS: usize = 12;

/// Month-index distance from the oldest to the newest month of the window.
const WINDOW_SPAN: i64 = 11;

/// Months since year 0, so that consecutive months differ by one.
fn month_index(year: i32, month0: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month0)
}

fn index_to_year_month(index: i64) -> (i64, i64) {
    (index.div_euclid(12), index.rem_euclid(12) + 1)
}

/// Midnight UTC on the first day of the oldest month in the window ending at `now`.
pub(crate) fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = index_to_year_month(month_index(now.year(), now.month0()) - WINDOW_SPAN);

    i32::try_from(year)
        .ok()
        .zip(u32::try_from(month).ok())
        .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(now, |naive| naive.and_utc())
}

/// Bucket commit dates into the calendar months of the window ending at `now`.
///
/// Dates outside the window are ignored.
pub fn summarize_contributions(
    dates: impl IntoIterator<Item = DateTime<Utc>>,
    sampled_repositories: usize,
    now: DateTime<Utc>,
) -> ContributionSummary {
    let last = month_index(now.year(), now.month0());
    let first = last - WINDOW_SPAN;

    let mut counts = [0u64; CONTRIBUTION_MONTHS];
    for date in dates {
        let index = month_index(date.year(), date.month0());
        if !(first..=last).contains(&index) {
            continue;
        }
        if let Some(slot) = usize::try_from(index - first).ok().and_then(|offset| counts.get_mut(offset)) {
            *slot += 1;
        }
    }

    let months = (first..=last)
        .zip(counts)
        .map(|(index, count)| {
            let (year, month) = index_to_year_month(index);
            MonthlyContribution {
                month: format!("{year:04}-{month:02}"),
                count,
            }
        })
        .collect();

    ContributionSummary {
        months,
        total: counts.iter().sum(),
        sampled_repositories,
    }
}
