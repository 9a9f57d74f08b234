use chrono::{Datelike, Days, NaiveDate};
use std::ops::RangeInclusive;

/// Years a user may ask for; keeps grid arithmetic far from chrono's limits
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// One day of the rendered month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_focused_month: bool,
    pub is_today: bool,
}

/// Sunday-start grid of whole weeks covering one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    month_start: NaiveDate,
    weeks: Vec<[NaiveDate; 7]>,
}

/// Build the grid for the month containing `reference`
pub fn month_grid(reference: NaiveDate) -> MonthGrid {
    let month_start = first_of_month(reference);
    let month_end = last_of_month(reference);

    let grid_start = month_start - Days::new(u64::from(month_start.weekday().num_days_from_sunday()));
    let grid_end = month_end + Days::new(u64::from(6 - month_end.weekday().num_days_from_sunday()));

    let mut weeks = Vec::with_capacity(6);
    let mut day = grid_start;
    while day <= grid_end {
        let week: [NaiveDate; 7] = std::array::from_fn(|offset| day + Days::new(offset as u64));
        day = day + Days::new(7);
        weeks.push(week);
    }

    MonthGrid { month_start, weeks }
}

impl MonthGrid {
    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    pub fn weeks(&self) -> &[[NaiveDate; 7]] {
        &self.weeks
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().flat_map(|week| week.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.weeks.len() * 7
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.weeks.first().map(|week| week[0])
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.weeks.last().map(|week| week[6])
    }

    pub fn in_focused_month(&self, date: NaiveDate) -> bool {
        date.year() == self.month_start.year() && date.month() == self.month_start.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }

    /// Weeks of cells flagged against the focused month and `today`
    pub fn cells(&self, today: NaiveDate) -> Vec<[CalendarCell; 7]> {
        self.weeks
            .iter()
            .map(|week| {
                week.map(|date| CalendarCell {
                    date,
                    in_focused_month: self.in_focused_month(date),
                    is_today: date == today,
                })
            })
            .collect()
    }
}

/// Parse a user-entered `YYYY-MM-DD` within [`SUPPORTED_YEARS`]
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("expected a date like 2026-01-29, got '{}'", raw))?;
    check_supported(date)
}

pub fn check_supported(date: NaiveDate) -> Result<NaiveDate, String> {
    if SUPPORTED_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(format!(
            "year {} is outside {}..={}",
            date.year(),
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        ))
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let start = first_of_month(date);
    start + Days::new(u64::from(days_in_month(start.year(), start.month()) - 1))
}

pub fn previous_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) - Days::new(1))
}

pub fn next_month(date: NaiveDate) -> NaiveDate {
    last_of_month(date) + Days::new(1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn every_month_of_several_years_is_whole_weeks() {
        for year in [2023, 2024, 2025, 2026, 2100] {
            for month in 1..=12 {
                let reference = date(year, month, 15);
                let grid = month_grid(reference);

                assert_eq!(grid.len() % 7, 0);
                assert_eq!(grid.first_day().map(|d| d.weekday()), Some(Weekday::Sun));
                assert_eq!(grid.last_day().map(|d| d.weekday()), Some(Weekday::Sat));

                let mut day = first_of_month(reference);
                while day <= last_of_month(reference) {
                    assert!(grid.contains(day), "{day} missing from grid");
                    day = day + Days::new(1);
                }
            }
        }
    }

    #[test]
    fn same_month_yields_identical_grid() {
        assert_eq!(month_grid(date(2026, 2, 1)), month_grid(date(2026, 2, 28)));
    }

    #[test]
    fn january_2026_spans_into_adjacent_months() {
        // Jan 1 2026 is a Thursday, Jan 31 a Saturday.
        let grid = month_grid(date(2026, 1, 10));

        assert_eq!(grid.first_day(), Some(date(2025, 12, 28)));
        assert_eq!(grid.last_day(), Some(date(2026, 1, 31)));
        assert_eq!(grid.weeks().len(), 5);
    }

    #[test]
    fn month_ending_on_tuesday_gets_trailing_days() {
        // Sep 30 2025 is a Tuesday.
        let grid = month_grid(date(2025, 9, 1));

        assert_eq!(grid.last_day(), Some(date(2025, 10, 4)));
        assert!(!grid.in_focused_month(date(2025, 10, 4)));
    }

    #[test]
    fn february_2026_is_exactly_four_weeks() {
        let grid = month_grid(date(2026, 2, 14));
        assert_eq!(grid.first_day(), Some(date(2026, 2, 1)));
        assert_eq!(grid.weeks().len(), 4);
    }

    #[test]
    fn cells_flag_today_and_focus() {
        let today = date(2026, 1, 29);
        let cells = month_grid(date(2026, 1, 1)).cells(today);

        let flat: Vec<CalendarCell> = cells.iter().flatten().copied().collect();
        assert_eq!(flat.iter().filter(|c| c.is_today).count(), 1);
        assert!(!flat[0].in_focused_month);
        assert_eq!(flat.iter().filter(|c| c.in_focused_month).count(), 31);
    }

    #[test]
    fn navigation_crosses_year_boundaries() {
        assert_eq!(previous_month(date(2026, 1, 20)), date(2025, 12, 1));
        assert_eq!(next_month(date(2025, 12, 31)), date(2026, 1, 1));
        assert_eq!(last_of_month(date(2024, 2, 3)), date(2024, 2, 29));
    }

    #[test]
    fn entered_days_stay_within_supported_years() {
        assert_eq!(parse_day(" 2026-01-29 "), Ok(date(2026, 1, 29)));
        assert!(parse_day("+262142-12-15").is_err());
        assert!(parse_day("0000-06-01").is_err());
        assert!(parse_day("tomorrow").is_err());

        // The outermost supported months still build and navigate
        let last = parse_day("9999-12-15").expect("supported");
        assert_eq!(month_grid(last).last_day(), Some(date(10000, 1, 1)));
        assert_eq!(next_month(last), date(10000, 1, 1));
        let first = parse_day("0001-01-15").expect("supported");
        assert_eq!(previous_month(first), date(0, 12, 1));
        assert_eq!(month_grid(first).len() % 7, 0);
    }
}
