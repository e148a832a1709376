// src/common/calendar.rs

use std::fmt;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

/// Mês civil no formato canônico `YYYY-MM` (sempre em UTC).
/// Internamente guarda o primeiro dia do mês.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        // day0() vai de 0 a 30, então isto sempre cai no dia 1
        Self(date - Duration::days(i64::from(date.day0())))
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// Intervalo semiaberto `[início do mês, início do mês seguinte)`.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start(), self.next().start())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_as_year_dash_month() {
        assert_eq!(YearMonth::from_date(date(2024, 6, 17)).to_string(), "2024-06");
        assert_eq!(YearMonth::from_date(date(987, 1, 1)).to_string(), "0987-01");
    }

    #[test]
    fn bounds_cover_the_whole_month() {
        let (start, end) = YearMonth::from_date(date(2024, 2, 29)).bounds();
        assert_eq!(start.to_rfc3339(), "2024-02-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn december_rolls_into_next_year() {
        let december = YearMonth::from_date(date(2024, 12, 31));
        assert_eq!(december.next().to_string(), "2025-01");
    }

    #[test]
    fn any_day_maps_to_the_same_month() {
        assert_eq!(
            YearMonth::from_date(date(2024, 5, 1)),
            YearMonth::from_date(date(2024, 5, 31))
        );
    }
}
