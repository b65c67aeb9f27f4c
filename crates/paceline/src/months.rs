use chrono::{Datelike, NaiveDate};
use std::fmt;

/// One calendar month of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthId {
    pub year: i32,
    /// 1 through 12.
    pub month: u32,
}

impl MonthId {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Name of this month's history document, month zero-padded.
    pub fn history_file(self) -> String {
        format!("history-{:04}-{:02}.json", self.year, self.month)
    }

    /// Parse a `YYYY-MM` flag value.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if (1..=12).contains(&month) {
            Some(Self::new(year, month))
        } else {
            None
        }
    }
}

impl fmt::Display for MonthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The months covering `[start, end]`, ascending, each month once. Both
/// endpoints' months are included; an inverted range covers nothing.
pub fn months_covering(start: NaiveDate, end: NaiveDate) -> Vec<MonthId> {
    let mut months = Vec::new();
    if end < start {
        return months;
    }
    let mut m = MonthId::of(start);
    let last = MonthId::of(end);
    while m <= last {
        months.push(m);
        m = m.next();
    }
    months
}
