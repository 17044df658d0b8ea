//! Date utilities: input parsing, month arithmetic, and localized labels.

use crate::types::ValidationError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Storage and input format for task dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date from user input.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// A calendar month. Construction normalizes out-of-range months by plain
/// arithmetic, so month 13 of 2024 is January 2025 and month 0 is December
/// of the previous year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    /// `month` is 1-based; any value is accepted and carried into the year.
    /// `None` when the carried year does not fit in an `i32`.
    pub fn new(year: i32, month: i32) -> Option<Self> {
        Self::from_index(year as i64 * 12 + (month as i64 - 1))
    }

    fn from_index(index: i64) -> Option<Self> {
        Some(Self {
            year: i32::try_from(index.div_euclid(12)).ok()?,
            month: index.rem_euclid(12) as u32 + 1,
        })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.trim().split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `delta` months away; `None` past the representable years.
    pub fn shift(&self, delta: i32) -> Option<Self> {
        Self::from_index(self.year as i64 * 12 + (self.month as i64 - 1) + delta as i64)
    }

    /// First day of the month; `None` only outside chrono's supported range.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Language for user-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Locale {
    pub fn today(&self) -> &'static str {
        match self {
            Locale::En => "Today",
            Locale::Ko => "오늘",
        }
    }

    pub fn tomorrow(&self) -> &'static str {
        match self {
            Locale::En => "Tomorrow",
            Locale::Ko => "내일",
        }
    }

    /// Short "month day" form, e.g. `Mar 2`.
    pub fn month_day(&self, date: NaiveDate) -> String {
        match self {
            Locale::En => format!("{} {}", &EN_MONTHS[date.month0() as usize][..3], date.day()),
            Locale::Ko => format!("{}월 {}일", date.month(), date.day()),
        }
    }

    /// Calendar header, e.g. `February 2024`.
    pub fn month_title(&self, month: MonthRef) -> String {
        match self {
            Locale::En => format!("{} {}", EN_MONTHS[month.month() as usize - 1], month.year()),
            Locale::Ko => format!("{}년 {}월", month.year(), month.month()),
        }
    }

    /// Label for tasks hidden from a calendar cell.
    pub fn more(&self, count: usize) -> String {
        match self {
            Locale::En => format!("+{} more", count),
            Locale::Ko => format!("외 {}개", count),
        }
    }

    pub fn status(&self, completed: bool) -> &'static str {
        match (self, completed) {
            (Locale::En, true) => "done",
            (Locale::En, false) => "pending",
            (Locale::Ko, true) => "완료",
            (Locale::Ko, false) => "미완료",
        }
    }

    /// Human date relative to `today`: today, tomorrow, or the short form.
    pub fn display_date(&self, date: NaiveDate, today: NaiveDate) -> String {
        if date == today {
            self.today().to_string()
        } else if today.checked_add_days(Days::new(1)) == Some(date) {
            self.tomorrow().to_string()
        } else {
            self.month_day(date)
        }
    }

    /// Weekday column headers, Sunday first.
    pub fn weekday_headers(&self) -> [&'static str; 7] {
        match self {
            Locale::En => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            Locale::Ko => ["일", "월", "화", "수", "목", "금", "토"],
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ko" => Ok(Locale::Ko),
            other => Err(format!("unknown locale '{}' (expected en or ko)", other)),
        }
    }
}
