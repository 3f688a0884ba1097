//! Named report windows (`today`, `lastweek`, ...) and their date ranges.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::filter::{Clause, DateMatcher, DateRange, FilterError, SearchTerm, local_midnight};

/// A calendar period relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

impl Window {
    pub const ALL: [Self; 8] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
        Self::ThisYear,
        Self::LastYear,
    ];

    /// The keyword accepted on the command line.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "thisweek",
            Self::LastWeek => "lastweek",
            Self::ThisMonth => "thismonth",
            Self::LastMonth => "lastmonth",
            Self::ThisYear => "thisyear",
            Self::LastYear => "lastyear",
        }
    }

    /// Human-readable name used in report titles.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this week",
            Self::LastWeek => "last week",
            Self::ThisMonth => "this month",
            Self::LastMonth => "last month",
            Self::ThisYear => "this year",
            Self::LastYear => "last year",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_lowercase();
        Self::ALL.into_iter().find(|w| w.keyword() == keyword)
    }

    /// First day of the window and the day after its last, as local dates.
    pub fn dates(self, today: NaiveDate, first_weekday: Weekday) -> (NaiveDate, NaiveDate) {
        let day = Duration::days(1);
        let week = Duration::days(7);
        match self {
            Self::Today => (today, today + day),
            Self::Yesterday => (today - day, today),
            Self::ThisWeek => {
                let start = week_start(today, first_weekday);
                (start, start + week)
            }
            Self::LastWeek => {
                let start = week_start(today, first_weekday);
                (start - week, start)
            }
            Self::ThisMonth => {
                let start = month_start(today);
                (start, start + Months::new(1))
            }
            Self::LastMonth => {
                let start = month_start(today);
                (start - Months::new(1), start)
            }
            Self::ThisYear => {
                let start = year_start(today);
                (start, start + Months::new(12))
            }
            Self::LastYear => {
                let start = year_start(today);
                (start - Months::new(12), start)
            }
        }
    }

    /// The window as a half-open range of instants.
    pub fn range(self, today: NaiveDate, first_weekday: Weekday) -> DateRange {
        let (start, end) = self.dates(today, first_weekday);
        DateRange {
            start: Some(local_midnight(start)),
            end: Some(local_midnight(end)),
        }
    }
}

fn week_start(today: NaiveDate, first_weekday: Weekday) -> NaiveDate {
    let offset = (today.weekday().num_days_from_monday() + 7
        - first_weekday.num_days_from_monday())
        % 7;
    today - Duration::days(i64::from(offset))
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.day0()))
}

fn year_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.ordinal0()))
}

/// The search term behind a report, plus the name shown in its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTerm {
    pub term: SearchTerm,
    pub view: String,
}

impl ReportTerm {
    /// Parses a report argument: a named window (optionally followed by
    /// `%exclusion`) or an ordinary search term.
    pub fn parse(
        input: &str,
        today: NaiveDate,
        first_weekday: Weekday,
    ) -> Result<Self, FilterError> {
        let (head, exclusion) = match input.split_once('%') {
            Some((head, rest)) => (head, Some(rest)),
            None => (input, None),
        };
        let Some(window) = Window::from_keyword(head) else {
            return Ok(Self {
                term: SearchTerm::parse(input)?,
                view: input.trim().to_string(),
            });
        };

        let exclude = match exclusion {
            Some(rest) => SearchTerm::parse(&format!("%{rest}"))?.exclude,
            None => Vec::new(),
        };
        Ok(Self {
            term: SearchTerm {
                include: vec![Clause::Completed(DateMatcher::Range(
                    window.range(today, first_weekday),
                ))],
                exclude,
            },
            view: window.title().to_string(),
        })
    }
}
