//! Search-term parsing and evaluation.
//!
//! Terms are read by a small recursive-descent parser, one function per
//! grammar rule:
//!
//! ```text
//! searchterm := term ['%' term]
//! term       := clause (',' clause)*
//! clause     := [field '='] value
//! value      := literal ('+' literal)*
//! ```
//!
//! Clauses of the search term must all match; an entry matching any clause
//! of the exclusion term (after `%`) is dropped. A term without any `=` is a
//! single description search, commas included.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use thiserror::Error;

use crate::entry::TimeEntry;

/// Malformed search terms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid search term '{term}': empty clause")]
    EmptyClause { term: String },

    #[error("invalid search term '{term}': clause '{clause}' has no value")]
    EmptyValue { term: String, clause: String },

    #[error("invalid search term '{term}': clause '{clause}' has no field name")]
    EmptyField { term: String, clause: String },

    #[error("invalid search term '{term}': only one '%' exclusion separator is allowed")]
    MultipleExclusions { term: String },
}

/// An inclusive-start, exclusive-end span of instants. A missing bound is
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at < end)
    }
}

/// How a `started` or `completed` clause matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateMatcher {
    Range(DateRange),
    /// Substring of the local `YYYY-MM-DD HH:MM:SS` rendering.
    Text(String),
}

impl DateMatcher {
    fn parse(value: &str) -> Self {
        if let Some((from, to)) = value.split_once('~') {
            return Self::Range(DateRange {
                start: parse_bound(from).map(|bound| bound.first()),
                end: parse_bound(to).map(|bound| bound.after_last()),
            });
        }
        match parse_bound(value) {
            Some(bound) => Self::Range(DateRange {
                start: Some(bound.first()),
                end: Some(bound.after_last()),
            }),
            None => Self::Text(value.to_string()),
        }
    }

    fn matches(&self, at: Option<DateTime<Utc>>) -> bool {
        let Some(at) = at else {
            return false;
        };
        match self {
            Self::Range(range) => range.contains(at),
            Self::Text(text) => at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .contains(text.as_str()),
        }
    }
}

/// A parsed date or datetime along with the span it denotes.
#[derive(Debug, Clone, Copy)]
struct Bound {
    at: NaiveDateTime,
    span: Duration,
}

impl Bound {
    fn first(self) -> DateTime<Utc> {
        local_to_utc(self.at)
    }

    fn after_last(self) -> DateTime<Utc> {
        local_to_utc(self.at + self.span)
    }
}

const DATETIME_FORMATS: &[(&str, i64)] = &[
    ("%Y-%m-%d %H:%M:%S", 1),
    ("%Y-%m-%dt%H:%M:%S", 1),
    ("%Y-%m-%d %H:%M", 60),
    ("%Y-%m-%dt%H:%M", 60),
];

fn parse_bound(value: &str) -> Option<Bound> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Bound {
            at: date.and_time(NaiveTime::MIN),
            span: Duration::days(1),
        });
    }
    DATETIME_FORMATS.iter().find_map(|(format, seconds)| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|at| Bound {
                at,
                span: Duration::seconds(*seconds),
            })
    })
}

/// Converts a local wall-clock time to UTC, taking the earlier instant when
/// the time is ambiguous and skipping forward past a DST gap.
pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc)),
    }
}

/// Start of `date` in local time, as UTC.
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// One condition on an entry. Text values are already lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Matches every entry.
    Any,
    Uid(String),
    Alias(String),
    Description(String),
    Project(String),
    /// Any of the alternatives is one of the entry's tags.
    Tags(Vec<String>),
    /// The entry's status is one of the alternatives.
    Status(Vec<String>),
    Started(DateMatcher),
    Completed(DateMatcher),
    Notes(String),
}

impl Clause {
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        match self {
            Self::Any => true,
            Self::Uid(uid) => entry.uid.as_str().to_lowercase() == *uid,
            Self::Alias(alias) => entry.alias.as_str() == alias.as_str(),
            Self::Description(text) => contains(&entry.description, text),
            Self::Project(text) => entry
                .project
                .as_deref()
                .is_some_and(|project| contains(project, text)),
            Self::Tags(wanted) => entry
                .tags
                .iter()
                .any(|tag| wanted.contains(&tag.to_lowercase())),
            Self::Status(wanted) => wanted.iter().any(|s| s == entry.status.as_str()),
            Self::Started(matcher) => matcher.matches(entry.started),
            Self::Completed(matcher) => matcher.matches(entry.completed),
            Self::Notes(text) => entry
                .notes
                .as_deref()
                .is_some_and(|notes| contains(notes, text)),
        }
    }

    /// A clause without `field=`.
    fn bare(text: &str) -> Self {
        if text == "any" {
            Self::Any
        } else {
            Self::Description(text.to_string())
        }
    }

    /// Builds a clause from a field name and its value.
    ///
    /// Unknown field names search the description.
    fn from_parts(field: &str, value: &str) -> Option<Self> {
        let clause = match field {
            "uid" => Self::Uid(value.to_string()),
            "alias" => Self::Alias(value.to_string()),
            "project" => Self::Project(value.to_string()),
            "tags" => Self::Tags(alternatives(value)?),
            "status" => Self::Status(alternatives(value)?),
            "started" => Self::Started(DateMatcher::parse(value)),
            "completed" => Self::Completed(DateMatcher::parse(value)),
            "notes" => Self::Notes(value.to_string()),
            _ => Self::Description(value.to_string()),
        };
        Some(clause)
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn alternatives(value: &str) -> Option<Vec<String>> {
    let options: Vec<String> = value
        .split('+')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect();
    (!options.is_empty()).then_some(options)
}

/// A parsed search term: clauses to include and clauses to exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    pub include: Vec<Clause>,
    pub exclude: Vec<Clause>,
}

impl SearchTerm {
    /// Parses `term`. The empty term matches everything.
    pub fn parse(term: &str) -> Result<Self, FilterError> {
        let lowered = term.to_lowercase();
        if lowered.matches('%').count() > 1 {
            return Err(FilterError::MultipleExclusions {
                term: term.to_string(),
            });
        }
        Parser {
            term,
            input: &lowered,
            pos: 0,
        }
        .search_term()
    }

    /// Whether `entry` satisfies every search clause and no exclusion clause.
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.include.iter().all(|clause| clause.matches(entry))
            && !self.exclude.iter().any(|clause| clause.matches(entry))
    }

    /// The matching subset of `entries`, in iteration order.
    pub fn select<'a, I>(&self, entries: I) -> Vec<&'a TimeEntry>
    where
        I: IntoIterator<Item = &'a TimeEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .collect()
    }
}

/// Cursor over the lowercased term; `term` is the original, for errors.
struct Parser<'a> {
    term: &'a str,
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_until(&mut self, stops: &[char]) -> &'a str {
        let rest = self.rest();
        let end = rest.find(stops).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn empty_clause(&self) -> FilterError {
        FilterError::EmptyClause {
            term: self.term.to_string(),
        }
    }

    /// `searchterm := term ['%' term]`; a blank term before `%` selects all.
    fn search_term(&mut self) -> Result<SearchTerm, FilterError> {
        let include = if self.rest().trim_start().starts_with('%') {
            self.take_until(&['%']);
            Vec::new()
        } else {
            self.term_clauses()?
        };
        let exclude = if self.eat('%') {
            self.term_clauses()?
        } else {
            Vec::new()
        };
        Ok(SearchTerm { include, exclude })
    }

    /// `term := clause (',' clause)*`, or free text when no `=` appears.
    fn term_clauses(&mut self) -> Result<Vec<Clause>, FilterError> {
        let side = self.rest().split('%').next().unwrap_or_default();
        let text = side.trim();
        if text.is_empty() || !text.contains('=') {
            self.pos += side.len();
            return match text {
                "" if self.term.trim().is_empty() => Ok(Vec::new()),
                "" => Err(self.empty_clause()),
                text => Ok(vec![Clause::bare(text)]),
            };
        }

        let mut clauses = vec![self.clause()?];
        while self.eat(',') {
            clauses.push(self.clause()?);
        }
        Ok(clauses)
    }

    /// `clause := [field '='] value`
    fn clause(&mut self) -> Result<Clause, FilterError> {
        let start = self.pos;
        let field = self.take_until(&['=', ',', '%']).trim();
        if !self.eat('=') {
            if field.is_empty() {
                return Err(self.empty_clause());
            }
            return Ok(Clause::bare(field));
        }
        let value = self.take_until(&[',', '%']).trim();
        let clause = self.input[start..self.pos].trim();

        if field.is_empty() {
            return Err(FilterError::EmptyField {
                term: self.term.to_string(),
                clause: clause.to_string(),
            });
        }
        let empty_value = || FilterError::EmptyValue {
            term: self.term.to_string(),
            clause: clause.to_string(),
        };
        if value.is_empty() {
            return Err(empty_value());
        }
        Clause::from_parts(field, value).ok_or_else(empty_value)
    }
}
