//! Internship postings.
//!
//! Duration and remote flag are derived from the stored dates and location
//! on every read, so they cannot drift from the fields they describe.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use regex::Regex;

use crate::domain::{DomainError, DomainResult, InternshipId, UserId};

static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(remote|online|work from home|wfh)\b").expect("static remote pattern")
});

/// Review state shared by postings: `Pending -> Approved | Rejected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Approved { at: DateTime<Utc> },
    Rejected { reason: String, at: DateTime<Utc> },
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.pad("pending"),
            Self::Approved { .. } => f.pad("approved"),
            Self::Rejected { .. } => f.pad("rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    Unpaid,
    Paid { monthly_salary: f64 },
}

impl Compensation {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid { .. })
    }
}

/// How the end of a posting is given on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Until(NaiveDate),
    Months(u32),
}

/// Posting form, used for both creation and edits.
#[derive(Debug, Clone)]
pub struct InternshipDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub period: Period,
    pub compensation: Compensation,
    pub skills: Vec<String>,
}

impl InternshipDraft {
    /// Validate the form and resolve the end date.
    pub fn resolve_end_date(&self) -> DomainResult<NaiveDate> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description", "must not be empty"));
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::validation("location", "must not be empty"));
        }
        if let Compensation::Paid { monthly_salary } = self.compensation {
            if !(monthly_salary.is_finite() && monthly_salary > 0.0) {
                return Err(DomainError::validation(
                    "salary",
                    "paid internships need a positive salary",
                ));
            }
        }
        let end = match self.period {
            Period::Until(end) => end,
            Period::Months(0) => {
                return Err(DomainError::validation("duration", "must be at least one month"))
            }
            Period::Months(n) => self
                .start_date
                .checked_add_months(Months::new(n))
                .ok_or_else(|| DomainError::validation("duration", "end date out of range"))?,
        };
        if end <= self.start_date {
            return Err(DomainError::validation(
                "end_date",
                "must be after the start date",
            ));
        }
        Ok(end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Internship {
    pub id: InternshipId,
    pub company: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub compensation: Compensation,
    pub skills: BTreeSet<String>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl Internship {
    pub fn from_draft(
        id: InternshipId,
        company: UserId,
        draft: InternshipDraft,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let end_date = draft.resolve_end_date()?;
        Ok(Self {
            id,
            company,
            title: draft.title.trim().to_string(),
            description: draft.description,
            location: draft.location.trim().to_string(),
            start_date: draft.start_date,
            end_date,
            compensation: draft.compensation,
            skills: normalize_tags(draft.skills),
            status: ReviewStatus::Pending,
            created_at,
        })
    }

    /// Replace the editable fields. Review state is left as it was.
    pub fn apply_edit(&mut self, draft: InternshipDraft) -> DomainResult<()> {
        let end_date = draft.resolve_end_date()?;
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.location = draft.location.trim().to_string();
        self.start_date = draft.start_date;
        self.end_date = end_date;
        self.compensation = draft.compensation;
        self.skills = normalize_tags(draft.skills);
        Ok(())
    }

    pub fn is_approved(&self) -> bool {
        matches!(self.status, ReviewStatus::Approved { .. })
    }

    pub fn duration_months(&self) -> u32 {
        months_between(self.start_date, self.end_date)
    }

    pub fn is_remote(&self) -> bool {
        REMOTE_RE.is_match(&self.location)
    }

    pub fn approve(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ReviewStatus::Pending => {
                self.status = ReviewStatus::Approved { at };
                Ok(())
            }
            ref other => Err(DomainError::transition("internship", other, "approved")),
        }
    }

    /// The reason is stored as given; it only has to contain non-whitespace.
    pub fn reject(&mut self, reason: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "must not be empty"));
        }
        match self.status {
            ReviewStatus::Pending => {
                self.status = ReviewStatus::Rejected {
                    reason: reason.to_string(),
                    at,
                };
                Ok(())
            }
            ref other => Err(DomainError::transition("internship", other, "rejected")),
        }
    }
}

/// Whole months from `start` to `end`, rounding a remainder of 15+ days up.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let anchor = |m: u32| start.checked_add_months(Months::new(m));
    let span = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut months = span.max(0) as u32;
    while months > 0 && anchor(months).map_or(true, |d| d > end) {
        months -= 1;
    }
    let remainder = anchor(months).map_or(0, |d| (end - d).num_days());
    if remainder >= 15 {
        months += 1;
    }
    months
}

/// Lowercase, trim and de-duplicate free-text tags.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
