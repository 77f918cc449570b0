//! Internship reports submitted by students and reviewed by faculty or SCAD.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, InternshipId, ReportId, UserId};

/// Review state of a report. Unreviewed reports are `Pending`, never `Flagged`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Flagged,
    Accepted,
    Rejected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::Flagged,
        ReportStatus::Accepted,
        ReportStatus::Rejected,
    ];

    /// `Pending -> Flagged | Accepted | Rejected`, `Flagged -> Accepted | Rejected`.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Pending, Flagged | Accepted | Rejected) | (Flagged, Accepted | Rejected)
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Flagged => "flagged",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.pad(s)
    }
}

impl FromStr for ReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| DomainError::validation("status", format!("unknown status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment {
    pub author: UserId,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub internship: InternshipId,
    pub title: String,
    pub introduction: String,
    pub body: String,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: ReportId,
    pub student: UserId,
    pub internship: InternshipId,
    pub title: String,
    pub introduction: String,
    pub body: String,
    pub courses: Vec<String>,
    pub status: ReportStatus,
    pub comments: Vec<ReviewComment>,
    pub submitted_at: DateTime<Utc>,
}

impl Report {
    pub fn submit(
        id: ReportId,
        student: UserId,
        draft: ReportDraft,
        submitted_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        let courses: Vec<String> = draft
            .courses
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unique()
            .collect();
        if courses.is_empty() {
            return Err(DomainError::validation(
                "courses",
                "at least one course is required",
            ));
        }
        Ok(Self {
            id,
            student,
            internship: draft.internship,
            title: draft.title.trim().to_string(),
            introduction: draft.introduction,
            body: draft.body,
            courses,
            status: ReportStatus::default(),
            comments: Vec::new(),
            submitted_at,
        })
    }

    /// Move to `next`, attaching an optional reviewer comment.
    pub fn review(
        &mut self,
        reviewer: UserId,
        next: ReportStatus,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("report", self.status, next));
        }
        self.status = next;
        if let Some(content) = comment.map(str::trim).filter(|c| !c.is_empty()) {
            self.comments.push(ReviewComment {
                author: reviewer,
                content: content.to_string(),
                at,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report::submit(
            ReportId(1),
            UserId(2),
            ReportDraft {
                internship: InternshipId(3),
                title: "Summer at Acme".into(),
                introduction: String::new(),
                body: String::new(),
                courses: vec!["CSEN 401".into(), " ".into(), "DMET 502".into()],
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn given_new_report_when_submitted_then_pending_with_clean_courses() {
        let report = report();
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.courses, vec!["CSEN 401", "DMET 502"]);
    }

    #[test]
    fn given_flagged_report_when_accepting_then_allowed_with_comment() {
        let mut report = report();
        report
            .review(UserId(5), ReportStatus::Flagged, Some("missing dates"), Utc::now())
            .unwrap();
        report
            .review(UserId(5), ReportStatus::Accepted, None, Utc::now())
            .unwrap();
        assert_eq!(report.status, ReportStatus::Accepted);
        assert_eq!(report.comments.len(), 1);
    }

    #[test]
    fn given_accepted_report_when_reviewing_again_then_invalid_transition() {
        let mut report = report();
        report
            .review(UserId(5), ReportStatus::Accepted, None, Utc::now())
            .unwrap();
        assert!(report
            .review(UserId(5), ReportStatus::Flagged, None, Utc::now())
            .is_err());
        assert!(report
            .review(UserId(5), ReportStatus::Pending, None, Utc::now())
            .is_err());
    }

    #[test]
    fn given_status_names_when_parsing_then_round_trip() {
        for status in ReportStatus::ALL {
            assert_eq!(status.to_string().parse::<ReportStatus>().unwrap(), status);
        }
        assert!("done".parse::<ReportStatus>().is_err());
    }
}
