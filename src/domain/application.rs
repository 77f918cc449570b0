//! Student applications and their state machine.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::domain::{ApplicationId, DomainError, DomainResult, InternshipId, UserId};

/// `Pending -> Accepted -> Finalized`, `Pending -> Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Finalized,
}

impl ApplicationStatus {
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Finalized)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Finalized)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Finalized => "finalized",
        };
        f.pad(s)
    }
}

/// Files attached to an application. Contents are opaque to the domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    pub cv: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
    pub certificates: Vec<PathBuf>,
}

/// Application form as filled in by the student.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub attachments: Attachments,
}

impl ApplicationForm {
    pub fn with_cv(cv: impl Into<PathBuf>) -> Self {
        Self {
            attachments: Attachments {
                cv: Some(cv.into()),
                ..Attachments::default()
            },
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match &self.attachments.cv {
            Some(cv) if !cv.as_os_str().is_empty() => Ok(()),
            _ => Err(DomainError::validation("cv", "a CV must be attached")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: ApplicationId,
    pub student: UserId,
    pub internship: InternshipId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub attachments: Attachments,
}

impl Application {
    pub fn submit(
        id: ApplicationId,
        student: UserId,
        internship: InternshipId,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        form.validate()?;
        Ok(Self {
            id,
            student,
            internship,
            status: ApplicationStatus::Pending,
            submitted_at,
            attachments: form.attachments,
        })
    }

    pub fn transition(&mut self, next: ApplicationStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::transition("application", self.status, next));
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ApplicationStatus::*;

    const ALL: [ApplicationStatus; 4] = [Pending, Accepted, Rejected, Finalized];

    #[test]
    fn given_every_status_pair_when_checking_then_only_three_edges_allowed() {
        let allowed: Vec<_> = ALL
            .iter()
            .flat_map(|&from| ALL.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| from.can_transition_to(to))
            .collect();
        assert_eq!(
            allowed,
            vec![(Pending, Accepted), (Pending, Rejected), (Accepted, Finalized)]
        );
    }

    #[rstest]
    #[case(Rejected)]
    #[case(Finalized)]
    fn given_terminal_status_when_transitioning_then_refused(#[case] terminal: ApplicationStatus) {
        assert!(terminal.is_terminal());
        assert!(ALL.iter().all(|&next| !terminal.can_transition_to(next)));
    }

    #[test]
    fn given_pending_application_when_finalizing_directly_then_error_and_unchanged() {
        let mut app = Application::submit(
            ApplicationId(1),
            UserId(2),
            InternshipId(3),
            ApplicationForm::with_cv("cv.pdf"),
            Utc::now(),
        )
        .unwrap();
        let err = app.transition(Finalized).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(app.status, Pending);
    }

    #[test]
    fn given_form_without_cv_when_submitting_then_validation_error() {
        let err = Application::submit(
            ApplicationId(1),
            UserId(2),
            InternshipId(3),
            ApplicationForm::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "cv", .. }));
    }
}
