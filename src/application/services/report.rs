//! Internship report service

use std::sync::Arc;

use tracing::info;

use crate::application::services::{load_as, load_report, load_user};
use crate::application::ApplicationResult;
use crate::domain::{
    ApplicationStatus, DomainError, Report, ReportDraft, ReportId, ReportStatus, Role, UserId,
};
use crate::infrastructure::traits::{Clock, Repository};

pub struct ReportService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Submit a report on an internship the student was finalized for.
    pub fn submit(&self, student: UserId, draft: ReportDraft) -> ApplicationResult<ReportId> {
        load_as(self.repo.as_ref(), student, Role::Student, "submit reports")?;
        let placed = self.repo.applications().iter().any(|a| {
            a.student == student
                && a.internship == draft.internship
                && a.status == ApplicationStatus::Finalized
        });
        if !placed {
            return Err(DomainError::not_eligible(format!(
                "no finalized placement for internship {}",
                draft.internship
            ))
            .into());
        }
        let id = ReportId(self.repo.next_id());
        let report = Report::submit(id, student, draft, self.clock.now())?;
        self.repo.save_report(report);
        info!("report {id} submitted by {student}");
        Ok(id)
    }

    /// Set a report's status. Faculty or SCAD; the student is notified.
    pub fn review(
        &self,
        actor: UserId,
        id: ReportId,
        status: ReportStatus,
        comment: Option<&str>,
    ) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        let reviewer = load_user(repo, actor)?;
        reviewer.require_any(&[Role::Faculty, Role::Scad], "review reports")?;
        let mut report = load_report(repo, id)?;
        let mut student = load_user(repo, report.student)?;
        let now = self.clock.now();
        report.review(actor, status, comment, now)?;
        student.add_notification(
            format!("Your report '{}' is now {status}", report.title),
            now,
        );
        self.repo.save_report(report);
        self.repo.update_user(student)?;
        info!("report {id} marked {status} by {actor}");
        Ok(())
    }

    pub fn report(&self, id: ReportId) -> ApplicationResult<Report> {
        Ok(load_report(self.repo.as_ref(), id)?)
    }

    pub fn by_status(&self, status: ReportStatus) -> Vec<Report> {
        self.repo
            .reports()
            .into_iter()
            .filter(|r| r.status == status)
            .collect()
    }

    pub fn of_student(&self, student: UserId) -> Vec<Report> {
        self.repo
            .reports()
            .into_iter()
            .filter(|r| r.student == student)
            .collect()
    }

    pub fn all(&self) -> Vec<Report> {
        self.repo.reports()
    }
}
