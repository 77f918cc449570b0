//! Application submission and review service
//!
//! Applications are stored once. A student's applications and an
//! internship's applicants are both queries over the same table, so a status
//! change is seen identically from either side.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::{
    is_visible, load_application, load_as, load_internship, load_user, owning_company,
};
use crate::application::ApplicationResult;
use crate::domain::{
    Application, ApplicationForm, ApplicationId, ApplicationStatus, DomainError, InternshipId,
    PastInternship, Role, UserId,
};
use crate::infrastructure::traits::{Clock, Repository};

pub struct ApplicationService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl ApplicationService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Apply to a visible internship. One application per internship.
    pub fn submit(
        &self,
        student: UserId,
        internship: InternshipId,
        form: ApplicationForm,
    ) -> ApplicationResult<ApplicationId> {
        debug!("submit application: student={student} internship={internship}");
        let repo = self.repo.as_ref();
        let applicant = load_as(repo, student, Role::Student, "apply to internships")?;
        let posting = load_internship(repo, internship)?;
        if !is_visible(repo, &posting) {
            return Err(DomainError::not_eligible(format!(
                "internship '{}' is not open for applications",
                posting.title
            ))
            .into());
        }
        if self
            .repo
            .applications()
            .iter()
            .any(|a| a.student == student && a.internship == internship)
        {
            return Err(DomainError::AlreadyApplied.into());
        }
        let mut company = owning_company(repo, &posting)?;

        let now = self.clock.now();
        let id = ApplicationId(self.repo.next_id());
        let application = Application::submit(id, student, internship, form, now)?;
        company.add_notification(
            format!("{} applied to '{}'", applicant.username, posting.title),
            now,
        );
        self.repo.save_application(application);
        self.repo.update_user(company)?;
        info!("application {id} submitted");
        Ok(id)
    }

    pub fn accept(&self, actor: UserId, id: ApplicationId) -> ApplicationResult<()> {
        self.move_to(actor, id, ApplicationStatus::Accepted)
    }

    pub fn reject(&self, actor: UserId, id: ApplicationId) -> ApplicationResult<()> {
        self.move_to(actor, id, ApplicationStatus::Rejected)
    }

    /// Finalize an accepted application; the internship becomes the
    /// student's current one.
    pub fn finalize(&self, actor: UserId, id: ApplicationId) -> ApplicationResult<()> {
        self.move_to(actor, id, ApplicationStatus::Finalized)
    }

    fn move_to(
        &self,
        actor: UserId,
        id: ApplicationId,
        next: ApplicationStatus,
    ) -> ApplicationResult<()> {
        debug!("application {id}: -> {next} by {actor}");
        let repo = self.repo.as_ref();
        let reviewer = load_user(repo, actor)?;
        let mut application = load_application(repo, id)?;
        let internship = load_internship(repo, application.internship)?;
        let owns = reviewer.role() == Role::Company && internship.company == reviewer.id;
        if !owns {
            reviewer.require(Role::Scad, "review applications of other companies")?;
        }

        let mut student = load_user(repo, application.student)?;
        application.transition(next)?;
        if next == ApplicationStatus::Finalized {
            let profile = student
                .as_student_mut()
                .ok_or(DomainError::NotFound {
                    entity: "student",
                    id: application.student.get(),
                })?;
            if let Some(current) = profile.current_internship {
                return Err(DomainError::not_eligible(format!(
                    "student already has a current internship ({current})"
                ))
                .into());
            }
            profile.current_internship = Some(internship.id);
        }
        student.add_notification(
            format!("Your application to '{}' is now {next}", internship.title),
            self.clock.now(),
        );
        self.repo.save_application(application);
        self.repo.update_user(student)?;
        info!("application {id} is now {next}");
        Ok(())
    }

    /// Close the student's current internship and record it as a past one.
    pub fn complete_current_internship(&self, student: UserId) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        let mut user = load_as(repo, student, Role::Student, "complete internships")?;
        let current = user
            .as_student()
            .and_then(|p| p.current_internship)
            .ok_or_else(|| DomainError::not_eligible("no current internship"))?;
        let internship = load_internship(repo, current)?;
        if let Some(profile) = user.as_student_mut() {
            profile.current_internship = None;
            profile.past_internships.push(PastInternship {
                company: internship.company,
                title: internship.title.clone(),
                start_date: internship.start_date,
                end_date: internship.end_date,
            });
        }
        self.repo.update_user(user)?;
        info!("{student} completed internship {current}");
        Ok(())
    }

    pub fn application(&self, id: ApplicationId) -> ApplicationResult<Application> {
        Ok(load_application(self.repo.as_ref(), id)?)
    }

    /// A student's applications, oldest first.
    pub fn applications_of(&self, student: UserId) -> Vec<Application> {
        let mut apps: Vec<_> = self
            .repo
            .applications()
            .into_iter()
            .filter(|a| a.student == student)
            .collect();
        apps.sort_by_key(|a| (a.submitted_at, a.id));
        apps
    }

    /// An internship's applicants, oldest first.
    pub fn applicants_of(&self, internship: InternshipId) -> Vec<Application> {
        let mut apps: Vec<_> = self
            .repo
            .applications()
            .into_iter()
            .filter(|a| a.internship == internship)
            .collect();
        apps.sort_by_key(|a| (a.submitted_at, a.id));
        apps
    }
}
