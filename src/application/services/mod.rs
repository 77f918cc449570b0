//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on boundary traits (Repository, Clock) but are
//! themselves concrete structs, not traits.
//!
//! Every operation validates against cloned entities before writing, so an
//! error leaves the repository untouched.

mod application;
mod company;
mod identity;
mod internship;
mod report;
mod workshop;

pub use application::ApplicationService;
pub use company::{CompanyFilter, CompanyService};
pub use identity::IdentityService;
pub use internship::{InternshipService, ListingFilter, Suggestion};
pub use report::ReportService;
pub use workshop::WorkshopService;

use crate::domain::{
    Application, ApplicationId, DomainError, DomainResult, Internship, InternshipId, Report,
    ReportId, Role, User, UserId, Workshop, WorkshopId,
};
use crate::infrastructure::traits::Repository;

pub(crate) fn load_user(repo: &dyn Repository, id: UserId) -> DomainResult<User> {
    repo.user(id).ok_or(DomainError::NotFound {
        entity: "user",
        id: id.get(),
    })
}

/// Load a user and check it holds `role`.
pub(crate) fn load_as(
    repo: &dyn Repository,
    id: UserId,
    role: Role,
    action: &'static str,
) -> DomainResult<User> {
    let user = load_user(repo, id)?;
    user.require(role, action)?;
    Ok(user)
}

pub(crate) fn load_internship(repo: &dyn Repository, id: InternshipId) -> DomainResult<Internship> {
    repo.internship(id).ok_or(DomainError::NotFound {
        entity: "internship",
        id: id.get(),
    })
}

pub(crate) fn load_application(
    repo: &dyn Repository,
    id: ApplicationId,
) -> DomainResult<Application> {
    repo.application(id).ok_or(DomainError::NotFound {
        entity: "application",
        id: id.get(),
    })
}

pub(crate) fn load_report(repo: &dyn Repository, id: ReportId) -> DomainResult<Report> {
    repo.report(id).ok_or(DomainError::NotFound {
        entity: "report",
        id: id.get(),
    })
}

pub(crate) fn load_workshop(repo: &dyn Repository, id: WorkshopId) -> DomainResult<Workshop> {
    repo.workshop(id).ok_or(DomainError::NotFound {
        entity: "workshop",
        id: id.get(),
    })
}

/// Company owning `internship`, which must exist and be a company account.
pub(crate) fn owning_company(repo: &dyn Repository, internship: &Internship) -> DomainResult<User> {
    let company = load_user(repo, internship.company)?;
    company.require(Role::Company, "own internships")?;
    Ok(company)
}

/// Internship is shown to students only if it and its company are approved.
pub(crate) fn is_visible(repo: &dyn Repository, internship: &Internship) -> bool {
    internship.is_approved()
        && repo
            .user(internship.company)
            .and_then(|u| u.as_company().map(|c| c.is_approved()))
            .unwrap_or(false)
}

/// A student has interned at a company if one of their applications to its
/// postings was finalized, or if a historical placement there is recorded.
pub(crate) fn has_interned_at(repo: &dyn Repository, student: &User, company: UserId) -> bool {
    let historical = student
        .as_student()
        .map(|s| s.has_past_placement_at(company))
        .unwrap_or(false);
    historical
        || repo.applications().iter().any(|a| {
            a.student == student.id
                && a.status == crate::domain::ApplicationStatus::Finalized
                && repo
                    .internship(a.internship)
                    .is_some_and(|i| i.company == company)
        })
}
