//! Internship posting, review and listing service

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::services::{
    is_visible, load_as, load_internship, load_user, owning_company,
};
use crate::application::ApplicationResult;
use crate::domain::{
    ApplicationStatus, DomainError, Internship, InternshipDraft, InternshipId, ReviewStatus, Role,
    User, UserId,
};
use crate::infrastructure::traits::{Clock, Repository};

/// Student-facing listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub industry: Option<String>,
    pub paid: Option<bool>,
    pub duration_months: Option<u32>,
    /// Case-insensitive match on title, company name or skills.
    pub search: Option<String>,
}

impl ListingFilter {
    fn matches(&self, internship: &Internship, company: &User) -> bool {
        let industry = company.as_company().map(|c| c.industry.as_str());
        if let Some(wanted) = self.industry.as_deref() {
            if !industry.is_some_and(|i| i.eq_ignore_ascii_case(wanted.trim())) {
                return false;
            }
        }
        if let Some(paid) = self.paid {
            if internship.compensation.is_paid() != paid {
                return false;
            }
        }
        if let Some(months) = self.duration_months {
            if internship.duration_months() != months {
                return false;
            }
        }
        if let Some(query) = self.search.as_deref() {
            let query = query.trim().to_lowercase();
            let hit = internship.title.to_lowercase().contains(&query)
                || company.display_name().to_lowercase().contains(&query)
                || internship.skills.iter().any(|s| s.contains(&query));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// A listing ranked for one student.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub internship: Internship,
    pub company_name: String,
    pub matched_interests: Vec<String>,
    pub recommendations: usize,
}

impl Suggestion {
    pub fn score(&self) -> usize {
        self.matched_interests.len() * 2 + self.recommendations
    }
}

pub struct InternshipService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl InternshipService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Post a new internship. Only approved companies may post; the posting
    /// starts pending review.
    pub fn post(&self, actor: UserId, draft: InternshipDraft) -> ApplicationResult<InternshipId> {
        debug!("post internship: company={actor} title={}", draft.title);
        let company = load_as(self.repo.as_ref(), actor, Role::Company, "post internships")?;
        if !company.as_company().is_some_and(|c| c.is_approved()) {
            return Err(DomainError::not_eligible(format!(
                "{} is not approved yet",
                company.display_name()
            ))
            .into());
        }
        let id = InternshipId(self.repo.next_id());
        let internship = Internship::from_draft(id, actor, draft, self.clock.now())?;
        self.repo.save_internship(internship);
        info!("internship {id} posted by {actor}");
        Ok(id)
    }

    /// Edit a posting. Owner only, in any review state; the state is kept.
    pub fn edit(
        &self,
        actor: UserId,
        id: InternshipId,
        draft: InternshipDraft,
    ) -> ApplicationResult<()> {
        let mut internship = self.load_owned(actor, id, "edit internships")?;
        internship.apply_edit(draft)?;
        if internship.is_approved() {
            debug!("edit of approved internship {id} keeps its approval");
        }
        self.repo.save_internship(internship);
        Ok(())
    }

    /// Delete a posting. Owner only.
    ///
    /// Refused while an accepted or finalized application points at it.
    /// Pending and rejected applications are dropped and pending applicants
    /// are notified.
    pub fn delete(&self, actor: UserId, id: InternshipId) -> ApplicationResult<()> {
        let internship = self.load_owned(actor, id, "delete internships")?;
        let applications: Vec<_> = self
            .repo
            .applications()
            .into_iter()
            .filter(|a| a.internship == id)
            .collect();
        if let Some(active) = applications.iter().find(|a| {
            matches!(
                a.status,
                ApplicationStatus::Accepted | ApplicationStatus::Finalized
            )
        }) {
            return Err(DomainError::InUse {
                entity: "internship",
                id: id.get(),
                reason: format!("application {} is {}", active.id, active.status),
            }
            .into());
        }

        let now = self.clock.now();
        let mut notified = Vec::new();
        for app in applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending)
        {
            let mut student = load_user(self.repo.as_ref(), app.student)?;
            student.add_notification(
                format!("The internship '{}' was withdrawn", internship.title),
                now,
            );
            notified.push(student);
        }
        for student in notified {
            self.repo.update_user(student)?;
        }
        for app in &applications {
            self.repo.remove_application(app.id);
        }
        self.repo.remove_internship(id);
        warn!(
            "internship {id} deleted by {actor}, {} application(s) dropped",
            applications.len()
        );
        Ok(())
    }

    /// Approve a pending posting. Faculty or SCAD.
    pub fn approve(&self, actor: UserId, id: InternshipId) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        let reviewer = load_user(repo, actor)?;
        reviewer.require_any(&[Role::Faculty, Role::Scad], "approve internships")?;
        let mut internship = load_internship(repo, id)?;
        let mut company = owning_company(repo, &internship)?;
        let now = self.clock.now();
        internship.approve(now)?;
        company.add_notification(
            format!("Your internship '{}' was approved", internship.title),
            now,
        );
        self.repo.save_internship(internship);
        self.repo.update_user(company)?;
        info!("internship {id} approved by {actor}");
        Ok(())
    }

    /// Reject a pending posting with a reason. Faculty or SCAD.
    pub fn reject(&self, actor: UserId, id: InternshipId, reason: &str) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        let reviewer = load_user(repo, actor)?;
        reviewer.require_any(&[Role::Faculty, Role::Scad], "reject internships")?;
        let mut internship = load_internship(repo, id)?;
        let mut company = owning_company(repo, &internship)?;
        let now = self.clock.now();
        internship.reject(reason, now)?;
        company.add_notification(
            format!(
                "Your internship '{}' was rejected: {}",
                internship.title,
                reason.trim()
            ),
            now,
        );
        self.repo.save_internship(internship);
        self.repo.update_user(company)?;
        info!("internship {id} rejected by {actor}");
        Ok(())
    }

    pub fn internship(&self, id: InternshipId) -> ApplicationResult<Internship> {
        Ok(load_internship(self.repo.as_ref(), id)?)
    }

    pub fn is_visible(&self, internship: &Internship) -> bool {
        is_visible(self.repo.as_ref(), internship)
    }

    /// Student-facing listings, newest first.
    pub fn listings(&self, filter: &ListingFilter) -> Vec<Internship> {
        let repo = self.repo.as_ref();
        let mut listed: Vec<Internship> = repo
            .internships()
            .into_iter()
            .filter(|i| is_visible(repo, i))
            .filter(|i| {
                repo.user(i.company)
                    .is_some_and(|company| filter.matches(i, &company))
            })
            .collect();
        listed.sort_by_key(|i| (Reverse(i.created_at), i.id));
        listed
    }

    /// Review queue for faculty and SCAD, oldest first.
    pub fn pending(&self) -> Vec<Internship> {
        let mut queue: Vec<Internship> = self
            .repo
            .internships()
            .into_iter()
            .filter(|i| i.status == ReviewStatus::Pending)
            .collect();
        queue.sort_by_key(|i| (i.created_at, i.id));
        queue
    }

    /// A company's own postings in every review state.
    pub fn posted_by(&self, company: UserId) -> Vec<Internship> {
        self.repo
            .internships()
            .into_iter()
            .filter(|i| i.company == company)
            .collect()
    }

    /// Visible listings ranked for a student by interest overlap and
    /// endorsements of the posting company.
    pub fn suggestions(&self, student: UserId, limit: usize) -> ApplicationResult<Vec<Suggestion>> {
        let repo = self.repo.as_ref();
        let user = load_as(repo, student, Role::Student, "receive suggestions")?;
        let interests = user
            .as_student()
            .map(|s| s.interests.clone())
            .unwrap_or_default();
        let users = repo.users();
        let endorsements = |company: UserId| {
            users
                .iter()
                .filter_map(User::as_student)
                .filter(|s| s.recommended_companies.contains(&company))
                .count()
        };

        let mut ranked: Vec<Suggestion> = self
            .listings(&ListingFilter::default())
            .into_iter()
            .filter_map(|internship| {
                let company = users.iter().find(|u| u.id == internship.company)?;
                let industry = company
                    .as_company()
                    .map(|c| c.industry.to_lowercase())
                    .unwrap_or_default();
                let matched_interests: Vec<String> = interests
                    .iter()
                    .filter(|i| internship.skills.contains(*i) || **i == industry)
                    .cloned()
                    .collect();
                let recommendations = endorsements(internship.company);
                if matched_interests.is_empty() && recommendations == 0 {
                    return None;
                }
                Some(Suggestion {
                    company_name: company.display_name().to_string(),
                    internship,
                    matched_interests,
                    recommendations,
                })
            })
            .collect();
        ranked.sort_by_key(|s| (Reverse(s.score()), Reverse(s.internship.created_at)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn load_owned(
        &self,
        actor: UserId,
        id: InternshipId,
        action: &'static str,
    ) -> ApplicationResult<Internship> {
        let repo = self.repo.as_ref();
        let user = load_as(repo, actor, Role::Company, action)?;
        let internship = load_internship(repo, id)?;
        if internship.company != user.id {
            return Err(DomainError::Forbidden {
                action,
                role: user.role(),
            }
            .into());
        }
        Ok(internship)
    }
}
