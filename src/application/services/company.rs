//! Company approval and recommendation service

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::{has_interned_at, load_as};
use crate::application::ApplicationResult;
use crate::domain::{DomainError, Role, User, UserId};
use crate::infrastructure::traits::{Clock, Repository};

/// Student-facing company filter. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    pub industry: Option<String>,
    pub search: Option<String>,
}

impl CompanyFilter {
    fn matches(&self, user: &User) -> bool {
        let Some(company) = user.as_company() else {
            return false;
        };
        let industry_ok = self
            .industry
            .as_deref()
            .map_or(true, |i| company.industry.eq_ignore_ascii_case(i.trim()));
        let search_ok = self.search.as_deref().map_or(true, |q| {
            company
                .company_name
                .to_lowercase()
                .contains(&q.trim().to_lowercase())
        });
        industry_ok && search_ok
    }
}

pub struct CompanyService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl CompanyService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Approve a pending company. SCAD only; approval is final.
    pub fn approve(&self, actor: UserId, company: UserId) -> ApplicationResult<()> {
        debug!("approve company: actor={actor} company={company}");
        let repo = self.repo.as_ref();
        load_as(repo, actor, Role::Scad, "approve companies")?;
        let mut target = self.load_company(company)?;
        let now = self.clock.now();
        if let Some(profile) = target.as_company_mut() {
            profile.approve(now)?;
        }
        target.add_notification("Your company registration has been approved", now);
        self.repo.update_user(target)?;
        info!("company {company} approved by {actor}");
        Ok(())
    }

    /// Reject a pending company with a non-empty reason. The record is kept.
    pub fn reject(&self, actor: UserId, company: UserId, reason: &str) -> ApplicationResult<()> {
        debug!("reject company: actor={actor} company={company}");
        let repo = self.repo.as_ref();
        load_as(repo, actor, Role::Scad, "reject companies")?;
        let mut target = self.load_company(company)?;
        let now = self.clock.now();
        if let Some(profile) = target.as_company_mut() {
            profile.reject(reason, now)?;
        }
        target.add_notification(
            format!("Your company registration was rejected: {}", reason.trim()),
            now,
        );
        self.repo.update_user(target)?;
        info!("company {company} rejected by {actor}");
        Ok(())
    }

    /// Companies shown to students: approved ones only.
    pub fn approved_companies(&self, filter: &CompanyFilter) -> Vec<User> {
        self.companies()
            .filter(|u| u.as_company().is_some_and(|c| c.is_approved()))
            .filter(|u| filter.matches(u))
            .collect()
    }

    /// Review queue for SCAD.
    pub fn pending_companies(&self) -> Vec<User> {
        self.companies()
            .filter(|u| {
                u.as_company()
                    .is_some_and(|c| c.status == crate::domain::CompanyStatus::Pending)
            })
            .collect()
    }

    pub fn company(&self, id: UserId) -> ApplicationResult<User> {
        self.load_company(id)
    }

    pub fn has_interned_at(&self, student: UserId, company: UserId) -> ApplicationResult<bool> {
        let repo = self.repo.as_ref();
        let student = load_as(repo, student, Role::Student, "intern")?;
        Ok(has_interned_at(repo, &student, company))
    }

    /// Endorse a company the student interned at.
    ///
    /// Returns `true` when the endorsement was added and `false` when it was
    /// already present; repeating it is a no-op, not an error.
    pub fn recommend(&self, student: UserId, company: UserId) -> ApplicationResult<bool> {
        let repo = self.repo.as_ref();
        let mut user = load_as(repo, student, Role::Student, "recommend companies")?;
        let target = self.load_company(company)?;
        if !has_interned_at(repo, &user, company) {
            return Err(DomainError::not_eligible(format!(
                "{} has no completed internship at {}",
                user.username,
                target.display_name()
            ))
            .into());
        }
        let added = user
            .as_student_mut()
            .map(|p| p.recommend(company))
            .unwrap_or(false);
        if added {
            self.repo.update_user(user)?;
            info!("{student} recommended {company}");
        }
        Ok(added)
    }

    /// How many students endorse `company`.
    pub fn recommendation_count(&self, company: UserId) -> usize {
        self.repo
            .users()
            .iter()
            .filter_map(User::as_student)
            .filter(|s| s.recommended_companies.contains(&company))
            .count()
    }

    fn companies(&self) -> impl Iterator<Item = User> {
        self.repo
            .users()
            .into_iter()
            .filter(|u| u.role() == Role::Company)
    }

    fn load_company(&self, id: UserId) -> ApplicationResult<User> {
        let user = self
            .repo
            .user(id)
            .filter(|u| u.role() == Role::Company)
            .ok_or(DomainError::NotFound {
                entity: "company",
                id: id.get(),
            })?;
        Ok(user)
    }
}
