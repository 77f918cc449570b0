//! Workshop service: SCAD manages workshops, pro students attend them.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::application::services::{load_as, load_workshop};
use crate::application::ApplicationResult;
use crate::domain::{
    DomainError, Rating, Role, User, UserId, Workshop, WorkshopCertificate, WorkshopDraft,
    WorkshopId,
};
use crate::infrastructure::traits::{Clock, Repository};

pub struct WorkshopService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
}

impl WorkshopService {
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn create(&self, actor: UserId, draft: WorkshopDraft) -> ApplicationResult<WorkshopId> {
        load_as(self.repo.as_ref(), actor, Role::Scad, "create workshops")?;
        let id = WorkshopId(self.repo.next_id());
        let workshop = Workshop::from_draft(id, draft)?;
        info!("workshop {id} '{}' created", workshop.title);
        self.repo.save_workshop(workshop);
        Ok(id)
    }

    pub fn update(
        &self,
        actor: UserId,
        id: WorkshopId,
        draft: WorkshopDraft,
    ) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        load_as(repo, actor, Role::Scad, "update workshops")?;
        let mut workshop = load_workshop(repo, id)?;
        workshop.apply_edit(draft)?;
        self.repo.save_workshop(workshop);
        Ok(())
    }

    pub fn delete(&self, actor: UserId, id: WorkshopId) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        load_as(repo, actor, Role::Scad, "delete workshops")?;
        load_workshop(repo, id)?;
        self.repo.remove_workshop(id);
        info!("workshop {id} deleted");
        Ok(())
    }

    /// Register a pro student. A second registration is `AlreadyRegistered`.
    pub fn register(&self, student: UserId, id: WorkshopId) -> ApplicationResult<()> {
        debug!("register: student={student} workshop={id}");
        let repo = self.repo.as_ref();
        let user = self.load_pro_student(student)?;
        let mut workshop = load_workshop(repo, id)?;
        workshop.register(user.id)?;
        self.repo.save_workshop(workshop);
        Ok(())
    }

    /// Returns `false` if the student was not registered.
    pub fn unregister(&self, student: UserId, id: WorkshopId) -> ApplicationResult<bool> {
        let mut workshop = load_workshop(self.repo.as_ref(), id)?;
        let removed = workshop.unregister(student);
        if removed {
            self.repo.save_workshop(workshop);
        }
        Ok(removed)
    }

    /// Rate a workshop once. Later attempts fail with `AlreadyRated`.
    pub fn rate(
        &self,
        student: UserId,
        id: WorkshopId,
        stars: u8,
        feedback: &str,
    ) -> ApplicationResult<()> {
        let rating = Rating::new(stars)?;
        let mut workshop = load_workshop(self.repo.as_ref(), id)?;
        workshop.rate(student, rating, feedback, self.clock.now())?;
        self.repo.save_workshop(workshop);
        Ok(())
    }

    pub fn post_chat(
        &self,
        student: UserId,
        id: WorkshopId,
        content: &str,
    ) -> ApplicationResult<()> {
        let mut workshop = load_workshop(self.repo.as_ref(), id)?;
        workshop.post_chat(student, content, self.clock.now())?;
        self.repo.save_workshop(workshop);
        Ok(())
    }

    pub fn add_note(
        &self,
        student: UserId,
        id: WorkshopId,
        content: &str,
    ) -> ApplicationResult<()> {
        let mut workshop = load_workshop(self.repo.as_ref(), id)?;
        workshop.add_note(student, content, self.clock.now())?;
        self.repo.save_workshop(workshop);
        Ok(())
    }

    /// Issue a completion certificate. Returns `false` if one already exists.
    pub fn complete(&self, student: UserId, id: WorkshopId) -> ApplicationResult<bool> {
        let repo = self.repo.as_ref();
        let mut user = load_as(repo, student, Role::Student, "complete workshops")?;
        let workshop = load_workshop(repo, id)?;
        workshop.can_certify(student)?;
        let now = self.clock.now();
        let Some(profile) = user.as_student_mut() else {
            return Ok(false);
        };
        if profile.has_certificate_for(id) {
            return Ok(false);
        }
        profile.workshop_certificates.push(WorkshopCertificate {
            workshop: id,
            title: workshop.title.clone(),
            issued_at: now,
        });
        user.add_notification(format!("Certificate issued for '{}'", workshop.title), now);
        self.repo.update_user(user)?;
        info!("certificate for workshop {id} issued to {student}");
        Ok(true)
    }

    pub fn workshop(&self, id: WorkshopId) -> ApplicationResult<Workshop> {
        Ok(load_workshop(self.repo.as_ref(), id)?)
    }

    /// All workshops ordered by start date.
    pub fn list(&self) -> Vec<Workshop> {
        let mut workshops = self.repo.workshops();
        workshops.sort_by_key(|w| (w.start_date, w.start_time, w.id));
        workshops
    }

    /// Workshops that have not ended before `today`.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<Workshop> {
        self.list()
            .into_iter()
            .filter(|w| w.end_date >= today)
            .collect()
    }

    pub fn registered_for(&self, student: UserId) -> Vec<Workshop> {
        self.list()
            .into_iter()
            .filter(|w| w.is_registered(student))
            .collect()
    }

    fn load_pro_student(&self, student: UserId) -> ApplicationResult<User> {
        let user = load_as(
            self.repo.as_ref(),
            student,
            Role::Student,
            "register for workshops",
        )?;
        if !user.as_student().is_some_and(|p| p.is_pro) {
            return Err(DomainError::not_eligible(format!(
                "{} is not a PRO student",
                user.username
            ))
            .into());
        }
        Ok(user)
    }
}
