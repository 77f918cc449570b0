//! Identity service
//!
//! Registration, authentication, notifications and profile bookkeeping.

use std::sync::{Arc, LazyLock};

use tracing::{debug, info, instrument};

use crate::application::services::{load_as, load_user};
use crate::application::ApplicationResult;
use crate::domain::{
    validate_identity, Account, CompanyRegistration, DomainError, FacultyProfile, Notification,
    PasswordHash, ProfileView, Role, ScadProfile, StudentRegistration, User, UserId,
};
use crate::infrastructure::traits::{Clock, Repository};

static DECOY_HASH: LazyLock<PasswordHash> = LazyLock::new(PasswordHash::decoy);

/// Service for accounts and sessions.
pub struct IdentityService {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
    min_password_len: usize,
}

impl IdentityService {
    /// Create a new identity service.
    pub fn new(repo: Arc<dyn Repository>, clock: Arc<dyn Clock>, min_password_len: usize) -> Self {
        Self {
            repo,
            clock,
            min_password_len,
        }
    }

    /// Log a user in.
    ///
    /// An unknown username and a wrong password both yield
    /// `InvalidCredentials`, so callers cannot probe for usernames.
    #[instrument(skip(self, password))]
    pub fn authenticate(&self, username: &str, password: &str) -> ApplicationResult<User> {
        let user = self.repo.user_by_username(username.trim());
        // an unknown username still pays for one digest
        let hash = user.as_ref().map_or(&*DECOY_HASH, |u| &u.password);
        let verified = hash.verify(password);
        let user = user
            .filter(|_| verified)
            .ok_or(DomainError::InvalidCredentials)?;
        info!("authenticated {} as {}", user.username, user.role());
        Ok(user)
    }

    /// Register a company. It starts pending and every SCAD user is told.
    pub fn register_company(&self, registration: CompanyRegistration) -> ApplicationResult<UserId> {
        debug!("register_company: {}", registration.username);
        validate_identity(
            &registration.username,
            &registration.email,
            &registration.password,
            self.min_password_len,
        )?;
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_string();
        let password = PasswordHash::new(&registration.password);
        let profile = registration.into_profile()?;
        let name = profile.company_name.clone();

        let id = self.insert(username, email, password, Account::Company(profile))?;

        let now = self.clock.now();
        for mut scad in self.users_with_role(Role::Scad) {
            scad.add_notification(
                format!("New company registration awaiting review: {name}"),
                now,
            );
            self.repo.update_user(scad)?;
        }
        info!("registered company {name} as {id}");
        Ok(id)
    }

    pub fn register_student(&self, registration: StudentRegistration) -> ApplicationResult<UserId> {
        debug!("register_student: {}", registration.username);
        validate_identity(
            &registration.username,
            &registration.email,
            &registration.password,
            self.min_password_len,
        )?;
        let profile = registration.to_profile()?;
        let id = self.insert(
            registration.username.trim().to_string(),
            registration.email.trim().to_string(),
            PasswordHash::new(&registration.password),
            Account::Student(profile),
        )?;
        Ok(id)
    }

    pub fn register_faculty(
        &self,
        username: &str,
        email: &str,
        password: &str,
        department: &str,
    ) -> ApplicationResult<UserId> {
        validate_identity(username, email, password, self.min_password_len)?;
        let id = self.insert(
            username.trim().to_string(),
            email.trim().to_string(),
            PasswordHash::new(password),
            Account::Faculty(FacultyProfile {
                department: department.trim().to_string(),
            }),
        )?;
        Ok(id)
    }

    pub fn register_scad(
        &self,
        username: &str,
        email: &str,
        password: &str,
        office: &str,
    ) -> ApplicationResult<UserId> {
        validate_identity(username, email, password, self.min_password_len)?;
        let id = self.insert(
            username.trim().to_string(),
            email.trim().to_string(),
            PasswordHash::new(password),
            Account::Scad(ScadProfile {
                office: office.trim().to_string(),
            }),
        )?;
        Ok(id)
    }

    fn insert(
        &self,
        username: String,
        email: String,
        password: PasswordHash,
        account: Account,
    ) -> ApplicationResult<UserId> {
        let id = UserId(self.repo.next_id());
        self.repo
            .insert_user(User::new(id, username, email, password, account))?;
        Ok(id)
    }

    pub fn user(&self, id: UserId) -> ApplicationResult<User> {
        Ok(load_user(self.repo.as_ref(), id)?)
    }

    pub fn users_with_role(&self, role: Role) -> Vec<User> {
        self.repo
            .users()
            .into_iter()
            .filter(|u| u.role() == role)
            .collect()
    }

    pub fn notify(&self, user: UserId, message: &str) -> ApplicationResult<()> {
        let mut target = load_user(self.repo.as_ref(), user)?;
        target.add_notification(message, self.clock.now());
        self.repo.update_user(target)?;
        Ok(())
    }

    /// Mark every notification as read. Returns how many were unread.
    pub fn mark_all_as_read(&self, user: UserId) -> ApplicationResult<usize> {
        let mut target = load_user(self.repo.as_ref(), user)?;
        let unread = target.unread().count();
        target.mark_all_as_read();
        self.repo.update_user(target)?;
        Ok(unread)
    }

    pub fn unread_notifications(&self, user: UserId) -> ApplicationResult<Vec<Notification>> {
        let target = load_user(self.repo.as_ref(), user)?;
        Ok(target.unread().cloned().collect())
    }

    /// Record that a company looked at a student's profile.
    pub fn record_profile_view(&self, viewer: UserId, student: UserId) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        load_as(repo, viewer, Role::Company, "view student profiles")?;
        let mut target = load_as(repo, student, Role::Student, "have a profile")
            .map_err(|_| DomainError::NotFound {
                entity: "student",
                id: student.get(),
            })?;
        if let Some(profile) = target.as_student_mut() {
            profile.profile_views.push(ProfileView {
                company: viewer,
                at: self.clock.now(),
            });
        }
        self.repo.update_user(target)?;
        Ok(())
    }

    /// Grant or revoke pro status. SCAD only.
    pub fn set_pro_status(
        &self,
        actor: UserId,
        student: UserId,
        is_pro: bool,
    ) -> ApplicationResult<()> {
        let repo = self.repo.as_ref();
        load_as(repo, actor, Role::Scad, "change pro status")?;
        let mut target = load_as(repo, student, Role::Student, "hold pro status")?;
        if let Some(profile) = target.as_student_mut() {
            profile.is_pro = is_pro;
        }
        target.add_notification(
            if is_pro {
                "You are now a PRO student"
            } else {
                "Your PRO status was revoked"
            },
            self.clock.now(),
        );
        self.repo.update_user(target)?;
        info!("pro status of {student} set to {is_pro}");
        Ok(())
    }
}
