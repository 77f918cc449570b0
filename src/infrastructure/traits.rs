//! Storage and time boundary traits for testability
//!
//! Services never touch global state: every entity lives in a `Repository`
//! and every timestamp comes from a `Clock`, so tests can swap either.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::trace;

use crate::domain::{
    Application, ApplicationId, DomainError, DomainResult, Internship, InternshipId, Report,
    ReportId, User, UserId, Workshop, WorkshopId,
};

/// Single authoritative store for every entity.
///
/// Each entity is stored exactly once, keyed by id. Relationships such as
/// "a student's applications" are queries over these tables, not copies.
/// Readers receive clones; writers replace the whole entity.
pub trait Repository: Send + Sync {
    /// Allocate a fresh id, unique across all tables.
    fn next_id(&self) -> u64;

    fn user(&self, id: UserId) -> Option<User>;
    fn user_by_username(&self, username: &str) -> Option<User>;
    fn users(&self) -> Vec<User>;
    /// Insert a new user. Fails if the id or username is taken.
    fn insert_user(&self, user: User) -> DomainResult<()>;
    /// Replace an existing user.
    fn update_user(&self, user: User) -> DomainResult<()>;

    fn internship(&self, id: InternshipId) -> Option<Internship>;
    fn internships(&self) -> Vec<Internship>;
    fn save_internship(&self, internship: Internship);
    fn remove_internship(&self, id: InternshipId) -> Option<Internship>;

    fn application(&self, id: ApplicationId) -> Option<Application>;
    fn applications(&self) -> Vec<Application>;
    fn save_application(&self, application: Application);
    fn remove_application(&self, id: ApplicationId) -> Option<Application>;

    fn report(&self, id: ReportId) -> Option<Report>;
    fn reports(&self) -> Vec<Report>;
    fn save_report(&self, report: Report);

    fn workshop(&self, id: WorkshopId) -> Option<Workshop>;
    fn workshops(&self) -> Vec<Workshop>;
    fn save_workshop(&self, workshop: Workshop);
    fn remove_workshop(&self, id: WorkshopId) -> Option<Workshop>;
}

/// Time source abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    internships: BTreeMap<InternshipId, Internship>,
    applications: BTreeMap<ApplicationId, Application>,
    reports: BTreeMap<ReportId, Report>,
    workshops: BTreeMap<WorkshopId, Workshop>,
}

/// Process-local repository. State is lost when the process exits.
#[derive(Debug)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    sequence: AtomicU64,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            sequence: AtomicU64::new(1),
        }
    }

    // A panic while holding the lock cannot leave a half-written entity
    // behind (writes are single map inserts), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Repository for InMemoryRepository {
    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    fn user_by_username(&self, username: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    fn users(&self) -> Vec<User> {
        self.read().users.values().cloned().collect()
    }

    fn insert_user(&self, user: User) -> DomainResult<()> {
        let mut tables = self.write();
        if tables.users.contains_key(&user.id) {
            return Err(DomainError::validation(
                "id",
                format!("{} is already in use", user.id),
            ));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::validation(
                "username",
                format!("'{}' is already taken", user.username),
            ));
        }
        trace!("insert_user: {} ({})", user.id, user.username);
        tables.users.insert(user.id, user);
        Ok(())
    }

    fn update_user(&self, user: User) -> DomainResult<()> {
        let mut tables = self.write();
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                entity: "user",
                id: user.id.get(),
            }),
        }
    }

    fn internship(&self, id: InternshipId) -> Option<Internship> {
        self.read().internships.get(&id).cloned()
    }

    fn internships(&self) -> Vec<Internship> {
        self.read().internships.values().cloned().collect()
    }

    fn save_internship(&self, internship: Internship) {
        self.write().internships.insert(internship.id, internship);
    }

    fn remove_internship(&self, id: InternshipId) -> Option<Internship> {
        self.write().internships.remove(&id)
    }

    fn application(&self, id: ApplicationId) -> Option<Application> {
        self.read().applications.get(&id).cloned()
    }

    fn applications(&self) -> Vec<Application> {
        self.read().applications.values().cloned().collect()
    }

    fn save_application(&self, application: Application) {
        self.write()
            .applications
            .insert(application.id, application);
    }

    fn remove_application(&self, id: ApplicationId) -> Option<Application> {
        self.write().applications.remove(&id)
    }

    fn report(&self, id: ReportId) -> Option<Report> {
        self.read().reports.get(&id).cloned()
    }

    fn reports(&self) -> Vec<Report> {
        self.read().reports.values().cloned().collect()
    }

    fn save_report(&self, report: Report) {
        self.write().reports.insert(report.id, report);
    }

    fn workshop(&self, id: WorkshopId) -> Option<Workshop> {
        self.read().workshops.get(&id).cloned()
    }

    fn workshops(&self) -> Vec<Workshop> {
        self.read().workshops.values().cloned().collect()
    }

    fn save_workshop(&self, workshop: Workshop) {
        self.write().workshops.insert(workshop.id, workshop);
    }

    fn remove_workshop(&self, id: WorkshopId) -> Option<Workshop> {
        self.write().workshops.remove(&id)
    }
}

/// Wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, FacultyProfile, PasswordHash};

    fn faculty(id: u64, username: &str) -> User {
        User::new(
            UserId(id),
            username,
            format!("{username}@uni.example.edu"),
            PasswordHash::new("password123"),
            Account::Faculty(FacultyProfile {
                department: "MET".into(),
            }),
        )
    }

    #[test]
    fn given_taken_username_when_inserting_then_rejected() {
        let repo = InMemoryRepository::new();
        repo.insert_user(faculty(1, "hassan")).unwrap();
        let err = repo.insert_user(faculty(2, "hassan")).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "username", .. }));
        assert_eq!(repo.users().len(), 1);
    }

    #[test]
    fn given_missing_user_when_updating_then_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.update_user(faculty(1, "hassan")).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "user", .. }));
    }

    #[test]
    fn given_repository_when_allocating_ids_then_strictly_increasing() {
        let repo = InMemoryRepository::new();
        let a = repo.next_id();
        let b = repo.next_id();
        assert!(b > a);
    }
}
