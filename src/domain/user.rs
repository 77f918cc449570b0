//! Users, roles and role-specific profiles.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    normalize_tags, CompanyProfile, DomainError, DomainResult, InternshipId, PasswordHash, UserId,
    WorkshopId,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").expect("static email pattern")
});

/// Closed set of roles. Derived from the `Account` variant, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Company,
    Scad,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Company => "company",
            Role::Scad => "scad",
        };
        f.pad(name)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "company" => Ok(Role::Company),
            "scad" => Ok(Role::Scad),
            other => Err(DomainError::validation(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

/// A message delivered to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub at: DateTime<Utc>,
    pub read: bool,
}

/// Historical placement recorded outside the application workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastInternship {
    pub company: UserId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A company looking at a student's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub company: UserId,
    pub at: DateTime<Utc>,
}

/// Certificate issued for completing a workshop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopCertificate {
    pub workshop: WorkshopId,
    pub title: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentProfile {
    pub major: String,
    pub gpa: f32,
    pub semester_number: u8,
    pub interests: BTreeSet<String>,
    pub current_internship: Option<InternshipId>,
    pub past_internships: Vec<PastInternship>,
    /// Endorsed companies, in the order they were recommended.
    pub recommended_companies: Vec<UserId>,
    pub is_pro: bool,
    pub profile_views: Vec<ProfileView>,
    pub workshop_certificates: Vec<WorkshopCertificate>,
}

impl StudentProfile {
    pub fn new(major: impl Into<String>, gpa: f32, semester_number: u8) -> Self {
        Self {
            major: major.into(),
            gpa,
            semester_number,
            interests: BTreeSet::new(),
            current_internship: None,
            past_internships: Vec::new(),
            recommended_companies: Vec::new(),
            is_pro: false,
            profile_views: Vec::new(),
            workshop_certificates: Vec::new(),
        }
    }

    pub fn has_past_placement_at(&self, company: UserId) -> bool {
        self.past_internships.iter().any(|p| p.company == company)
    }

    /// Add a company to the endorsements. Returns `false` if already present.
    pub fn recommend(&mut self, company: UserId) -> bool {
        if self.recommended_companies.contains(&company) {
            return false;
        }
        self.recommended_companies.push(company);
        true
    }

    pub fn has_certificate_for(&self, workshop: WorkshopId) -> bool {
        self.workshop_certificates
            .iter()
            .any(|c| c.workshop == workshop)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyProfile {
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScadProfile {
    pub office: String,
}

/// Role-specific data. The role of a user is whichever variant it holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    Student(StudentProfile),
    Faculty(FacultyProfile),
    Company(CompanyProfile),
    Scad(ScadProfile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: PasswordHash,
    pub notifications: Vec<Notification>,
    pub account: Account,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password: PasswordHash,
        account: Account,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password,
            notifications: Vec::new(),
            account,
        }
    }

    pub fn role(&self) -> Role {
        match self.account {
            Account::Student(_) => Role::Student,
            Account::Faculty(_) => Role::Faculty,
            Account::Company(_) => Role::Company,
            Account::Scad(_) => Role::Scad,
        }
    }

    /// Name shown in listings: company name for companies, username otherwise.
    pub fn display_name(&self) -> &str {
        match &self.account {
            Account::Company(c) => &c.company_name,
            _ => &self.username,
        }
    }

    pub fn as_student(&self) -> Option<&StudentProfile> {
        match &self.account {
            Account::Student(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_student_mut(&mut self) -> Option<&mut StudentProfile> {
        match &mut self.account {
            Account::Student(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_company(&self) -> Option<&CompanyProfile> {
        match &self.account {
            Account::Company(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_company_mut(&mut self) -> Option<&mut CompanyProfile> {
        match &mut self.account {
            Account::Company(c) => Some(c),
            _ => None,
        }
    }

    /// Require a specific role for `action`.
    pub fn require(&self, role: Role, action: &'static str) -> DomainResult<()> {
        self.require_any(&[role], action)
    }

    pub fn require_any(&self, roles: &[Role], action: &'static str) -> DomainResult<()> {
        if roles.contains(&self.role()) {
            Ok(())
        } else {
            Err(DomainError::Forbidden {
                action,
                role: self.role(),
            })
        }
    }

    pub fn add_notification(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.notifications.push(Notification {
            message: message.into(),
            at,
            read: false,
        });
    }

    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| !n.read)
    }
}

/// Registration form for a student account.
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub major: String,
    pub gpa: f32,
    pub semester_number: u8,
    pub interests: Vec<String>,
}

impl StudentRegistration {
    pub fn to_profile(&self) -> DomainResult<StudentProfile> {
        if self.major.trim().is_empty() {
            return Err(DomainError::validation("major", "must not be empty"));
        }
        if !(0.0..=5.0).contains(&self.gpa) {
            return Err(DomainError::validation(
                "gpa",
                format!("{} is outside 0.0..=5.0", self.gpa),
            ));
        }
        if !(1..=10).contains(&self.semester_number) {
            return Err(DomainError::validation(
                "semester_number",
                format!("{} is outside 1..=10", self.semester_number),
            ));
        }
        let mut profile = StudentProfile::new(self.major.trim(), self.gpa, self.semester_number);
        profile.interests = normalize_tags(&self.interests);
        Ok(profile)
    }
}

/// Validate the fields shared by every registration form.
pub fn validate_identity(
    username: &str,
    email: &str,
    password: &str,
    min_password_len: usize,
) -> DomainResult<()> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username", "must not be empty"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username", "must not contain whitespace"));
    }
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid address"),
        ));
    }
    if password.chars().count() < min_password_len {
        return Err(DomainError::validation(
            "password",
            format!("must be at least {min_password_len} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> User {
        User::new(
            UserId(1),
            "mariam",
            "mariam@student.example.edu",
            PasswordHash::new("password123"),
            Account::Student(StudentProfile::new("Computer Science", 3.4, 6)),
        )
    }

    #[test]
    fn given_account_variant_when_asking_role_then_role_follows_variant() {
        let user = student();
        assert_eq!(user.role(), Role::Student);
        assert!(user.as_company().is_none());
        assert!(user.require(Role::Scad, "approve companies").is_err());
    }

    #[test]
    fn given_unread_notifications_when_marking_all_read_then_none_unread() {
        let mut user = student();
        let now = Utc::now();
        user.add_notification("first", now);
        user.add_notification("second", now);
        assert_eq!(user.unread().count(), 2);

        user.mark_all_as_read();

        assert_eq!(user.unread().count(), 0);
        assert_eq!(user.notifications.len(), 2);
        assert_eq!(user.notifications[0].message, "first");
    }

    #[test]
    fn given_recommended_company_when_recommending_again_then_noop() {
        let mut profile = StudentProfile::new("CS", 3.0, 5);
        assert!(profile.recommend(UserId(9)));
        assert!(!profile.recommend(UserId(9)));
        assert_eq!(profile.recommended_companies, vec![UserId(9)]);
    }

    #[test]
    fn given_role_names_when_parsing_then_case_insensitive() {
        assert_eq!("SCAD".parse::<Role>().unwrap(), Role::Scad);
        assert_eq!(" faculty ".parse::<Role>().unwrap(), Role::Faculty);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn given_bad_email_when_validating_identity_then_validation_error() {
        let err = validate_identity("acme", "acme.example.com", "longenough", 8).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));

        let err = validate_identity("acme", "hr@acme.com", "short", 8).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "password",
                ..
            }
        ));

        assert!(validate_identity("acme", "hr@acme.com", "longenough", 8).is_ok());
    }
}
