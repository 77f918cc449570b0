//! Company profiles and their approval lifecycle.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompanySize {
    /// up to 50 employees
    Small,
    /// 51 to 100
    Medium,
    /// 101 to 500
    Large,
    /// more than 500
    Corporate,
}

impl CompanySize {
    pub fn from_employees(count: u32) -> Self {
        match count {
            0..=50 => Self::Small,
            51..=100 => Self::Medium,
            101..=500 => Self::Large,
            _ => Self::Corporate,
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Corporate => "corporate",
        };
        f.pad(s)
    }
}

/// Review state of a company registration.
///
/// `Pending -> Approved` and `Pending -> Rejected` are the only transitions;
/// both targets are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyStatus {
    Pending,
    Approved { at: DateTime<Utc> },
    Rejected { reason: String, at: DateTime<Utc> },
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.pad("pending"),
            Self::Approved { .. } => f.pad("approved"),
            Self::Rejected { .. } => f.pad("rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyProfile {
    pub company_name: String,
    pub industry: String,
    pub company_size: CompanySize,
    pub status: CompanyStatus,
    pub logo_url: Option<String>,
    pub registration_documents: Vec<PathBuf>,
    pub description: String,
}

impl CompanyProfile {
    pub fn is_approved(&self) -> bool {
        matches!(self.status, CompanyStatus::Approved { .. })
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.status {
            CompanyStatus::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn approve(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            CompanyStatus::Pending => {
                self.status = CompanyStatus::Approved { at };
                Ok(())
            }
            ref other => Err(DomainError::transition("company", other, "approved")),
        }
    }

    /// The reason is stored as given; it only has to contain non-whitespace.
    pub fn reject(&mut self, reason: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "must not be empty"));
        }
        match self.status {
            CompanyStatus::Pending => {
                self.status = CompanyStatus::Rejected {
                    reason: reason.to_string(),
                    at,
                };
                Ok(())
            }
            ref other => Err(DomainError::transition("company", other, "rejected")),
        }
    }
}

/// Registration form submitted by a prospective company.
#[derive(Debug, Clone)]
pub struct CompanyRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub industry: String,
    pub employees: u32,
    pub logo_url: Option<String>,
    pub registration_documents: Vec<PathBuf>,
    pub description: String,
}

impl CompanyRegistration {
    /// Check the company-specific fields and build the pending profile.
    pub fn into_profile(self) -> DomainResult<CompanyProfile> {
        if self.company_name.trim().is_empty() {
            return Err(DomainError::validation("company_name", "must not be empty"));
        }
        if self.industry.trim().is_empty() {
            return Err(DomainError::validation("industry", "must not be empty"));
        }
        if self.registration_documents.is_empty() {
            return Err(DomainError::validation(
                "registration_documents",
                "at least one document is required",
            ));
        }
        Ok(CompanyProfile {
            company_name: self.company_name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            company_size: CompanySize::from_employees(self.employees),
            status: CompanyStatus::Pending,
            logo_url: self.logo_url,
            registration_documents: self.registration_documents,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> CompanyProfile {
        CompanyProfile {
            company_name: "Acme".into(),
            industry: "Software".into(),
            company_size: CompanySize::Small,
            status: CompanyStatus::Pending,
            logo_url: None,
            registration_documents: vec![PathBuf::from("tax.pdf")],
            description: String::new(),
        }
    }

    #[test]
    fn given_pending_company_when_approving_then_approved_and_terminal() {
        let mut company = pending();
        company.approve(Utc::now()).unwrap();
        assert!(company.is_approved());

        let err = company.reject("late", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert!(company.is_approved());
    }

    #[test]
    fn given_pending_company_when_rejecting_then_reason_kept() {
        let mut company = pending();
        company.reject("  missing tax card ", Utc::now()).unwrap();
        assert!(!company.is_approved());
        assert_eq!(company.rejection_reason(), Some("  missing tax card "));
        assert!(company.approve(Utc::now()).is_err());
    }

    #[test]
    fn given_blank_reason_when_rejecting_then_state_unchanged() {
        let mut company = pending();
        let err = company.reject("   ", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "reason", .. }));
        assert_eq!(company.status, CompanyStatus::Pending);
    }

    #[test]
    fn given_employee_counts_when_sizing_then_bands_match() {
        assert_eq!(CompanySize::from_employees(10), CompanySize::Small);
        assert_eq!(CompanySize::from_employees(51), CompanySize::Medium);
        assert_eq!(CompanySize::from_employees(500), CompanySize::Large);
        assert_eq!(CompanySize::from_employees(501), CompanySize::Corporate);
    }
}
