//! Domain layer: entities and business rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every operation here works on a single entity; cross-entity rules live in
//! the application services.

pub mod application;
pub mod company;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod internship;
pub mod report;
pub mod user;
pub mod workshop;

pub use application::{Application, ApplicationForm, ApplicationStatus, Attachments};
pub use company::{CompanyProfile, CompanyRegistration, CompanySize, CompanyStatus};
pub use credentials::PasswordHash;
pub use error::{DomainError, DomainResult};
pub use ids::{ApplicationId, InternshipId, ReportId, UserId, WorkshopId};
pub use internship::{
    months_between, normalize_tags, Compensation, Internship, InternshipDraft, Period,
    ReviewStatus,
};
pub use report::{Report, ReportDraft, ReportStatus, ReviewComment};
pub use user::{
    validate_identity, Account, FacultyProfile, Notification, PastInternship, ProfileView, Role,
    ScadProfile, StudentProfile, StudentRegistration, User, WorkshopCertificate,
};
pub use workshop::{
    ChatMessage, Delivery, Rating, Speaker, Workshop, WorkshopDraft, WorkshopNote, WorkshopRating,
};
