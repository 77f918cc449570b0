//! Demo dataset used by the CLI and by tests.
//!
//! Everything is created through the services, so the seeded state obeys
//! the same rules as state produced by real use.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::debug;

use crate::application::services::{
    ApplicationService, CompanyService, IdentityService, InternshipService, ReportService,
    WorkshopService,
};
use crate::application::ApplicationResult;
use crate::domain::{
    ApplicationForm, Compensation, CompanyRegistration, Delivery, InternshipDraft, InternshipId,
    PastInternship, Period, ReportDraft, ReportStatus, Speaker, StudentRegistration, UserId,
    WorkshopDraft, WorkshopId,
};
use crate::infrastructure::traits::{Clock, Repository};

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "internhub-demo";

/// Ids of the seeded entities, for tests and examples.
#[derive(Debug, Clone)]
pub struct DemoIds {
    pub scad: UserId,
    pub faculty: UserId,
    pub acme: UserId,
    pub nile: UserId,
    pub pending_company: UserId,
    pub rejected_company: UserId,
    pub mariam: UserId,
    pub omar: UserId,
    pub laila: UserId,
    pub backend: InternshipId,
    pub data: InternshipId,
    pub marketing: InternshipId,
    pub unreviewed: InternshipId,
    pub cv_clinic: WorkshopId,
    pub interviews: WorkshopId,
}

fn documents(name: &str) -> Vec<PathBuf> {
    vec![PathBuf::from(format!("docs/{name}-tax-card.pdf"))]
}

fn company(username: &str, name: &str, industry: &str, employees: u32) -> CompanyRegistration {
    CompanyRegistration {
        username: username.into(),
        email: format!("hr@{username}.example.com"),
        password: DEMO_PASSWORD.into(),
        company_name: name.into(),
        industry: industry.into(),
        employees,
        logo_url: Some(format!("https://{username}.example.com/logo.png")),
        registration_documents: documents(username),
        description: format!("{name} is a {industry} company."),
    }
}

fn student(
    username: &str,
    major: &str,
    gpa: f32,
    semester: u8,
    interests: &[&str],
) -> StudentRegistration {
    StudentRegistration {
        username: username.into(),
        email: format!("{username}@student.example.edu"),
        password: DEMO_PASSWORD.into(),
        major: major.into(),
        gpa,
        semester_number: semester,
        interests: interests.iter().map(|s| s.to_string()).collect(),
    }
}

fn posting(
    title: &str,
    location: &str,
    start: NaiveDate,
    months: u32,
    compensation: Compensation,
    skills: &[&str],
) -> InternshipDraft {
    InternshipDraft {
        title: title.into(),
        description: format!("{title} working with an experienced team."),
        location: location.into(),
        start_date: start,
        period: Period::Months(months),
        compensation,
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

/// Populate an empty repository with a small, consistent dataset.
pub fn seed_demo_data(
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
    min_password_len: usize,
) -> ApplicationResult<DemoIds> {
    debug!("seed_demo_data");
    // demo accounts share a fixed password, so a stricter policy cannot apply to them
    let password_policy = min_password_len.min(DEMO_PASSWORD.len());
    let identity = IdentityService::new(repo.clone(), clock.clone(), password_policy);
    let companies = CompanyService::new(repo.clone(), clock.clone());
    let internships = InternshipService::new(repo.clone(), clock.clone());
    let applications = ApplicationService::new(repo.clone(), clock.clone());
    let reports = ReportService::new(repo.clone(), clock.clone());
    let workshops = WorkshopService::new(repo.clone(), clock.clone());
    let today = clock.today();
    let in_days = |d: u64| today.checked_add_days(Days::new(d)).unwrap_or(today);
    let days_ago = |d: u64| today.checked_sub_days(Days::new(d)).unwrap_or(today);

    let scad = identity.register_scad(
        "scad",
        "scad@uni.example.edu",
        DEMO_PASSWORD,
        "Career Services Office",
    )?;
    let faculty = identity.register_faculty(
        "dr.hassan",
        "hassan@uni.example.edu",
        DEMO_PASSWORD,
        "Media Engineering and Technology",
    )?;

    let acme = identity.register_company(company("acme", "Acme Software", "Technology", 240))?;
    let nile = identity.register_company(company("nile", "Nile Analytics", "Finance", 45))?;
    let pending_company =
        identity.register_company(company("delta", "Delta Media", "Marketing", 80))?;
    let rejected_company =
        identity.register_company(company("shadycorp", "Shady Corp", "Retail", 12))?;
    companies.approve(scad, acme)?;
    companies.approve(scad, nile)?;
    companies.reject(scad, rejected_company, "registration documents could not be verified")?;

    let mariam = identity.register_student(student(
        "mariam",
        "Computer Science",
        3.6,
        6,
        &["rust", "backend", "technology"],
    ))?;
    let omar = identity.register_student(student(
        "omar",
        "Business Informatics",
        2.9,
        8,
        &["sql", "finance"],
    ))?;
    let laila = identity.register_student(student(
        "laila",
        "Digital Media",
        3.1,
        4,
        &["design", "marketing"],
    ))?;
    identity.set_pro_status(scad, mariam, true)?;

    // omar interned at Acme before the platform existed
    let mut historical = repo.user(omar).ok_or(crate::domain::DomainError::NotFound {
        entity: "user",
        id: omar.get(),
    })?;
    if let Some(profile) = historical.as_student_mut() {
        profile.past_internships.push(PastInternship {
            company: acme,
            title: "Summer Support Intern".into(),
            start_date: days_ago(400),
            end_date: days_ago(340),
        });
    }
    repo.update_user(historical)?;

    let backend = internships.post(
        acme,
        posting(
            "Backend Engineering Intern",
            "Cairo",
            in_days(30),
            3,
            Compensation::Paid {
                monthly_salary: 8000.0,
            },
            &["Rust", "PostgreSQL", "Backend"],
        ),
    )?;
    let data = internships.post(
        nile,
        posting(
            "Data Analyst Intern",
            "Remote",
            in_days(14),
            2,
            Compensation::Unpaid,
            &["SQL", "Python", "Finance"],
        ),
    )?;
    let marketing = internships.post(
        acme,
        posting(
            "Product Marketing Intern",
            "Alexandria (hybrid)",
            days_ago(120),
            3,
            Compensation::Paid {
                monthly_salary: 5000.0,
            },
            &["Marketing", "Design"],
        ),
    )?;
    let unreviewed = internships.post(
        nile,
        posting(
            "Risk Modelling Intern",
            "Cairo",
            in_days(60),
            6,
            Compensation::Paid {
                monthly_salary: 9000.0,
            },
            &["Statistics"],
        ),
    )?;
    internships.approve(faculty, backend)?;
    internships.approve(scad, data)?;
    internships.approve(scad, marketing)?;

    let form = |who: &str| ApplicationForm::with_cv(format!("uploads/{who}-cv.pdf"));
    applications.submit(mariam, backend, form("mariam"))?;
    let omar_data = applications.submit(omar, data, form("omar"))?;
    let laila_marketing = applications.submit(laila, marketing, form("laila"))?;
    applications.reject(nile, omar_data)?;
    applications.accept(acme, laila_marketing)?;
    applications.finalize(acme, laila_marketing)?;

    let report = reports.submit(
        laila,
        ReportDraft {
            internship: marketing,
            title: "Launching a product campaign".into(),
            introduction: "Three months in the Acme marketing team.".into(),
            body: "Planned and ran the spring campaign.".into(),
            courses: vec!["Marketing Fundamentals".into(), "Visual Communication".into()],
        },
    )?;
    reports.review(faculty, report, ReportStatus::Flagged, Some("Add a weekly log"))?;

    let speaker = |name: &str, title: &str| Speaker {
        name: name.into(),
        title: title.into(),
        bio: format!("{name} has mentored students for a decade."),
        email: format!("{}@speakers.example.com", name.to_lowercase().replace(' ', ".")),
        expertise: vec!["Careers".into()],
        achievements: vec![],
        experience: "10 years".into(),
    };
    let cv_clinic = workshops.create(
        scad,
        WorkshopDraft {
            title: "CV Clinic".into(),
            description: "Hands-on review of student CVs.".into(),
            speaker: speaker("Salma Adel", "Talent Lead"),
            start_date: in_days(7),
            end_date: in_days(7),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            duration_minutes: 90,
            agenda: vec!["Common mistakes".into(), "Live reviews".into()],
            delivery: Delivery::Live,
        },
    )?;
    let interviews = workshops.create(
        scad,
        WorkshopDraft {
            title: "Acing Technical Interviews".into(),
            description: "Recorded session on interview preparation.".into(),
            speaker: speaker("Karim Nabil", "Engineering Manager"),
            start_date: days_ago(20),
            end_date: days_ago(20),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            duration_minutes: 60,
            agenda: vec!["Problem solving".into(), "System design".into()],
            delivery: Delivery::Recorded {
                recording_url: "https://videos.example.com/interviews".into(),
            },
        },
    )?;
    workshops.register(mariam, interviews)?;
    workshops.rate(mariam, interviews, 5, "Very practical")?;

    Ok(DemoIds {
        scad,
        faculty,
        acme,
        nile,
        pending_company,
        rejected_company,
        mariam,
        omar,
        laila,
        backend,
        data,
        marketing,
        unreviewed,
        cv_clinic,
        interviews,
    })
}
