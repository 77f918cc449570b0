//! Tests for statistics collection and export.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use internhub::application::{DemoIds, Statistics, DEMO_PASSWORD};
use internhub::domain::{
    ApplicationForm, CompanyRegistration, Compensation, InternshipDraft, Period, ReportStatus,
    UserId,
};
use internhub::infrastructure::export::write_export;
use internhub::infrastructure::ServiceContainer;
use internhub::util::testing::{empty_container, seeded_container, test_now};

#[fixture]
fn demo() -> (ServiceContainer, DemoIds) {
    seeded_container()
}

#[rstest]
fn given_demo_store_when_collecting_then_totals_match_store(demo: (ServiceContainer, DemoIds)) {
    // Arrange
    let (container, _) = demo;

    // Act
    let stats = container.statistics();

    // Assert
    let t = &stats.totals;
    assert_eq!(t.students, 3);
    assert_eq!(t.faculty, 1);
    assert_eq!(t.companies, 4);
    assert_eq!(t.approved_companies, 2);
    assert_eq!(t.internships, container.repo.internships().len());
    assert_eq!(t.applications, container.repo.applications().len());
    assert_eq!(t.reports, 1);
    assert_eq!(t.workshops, 2);
    assert_eq!(stats.generated_at, test_now());
}

#[rstest]
fn given_demo_store_when_collecting_then_every_report_status_is_present(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;

    // Act
    let stats = container.statistics();

    // Assert
    for status in ReportStatus::ALL {
        assert!(stats.reports_by_status.contains_key(&status.to_string()));
    }
    assert_eq!(stats.reports_by_status["flagged"], 1);
    assert_eq!(stats.reports_by_status["pending"], 0);
}

#[rstest]
fn given_finalized_placement_when_collecting_then_company_ranks_first(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;

    // Act
    let stats = container.statistics();

    // Assert
    assert_eq!(stats.top_companies.len(), 1);
    assert_eq!(stats.top_companies[0].name, "Acme Software");
    assert_eq!(stats.top_companies[0].count, 1);
    assert_eq!(stats.courses.len(), 2);
    assert_eq!(stats.workshop_ratings.len(), 1);
    assert_eq!(stats.workshop_ratings[0].average, 5.0);
}

#[rstest]
fn given_two_companies_sharing_a_name_when_collecting_then_placements_stay_separate(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;
    let namesake = container
        .identity
        .register_company(CompanyRegistration {
            username: "acme-alex".into(),
            email: "hr@acme-alex.example.com".into(),
            password: DEMO_PASSWORD.into(),
            company_name: "Acme Software".into(),
            industry: "Technology".into(),
            employees: 30,
            logo_url: None,
            registration_documents: vec![PathBuf::from("docs/acme-alex-tax-card.pdf")],
            description: "Unrelated company with the same trade name.".into(),
        })
        .unwrap();
    container.companies.approve(ids.scad, namesake).unwrap();
    let posting = container
        .internships
        .post(
            namesake,
            InternshipDraft {
                title: "Support Engineering Intern".into(),
                description: "Triage customer tickets".into(),
                location: "Alexandria".into(),
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                period: Period::Months(2),
                compensation: Compensation::Unpaid,
                skills: vec!["Linux".into()],
            },
        )
        .unwrap();
    container.internships.approve(ids.scad, posting).unwrap();
    let application = container
        .applications
        .submit(
            ids.mariam,
            posting,
            ApplicationForm::with_cv("uploads/mariam-cv.pdf"),
        )
        .unwrap();
    container.applications.accept(namesake, application).unwrap();
    container.applications.finalize(namesake, application).unwrap();

    // Act
    let stats = container.statistics();

    // Assert
    let mut companies: Vec<UserId> = stats.top_companies.iter().map(|e| e.company).collect();
    companies.sort();
    let mut expected = vec![ids.acme, namesake];
    expected.sort();
    assert_eq!(companies, expected);
    assert!(stats
        .top_companies
        .iter()
        .all(|e| e.name == "Acme Software" && e.count == 1));
    let text = stats.render_text();
    assert!(text.contains(&format!("Acme Software ({})", ids.acme)));
    assert!(text.contains(&format!("Acme Software ({namesake})")));
}

#[rstest]
fn given_top_n_of_zero_when_collecting_then_no_companies_are_listed(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;

    // Act
    let stats = Statistics::collect(container.repo.as_ref(), test_now(), 0);

    // Assert
    assert!(stats.top_companies.is_empty());
    assert!(stats.render_text().contains("(none)"));
}

#[test]
fn given_empty_store_when_rendering_text_then_all_sections_are_present() {
    // Arrange
    let container = empty_container();

    // Act
    let text = container.statistics().render_text();

    // Assert
    assert!(text.starts_with("Internship statistics"));
    for section in [
        "Totals",
        "Reports by status",
        "Courses mentioned in reports",
        "Top companies by placements",
    ] {
        assert!(text.contains(section), "missing section {section}");
    }
    assert!(!text.contains("Workshop ratings"));
}

#[rstest]
fn given_statistics_when_exported_as_toml_then_file_parses_back(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;
    let dir = TempDir::new().unwrap();
    let rendered = container.statistics().to_toml().unwrap();

    // Act
    let path = write_export(dir.path(), Path::new("exports/stats.toml"), &rendered).unwrap();

    // Assert
    let content = fs::read_to_string(&path).unwrap();
    let value: toml::Value = toml::from_str(&content).unwrap();
    assert_eq!(value["totals"]["students"].as_integer(), Some(3));
    assert_eq!(value["reports_by_status"]["flagged"].as_integer(), Some(1));
}

#[rstest]
fn given_absolute_target_when_exporting_then_export_dir_is_ignored(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;
    let export_dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let target = elsewhere.path().join("stats.txt");

    // Act
    let path = write_export(
        export_dir.path(),
        &target,
        &container.statistics().render_text(),
    )
    .unwrap();

    // Assert
    assert_eq!(path, target);
    assert!(fs::read_dir(export_dir.path()).unwrap().next().is_none());
}
