//! Tests for CLI parsing, dispatch and the overview tree.

use clap::Parser;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use internhub::application::{DemoIds, DEMO_PASSWORD};
use internhub::cli::args::Cli;
use internhub::cli::commands::{overview_tree, run};
use internhub::cli::CliError;
use internhub::exitcode;
use internhub::infrastructure::ServiceContainer;
use internhub::util::testing::seeded_container;

#[fixture]
fn demo() -> (ServiceContainer, DemoIds) {
    seeded_container()
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["internhub"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("valid arguments")
}

#[rstest]
#[case(&["companies"])]
#[case(&["companies", "--pending"])]
#[case(&["internships", "--paid", "--duration", "3"])]
#[case(&["internships", "--pending"])]
#[case(&["applications", "mariam"])]
#[case(&["suggest", "mariam", "--limit", "2"])]
#[case(&["workshops", "--upcoming"])]
#[case(&["reports", "--status", "flagged"])]
#[case(&["stats", "--format", "toml"])]
#[case(&["overview"])]
fn given_read_only_command_when_run_against_demo_store_then_succeeds(
    demo: (ServiceContainer, DemoIds),
    #[case] args: &[&str],
) {
    // Arrange
    let (container, _) = demo;
    let cli = parse(args);

    // Act
    let result = run(&container, &cli);

    // Assert
    assert!(result.is_ok(), "{args:?} failed: {result:?}");
}

#[rstest]
fn given_internship_id_when_listing_applicants_then_succeeds(demo: (ServiceContainer, DemoIds)) {
    // Arrange
    let (container, ids) = demo;
    let cli = parse(&["applicants", &ids.backend.to_string()]);

    // Act
    let result = run(&container, &cli);

    // Assert
    assert!(result.is_ok());
}

#[rstest]
fn given_valid_login_when_run_then_notifications_are_marked_read(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;
    let cli = parse(&["login", "acme", DEMO_PASSWORD]);

    // Act
    run(&container, &cli).unwrap();

    // Assert
    assert!(container
        .identity
        .unread_notifications(ids.acme)
        .unwrap()
        .is_empty());
}

#[rstest]
fn given_wrong_password_when_login_then_exits_with_noperm(demo: (ServiceContainer, DemoIds)) {
    // Arrange
    let (container, _) = demo;
    let cli = parse(&["login", "acme", "wrong-password"]);

    // Act
    let err = run(&container, &cli).expect_err("login must fail");

    // Assert
    assert_eq!(err.exit_code(), exitcode::NOPERM);
}

#[rstest]
fn given_non_student_username_when_listing_applications_then_usage_error(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;
    let cli = parse(&["applications", "acme"]);

    // Act
    let err = run(&container, &cli).expect_err("company is not a student");

    // Assert
    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[rstest]
fn given_unknown_internship_when_listing_applicants_then_exits_with_noinput(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;
    let cli = parse(&["applicants", "int-9999"]);

    // Act
    let err = run(&container, &cli).expect_err("unknown internship");

    // Assert
    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[rstest]
fn given_output_file_when_exporting_stats_then_file_is_written(demo: (ServiceContainer, DemoIds)) {
    // Arrange
    let (container, _) = demo;
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("stats.txt");
    let cli = parse(&["stats", "--output", target.to_str().unwrap()]);

    // Act
    run(&container, &cli).unwrap();

    // Assert
    let content = std::fs::read_to_string(&target).unwrap();
    assert!(content.starts_with("Internship statistics"));
}

#[rstest]
fn given_demo_store_when_building_overview_then_tree_nests_applicants_under_postings(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, _) = demo;

    // Act
    let rendered = overview_tree(&container).to_string();

    // Assert
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "internhub");
    let acme = lines
        .iter()
        .position(|l| l.contains("Acme Software [approved]"))
        .expect("acme node");
    let marketing = lines
        .iter()
        .position(|l| l.contains("Product Marketing Intern"))
        .expect("marketing node");
    let laila = lines
        .iter()
        .position(|l| l.contains("laila (finalized) *"))
        .expect("laila node");
    assert!(acme < marketing && marketing < laila);
    assert!(rendered.contains("Shady Corp [rejected]"));
}
