//! Tests for CompanyService: approval lifecycle and recommendations.

use rstest::{fixture, rstest};

use internhub::application::services::CompanyFilter;
use internhub::application::{ApplicationResult, DemoIds};
use internhub::domain::{CompanyStatus, DomainError, Role};
use internhub::infrastructure::ServiceContainer;
use internhub::util::testing::seeded_container;

#[fixture]
fn demo() -> (ServiceContainer, DemoIds) {
    seeded_container()
}

fn domain_err<T: std::fmt::Debug>(result: ApplicationResult<T>) -> DomainError {
    result
        .expect_err("operation should fail")
        .domain()
        .cloned()
        .expect("a domain error")
}

// ============================================================
// approval
// ============================================================

#[rstest]
#[case("tax card is expired")]
#[case("  tax card is expired\n")]
fn given_pending_company_when_rejected_with_reason_then_reason_round_trips(
    demo: (ServiceContainer, DemoIds),
    #[case] reason: &str,
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    container
        .companies
        .reject(ids.scad, ids.pending_company, reason)
        .unwrap();

    // Assert
    let company = container.companies.company(ids.pending_company).unwrap();
    let profile = company.as_company().unwrap();
    assert!(!profile.is_approved());
    assert_eq!(profile.rejection_reason(), Some(reason));
    assert!(container
        .identity
        .unread_notifications(ids.pending_company)
        .unwrap()
        .iter()
        .any(|n| n.message.contains(reason.trim())));
}

#[rstest]
fn given_blank_reason_when_rejecting_then_fails_and_company_stays_pending(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let err = domain_err(
        container
            .companies
            .reject(ids.scad, ids.pending_company, "   "),
    );

    // Assert
    assert!(matches!(err, DomainError::Validation { field: "reason", .. }));
    let company = container.companies.company(ids.pending_company).unwrap();
    assert_eq!(company.as_company().unwrap().status, CompanyStatus::Pending);
}

#[rstest]
fn given_rejected_company_when_approving_then_transition_is_refused(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let err = domain_err(container.companies.approve(ids.scad, ids.rejected_company));

    // Assert
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
}

#[rstest]
#[case::faculty(true)]
#[case::company(false)]
fn given_non_scad_actor_when_approving_company_then_is_forbidden(
    demo: (ServiceContainer, DemoIds),
    #[case] use_faculty: bool,
) {
    // Arrange
    let (container, ids) = demo;
    let actor = if use_faculty { ids.faculty } else { ids.acme };

    // Act
    let err = domain_err(container.companies.approve(actor, ids.pending_company));

    // Assert
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[rstest]
fn given_mixed_statuses_when_listing_companies_then_only_approved_are_shown(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let listed: Vec<_> = container
        .companies
        .approved_companies(&CompanyFilter::default())
        .into_iter()
        .map(|u| u.id)
        .collect();

    // Assert
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&ids.acme));
    assert!(listed.contains(&ids.nile));
    for user in container.identity.users_with_role(Role::Company) {
        let approved = user.as_company().unwrap().is_approved();
        assert_eq!(listed.contains(&user.id), approved);
    }
}

#[rstest]
fn given_industry_filter_when_listing_companies_then_matches_case_insensitively(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;
    let filter = CompanyFilter {
        industry: Some("finance".into()),
        search: None,
    };

    // Act
    let listed = container.companies.approved_companies(&filter);

    // Assert
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, ids.nile);
}

// ============================================================
// recommend()
// ============================================================

#[rstest]
fn given_past_placement_when_recommending_twice_then_company_is_stored_once(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let first = container.companies.recommend(ids.omar, ids.acme).unwrap();
    let second = container.companies.recommend(ids.omar, ids.acme).unwrap();

    // Assert
    assert!(first);
    assert!(!second);
    let omar = container.identity.user(ids.omar).unwrap();
    let recommended = &omar.as_student().unwrap().recommended_companies;
    assert_eq!(recommended.iter().filter(|c| **c == ids.acme).count(), 1);
    assert_eq!(container.companies.recommendation_count(ids.acme), 1);
}

#[rstest]
fn given_finalized_application_when_recommending_then_succeeds(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let added = container.companies.recommend(ids.laila, ids.acme).unwrap();

    // Assert
    assert!(added);
    assert!(container.companies.has_interned_at(ids.laila, ids.acme).unwrap());
}

#[rstest]
fn given_no_internship_at_company_when_recommending_then_not_eligible(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let err = domain_err(container.companies.recommend(ids.mariam, ids.acme));

    // Assert
    assert!(matches!(err, DomainError::NotEligible { .. }));
    let mariam = container.identity.user(ids.mariam).unwrap();
    assert!(mariam.as_student().unwrap().recommended_companies.is_empty());
}

#[rstest]
fn given_rejected_application_when_checking_internship_history_then_does_not_count(
    demo: (ServiceContainer, DemoIds),
) {
    // Arrange
    let (container, ids) = demo;

    // Act
    let interned = container.companies.has_interned_at(ids.omar, ids.nile).unwrap();

    // Assert
    assert!(!interned);
}
