//! Command handlers
//!
//! Each handler builds its output from the services in a [`ServiceContainer`].

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{CompanyFilter, ListingFilter};
use crate::cli::args::{Cli, Commands, ConfigCommands, ExportFormat};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{
    ApplicationStatus, Compensation, Internship, InternshipId, ReportStatus, Role, User,
};
use crate::infrastructure::export::write_export;
use crate::infrastructure::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Config { command }) => return _config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        None => {
            output::hint("no command given, try --help");
            return Ok(());
        }
        Some(_) => {}
    }

    let mut settings = Settings::load()?;
    if cli.no_seed {
        settings.seed_demo_data = false;
    }
    let container = ServiceContainer::new(settings);
    container.seed()?;
    run(&container, cli)
}

/// Dispatch a store-backed command against an already prepared container.
pub fn run(container: &ServiceContainer, cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Login { username, password }) => _login(container, username, password),
        Some(Commands::Companies {
            pending,
            industry,
            search,
        }) => _companies(container, *pending, industry.clone(), search.clone()),
        Some(Commands::Internships { pending: true, .. }) => _pending_internships(container),
        Some(Commands::Internships {
            pending: false,
            industry,
            paid,
            unpaid,
            duration,
            search,
        }) => {
            let paid = match (paid, unpaid) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            _internships(
                container,
                ListingFilter {
                    industry: industry.clone(),
                    paid,
                    duration_months: *duration,
                    search: search.clone(),
                },
            )
        }
        Some(Commands::Applications { student }) => _applications(container, student),
        Some(Commands::Applicants { internship }) => {
            _applicants(container, InternshipId(*internship))
        }
        Some(Commands::Suggest { student, limit }) => _suggest(container, student, *limit),
        Some(Commands::Workshops { upcoming }) => _workshops(container, *upcoming),
        Some(Commands::Reports { status }) => _reports(container, *status),
        Some(Commands::Stats { format, output }) => {
            _stats(container, *format, output.as_deref())
        }
        Some(Commands::Overview) => _overview(container),
        Some(Commands::Config { command }) => _config(command),
        Some(Commands::Completion { .. }) | None => Ok(()),
    }
}

fn student_by_username(container: &ServiceContainer, username: &str) -> CliResult<User> {
    let user = container
        .repo
        .user_by_username(username)
        .ok_or_else(|| CliError::Usage(format!("no user named '{username}'")))?;
    if user.role() != Role::Student {
        return Err(CliError::Usage(format!(
            "'{username}' is a {} account, not a student",
            user.role()
        )));
    }
    Ok(user)
}

fn company_name(container: &ServiceContainer, internship: &Internship) -> String {
    container
        .repo
        .user(internship.company)
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| internship.company.to_string())
}

fn compensation(internship: &Internship) -> String {
    match internship.compensation {
        Compensation::Unpaid => "unpaid".to_string(),
        Compensation::Paid { monthly_salary } => format!("{monthly_salary:.0}/month"),
    }
}

#[instrument(skip(container, password))]
fn _login(container: &ServiceContainer, username: &str, password: &str) -> CliResult<()> {
    let user = container.identity.authenticate(username, password)?;
    output::success(&format!("logged in as {} ({})", user.display_name(), user.role()));
    let unread = container.identity.unread_notifications(user.id)?;
    if unread.is_empty() {
        output::detail("no unread notifications");
        return Ok(());
    }
    output::header(&format!("{} unread notification(s)", unread.len()));
    for note in &unread {
        output::detail(&format!("{}  {}", note.at.format("%Y-%m-%d %H:%M"), note.message));
    }
    container.identity.mark_all_as_read(user.id)?;
    Ok(())
}

#[instrument(skip(container))]
fn _companies(
    container: &ServiceContainer,
    pending: bool,
    industry: Option<String>,
    search: Option<String>,
) -> CliResult<()> {
    let companies = if pending {
        output::header("Companies awaiting review");
        container.companies.pending_companies()
    } else {
        output::header("Approved companies");
        container
            .companies
            .approved_companies(&CompanyFilter { industry, search })
    };
    if companies.is_empty() {
        output::detail("(none)");
    }
    for user in &companies {
        let Some(profile) = user.as_company() else {
            continue;
        };
        output::detail(&format!(
            "{:<8} {:<20} {:<12} {:<10} {} recommendation(s)",
            user.id,
            profile.company_name,
            profile.industry,
            profile.company_size,
            container.companies.recommendation_count(user.id)
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _internships(container: &ServiceContainer, filter: ListingFilter) -> CliResult<()> {
    let listings = container.internships.listings(&filter);
    debug!("{} listings match", listings.len());
    output::header(&format!("{} internship(s)", listings.len()));
    for internship in &listings {
        output::action(
            &internship.id.to_string(),
            &format!(
                "{} at {}",
                internship.title,
                company_name(container, internship)
            ),
        );
        let remote = if internship.is_remote() { ", remote" } else { "" };
        output::detail(&format!(
            "{}{}, {} month(s) from {}, {}",
            internship.location,
            remote,
            internship.duration_months(),
            internship.start_date,
            compensation(internship)
        ));
        if !internship.skills.is_empty() {
            let skills: Vec<&str> = internship.skills.iter().map(String::as_str).collect();
            output::hint(&format!("skills: {}", skills.join(", ")));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _pending_internships(container: &ServiceContainer) -> CliResult<()> {
    let queue = container.internships.pending();
    output::header(&format!("{} internship(s) awaiting review", queue.len()));
    for internship in &queue {
        output::detail(&format!(
            "{:<8} {} at {}, posted {}",
            internship.id,
            internship.title,
            company_name(container, internship),
            internship.created_at.format("%Y-%m-%d")
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _applications(container: &ServiceContainer, student: &str) -> CliResult<()> {
    let user = student_by_username(container, student)?;
    let applications = container.applications.applications_of(user.id);
    output::header(&format!(
        "Applications of {} ({})",
        user.display_name(),
        applications.len()
    ));
    for application in &applications {
        let title = container
            .internships
            .internship(application.internship)
            .map(|i| format!("{} at {}", i.title, company_name(container, &i)))
            .unwrap_or_else(|_| application.internship.to_string());
        output::detail(&format!(
            "{:<8} {:<10} {}  (submitted {})",
            application.id,
            application.status,
            title,
            application.submitted_at.format("%Y-%m-%d")
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _applicants(container: &ServiceContainer, internship: InternshipId) -> CliResult<()> {
    let posting = container.internships.internship(internship)?;
    let applicants = container.applications.applicants_of(internship);
    output::header(&format!(
        "Applicants for {} ({})",
        posting.title,
        applicants.len()
    ));
    for application in &applicants {
        let name = container
            .repo
            .user(application.student)
            .map(|u| u.username)
            .unwrap_or_else(|| application.student.to_string());
        output::detail(&format!(
            "{:<8} {:<12} {}",
            application.id, name, application.status
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _suggest(container: &ServiceContainer, student: &str, limit: Option<usize>) -> CliResult<()> {
    let user = student_by_username(container, student)?;
    let limit = limit.unwrap_or(container.settings.suggestion_limit);
    let suggestions = container.internships.suggestions(user.id, limit)?;
    output::header(&format!("Suggestions for {}", user.display_name()));
    if suggestions.is_empty() {
        output::detail("(none)");
    }
    for suggestion in &suggestions {
        output::action(
            &suggestion.internship.id.to_string(),
            &format!(
                "{} at {}",
                suggestion.internship.title, suggestion.company_name
            ),
        );
        output::hint(&format!(
            "matches: {}; recommended by {} student(s)",
            if suggestion.matched_interests.is_empty() {
                "-".to_string()
            } else {
                suggestion.matched_interests.join(", ")
            },
            suggestion.recommendations
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _workshops(container: &ServiceContainer, upcoming: bool) -> CliResult<()> {
    let workshops = if upcoming {
        container.workshops.upcoming(container.clock.today())
    } else {
        container.workshops.list()
    };
    output::header(&format!("{} workshop(s)", workshops.len()));
    for workshop in &workshops {
        let delivery = if workshop.delivery.is_live() {
            "live"
        } else {
            "recorded"
        };
        let rating = workshop
            .average_rating()
            .map(|r| format!("{r:.1}/5 from {}", workshop.ratings.len()))
            .unwrap_or_else(|| "unrated".to_string());
        output::action(&workshop.id.to_string(), &workshop.title);
        output::detail(&format!(
            "{} {} ({} min, {}), {} registered, {}",
            workshop.start_date,
            workshop.start_time.format("%H:%M"),
            workshop.duration_minutes,
            delivery,
            workshop.registered.len(),
            rating
        ));
        output::hint(&format!(
            "speaker: {}, {}",
            workshop.speaker.name, workshop.speaker.title
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _reports(container: &ServiceContainer, status: Option<ReportStatus>) -> CliResult<()> {
    let reports = match status {
        Some(status) => container.reports.by_status(status),
        None => container.reports.all(),
    };
    output::header(&format!("{} report(s)", reports.len()));
    for report in &reports {
        let author = container
            .repo
            .user(report.student)
            .map(|u| u.username)
            .unwrap_or_else(|| report.student.to_string());
        output::detail(&format!(
            "{:<8} {:<9} {:<10} {}",
            report.id, report.status, author, report.title
        ));
        for comment in &report.comments {
            output::hint(&format!("comment: {}", comment.content));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _stats(
    container: &ServiceContainer,
    format: ExportFormat,
    target: Option<&std::path::Path>,
) -> CliResult<()> {
    let statistics = container.statistics();
    let rendered = match format {
        ExportFormat::Text => statistics.render_text(),
        ExportFormat::Toml => statistics.to_toml()?,
    };
    match target {
        Some(target) => {
            let path = write_export(&container.settings.export_dir, target, &rendered)?;
            output::action("Exported", &path.display());
        }
        None => output::info(rendered.trim_end()),
    }
    Ok(())
}

/// Build the company -> internship -> applicant tree.
pub fn overview_tree(container: &ServiceContainer) -> Tree<String> {
    let mut root = Tree::new("internhub".to_string());
    let mut companies: Vec<User> = container.identity.users_with_role(Role::Company);
    companies.sort_by(|a, b| a.display_name().cmp(b.display_name()));

    for company in companies {
        let status = company
            .as_company()
            .map(|c| c.status.to_string())
            .unwrap_or_default();
        let mut company_node = Tree::new(format!("{} [{}]", company.display_name(), status));
        for internship in container.internships.posted_by(company.id) {
            let mut internship_node = Tree::new(format!(
                "{} {} [{}]",
                internship.id, internship.title, internship.status
            ));
            for application in container.applications.applicants_of(internship.id) {
                let name = container
                    .repo
                    .user(application.student)
                    .map(|u| u.username)
                    .unwrap_or_else(|| application.student.to_string());
                let marker = if application.status == ApplicationStatus::Finalized {
                    " *"
                } else {
                    ""
                };
                internship_node.push(Tree::new(format!(
                    "{name} ({}){marker}",
                    application.status
                )));
            }
            company_node.push(internship_node);
        }
        root.push(company_node);
    }
    root
}

#[instrument(skip(container))]
fn _overview(container: &ServiceContainer) -> CliResult<()> {
    output::info(&overview_tree(container));
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not created" };
                output::info(&format!("{} ({state})", path.display()));
            }
            None => output::warning("no home directory, global config unavailable"),
        },
    }
    Ok(())
}
