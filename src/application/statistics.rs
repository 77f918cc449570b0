//! Aggregate statistics and their plain-text / TOML export.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ApplicationStatus, ReportStatus, Role, UserId};
use crate::infrastructure::traits::Repository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub students: usize,
    pub faculty: usize,
    pub companies: usize,
    pub approved_companies: usize,
    pub internships: usize,
    pub applications: usize,
    pub reports: usize,
    pub workshops: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

/// Finalized placements of one company. Names are not unique, ids are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyPlacements {
    pub company: UserId,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopScore {
    pub title: String,
    pub average: f64,
    pub ratings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub generated_at: DateTime<Utc>,
    pub totals: Totals,
    /// Every status is present, with zero when unused.
    pub reports_by_status: BTreeMap<String, usize>,
    pub courses: Vec<CountEntry>,
    pub top_companies: Vec<CompanyPlacements>,
    pub workshop_ratings: Vec<WorkshopScore>,
}

impl Statistics {
    /// Snapshot the repository.
    ///
    /// `top_companies` keeps the `top_n` companies with the most finalized
    /// placements.
    pub fn collect(repo: &dyn Repository, generated_at: DateTime<Utc>, top_n: usize) -> Self {
        let users = repo.users();
        let internships = repo.internships();
        let applications = repo.applications();
        let reports = repo.reports();
        let workshops = repo.workshops();

        let role_count = |role: Role| users.iter().filter(|u| u.role() == role).count();
        let totals = Totals {
            students: role_count(Role::Student),
            faculty: role_count(Role::Faculty),
            companies: role_count(Role::Company),
            approved_companies: users
                .iter()
                .filter_map(|u| u.as_company())
                .filter(|c| c.is_approved())
                .count(),
            internships: internships.len(),
            applications: applications.len(),
            reports: reports.len(),
            workshops: workshops.len(),
        };

        let mut reports_by_status: BTreeMap<String, usize> = ReportStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for report in &reports {
            *reports_by_status.entry(report.status.to_string()).or_default() += 1;
        }

        let courses = ranked(
            reports.iter().flat_map(|r| r.courses.iter().cloned()),
            usize::MAX,
        );

        let top_companies = applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Finalized)
            .filter_map(|a| internships.iter().find(|i| i.id == a.internship))
            .map(|i| i.company)
            .counts()
            .into_iter()
            .map(|(company, count)| CompanyPlacements {
                company,
                name: users
                    .iter()
                    .find(|u| u.id == company)
                    .map_or_else(|| company.to_string(), |u| u.display_name().to_string()),
                count,
            })
            .sorted_by_key(|e| (Reverse(e.count), e.name.clone(), e.company))
            .take(top_n)
            .collect();

        let workshop_ratings = workshops
            .iter()
            .filter_map(|w| {
                w.average_rating().map(|average| WorkshopScore {
                    title: w.title.clone(),
                    average,
                    ratings: w.ratings.len(),
                })
            })
            .sorted_by(|a, b| b.average.total_cmp(&a.average).then(a.title.cmp(&b.title)))
            .collect();

        Self {
            generated_at,
            totals,
            reports_by_status,
            courses,
            top_companies,
            workshop_ratings,
        }
    }

    /// Plain-text export.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let t = &self.totals;
        let _ = writeln!(out, "Internship statistics");
        let generated = self.generated_at.format("%Y-%m-%d %H:%M UTC");
        let _ = writeln!(out, "Generated: {generated}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Totals");
        let _ = writeln!(out, "  students:      {}", t.students);
        let _ = writeln!(out, "  faculty:       {}", t.faculty);
        let _ = writeln!(
            out,
            "  companies:     {} ({} approved)",
            t.companies, t.approved_companies
        );
        let _ = writeln!(out, "  internships:   {}", t.internships);
        let _ = writeln!(out, "  applications:  {}", t.applications);
        let _ = writeln!(out, "  reports:       {}", t.reports);
        let _ = writeln!(out, "  workshops:     {}", t.workshops);
        let _ = writeln!(out);
        let _ = writeln!(out, "Reports by status");
        for (status, count) in &self.reports_by_status {
            let _ = writeln!(out, "  {status:<10} {count}");
        }
        let courses = self.courses.iter().map(|e| (e.count, e.name.clone()));
        write_section(&mut out, "Courses mentioned in reports", courses);
        let companies = self
            .top_companies
            .iter()
            .map(|e| (e.count, format!("{} ({})", e.name, e.company)));
        write_section(&mut out, "Top companies by placements", companies);
        if !self.workshop_ratings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Workshop ratings");
            for w in &self.workshop_ratings {
                let _ = writeln!(out, "  {:.1}  {} ({} ratings)", w.average, w.title, w.ratings);
            }
        }
        out
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize statistics".into(),
            source: Box::new(e),
        })
    }
}

fn write_section(out: &mut String, title: &str, rows: impl Iterator<Item = (usize, String)>) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let mut rows = rows.peekable();
    if rows.peek().is_none() {
        let _ = writeln!(out, "  (none)");
    }
    for (count, label) in rows {
        let _ = writeln!(out, "  {count:>3}  {label}");
    }
}

/// Count occurrences, most frequent first, ties by name.
fn ranked(names: impl Iterator<Item = String>, limit: usize) -> Vec<CountEntry> {
    names
        .counts()
        .into_iter()
        .map(|(name, count)| CountEntry { name, count })
        .sorted_by_key(|e| (Reverse(e.count), e.name.clone()))
        .take(limit)
        .collect()
}
