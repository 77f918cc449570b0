//! internhub: internship management for students, faculty, companies and
//! the career office (SCAD).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
