//! Command-line interface parsing for the UM API client
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into the request the binary should run.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::client::{meetings_path, parse_date, RequestOptions};
use crate::error::ApiError;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A date argument could not be parsed
    #[error("Invalid date: '{0}'. Use YYYY-MM-DD or MM-DD-YYYY")]
    InvalidDate(String),

    /// The request could not be built from the arguments
    #[error(transparent)]
    InvalidRequest(#[from] ApiError),
}

/// UM API client - authenticated GET requests with cache fallback
#[derive(Parser, Debug)]
#[command(name = "umapi")]
#[command(about = "Query the U-M API gateway with OAuth2 client credentials")]
#[command(version)]
pub struct Cli {
    /// Log decisions (cache hits, token refreshes, fallbacks) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// GET a path and print the JSON response
    ///
    /// Examples:
    ///   umapi get /Curriculum/Classrooms/v1/Classrooms
    ///   umapi get /Facilities/v1/Buildings --no-cache
    Get {
        /// Path and query string
        path: String,

        /// Host to query instead of the default gateway
        #[arg(long)]
        host: Option<String>,

        /// Skip the response cache for this request
        #[arg(long)]
        no_cache: bool,
    },

    /// List a classroom's meetings between two dates
    ///
    /// Example:
    ///   umapi meetings AH1001 2026-01-05 2026-01-09
    Meetings {
        /// Facility identifier of the classroom
        facility_id: String,
        /// First day (YYYY-MM-DD or MM-DD-YYYY)
        start: String,
        /// Last day (YYYY-MM-DD or MM-DD-YYYY)
        end: String,
    },
}

/// Parses a date argument
///
/// # Returns
/// * `Ok(NaiveDate)` if the string is a valid date
/// * `Err(CliError::InvalidDate)` otherwise
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    parse_date(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl Command {
    /// Builds the request options this command runs
    pub fn to_request(&self) -> Result<RequestOptions, CliError> {
        match self {
            Command::Get {
                path,
                host,
                no_cache,
            } => {
                let mut options = RequestOptions::new(path.clone());
                options.host = host.clone();
                if *no_cache {
                    options.use_cache = Some(false);
                }
                Ok(options)
            }
            Command::Meetings {
                facility_id,
                start,
                end,
            } => {
                let start = parse_date_arg(start)?;
                let end = parse_date_arg(end)?;
                Ok(RequestOptions::new(meetings_path(facility_id, start, end)?))
            }
        }
    }
}
