//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use unified_api::{Filter, PageArguments};

use crate::cli::{ListArgs, PageArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read and parse a JSON request body file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// `None` when neither `--offset` nor `--limit` was given.
pub fn page_arguments(args: &PageArgs) -> Option<PageArguments> {
    if args.offset.is_none() && args.limit.is_none() {
        return None;
    }
    Some(PageArguments {
        offset: args.offset.unwrap_or(0),
        limit: args.limit.unwrap_or(0),
    })
}

pub fn filter(args: &ListArgs) -> Option<Filter> {
    args.filter.as_deref().map(Filter::from)
}
