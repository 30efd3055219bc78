//! Parent-ID parameter sources.
//!
//! Every source yields the raw newline-separated list; [`parse_parent_ids`]
//! turns it into the query set.

use crate::record::ParentId;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;

pub trait ParameterSource {
    /// Raw, newline-separated parent identifiers.
    fn raw_parent_ids(&self) -> Result<String>;
}

/// Trim each line, drop blank lines, and deduplicate keeping first-seen order.
#[must_use]
pub fn parse_parent_ids(raw: &str) -> Vec<ParentId> {
    let mut seen = HashSet::new();
    raw.lines()
        .filter_map(ParentId::parse)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// An in-memory list, e.g. already fetched by the caller.
#[derive(Clone, Debug, Default)]
pub struct StaticParams(pub String);

impl StaticParams {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self(joined)
    }
}

impl ParameterSource for StaticParams {
    fn raw_parent_ids(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A text file with one parent identifier per line.
#[derive(Clone, Debug)]
pub struct FileParams(pub PathBuf);

impl ParameterSource for FileParams {
    fn raw_parent_ids(&self) -> Result<String> {
        std::fs::read_to_string(&self.0)
            .with_context(|| format!("Failed to read parent ids from {}", self.0.display()))
    }
}

/// An environment variable holding the list.
#[derive(Clone, Debug)]
pub struct EnvParams(pub String);

impl ParameterSource for EnvParams {
    fn raw_parent_ids(&self) -> Result<String> {
        std::env::var(&self.0).with_context(|| format!("Environment variable {} is not set", self.0))
    }
}
