//! Job configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! parent_kind = "RtnAuth"
//! page_size = 1000
//! dry_run = false
//!
//! [rule]
//! subtype_a = "ItemRcpt"
//! subtype_b = "CustMemo"
//! max_per_parent = 1
//!
//! [exec]
//! sequential = false
//! threads = 4
//! ```

use crate::runner::{ExecMode, Runner};
use crate::store::DEFAULT_PAGE_SIZE;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_parent_kind")]
    pub parent_kind: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub rule: DedupRule,
    /// Flag duplicates without deleting anything.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub exec: ExecConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            parent_kind: default_parent_kind(),
            page_size: default_page_size(),
            rule: DedupRule::default(),
            dry_run: false,
            exec: ExecConfig::default(),
        }
    }
}

/// The at-most-N-per-parent rule for the two tracked subtypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRule {
    #[serde(default = "default_subtype_a")]
    pub subtype_a: String,
    #[serde(default = "default_subtype_b")]
    pub subtype_b: String,
    #[serde(default = "default_max_per_parent")]
    pub max_per_parent: u32,
}

impl Default for DedupRule {
    fn default() -> Self {
        Self {
            subtype_a: default_subtype_a(),
            subtype_b: default_subtype_b(),
            max_per_parent: default_max_per_parent(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub partitions: Option<usize>,
}

impl ExecConfig {
    #[must_use]
    pub fn runner(&self) -> Runner {
        let mode = if self.sequential {
            ExecMode::Sequential
        } else {
            ExecMode::Parallel {
                threads: self.threads,
                partitions: self.partitions,
            }
        };
        Runner {
            mode,
            ..Default::default()
        }
    }
}

fn default_parent_kind() -> String {
    "RtnAuth".to_string()
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_subtype_a() -> String {
    "ItemRcpt".to_string()
}

fn default_subtype_b() -> String {
    "CustMemo".to_string()
}

const fn default_max_per_parent() -> u32 {
    1
}

impl JobConfig {
    /// Reject settings that would make the job meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.parent_kind.trim().is_empty() {
            bail!("parent_kind must not be blank");
        }
        let rule = &self.rule;
        if rule.max_per_parent == 0 {
            bail!("rule.max_per_parent must be at least 1");
        }
        if rule.subtype_a.trim().is_empty() || rule.subtype_b.trim().is_empty() {
            bail!("rule subtypes must not be blank");
        }
        if rule.subtype_a == rule.subtype_b {
            bail!("rule.subtype_a and rule.subtype_b must differ (both are {:?})", rule.subtype_a);
        }
        if self.exec.threads == Some(0) || self.exec.partitions == Some(0) {
            bail!("exec.threads and exec.partitions must be at least 1 when set");
        }
        Ok(())
    }

    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        use anyhow::Context;
        let cfg = toml::from_str::<Self>(content).context("Failed to parse job config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file; a missing file yields the defaults.
    #[cfg(feature = "config-toml")]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        use anyhow::Context;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to load {}", path.display()))
    }
}
