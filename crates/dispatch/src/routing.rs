//! Ownership-based routing of changed paths to pipelines.
//!
//! An [`OwnershipTable`] lists which path prefixes belong to which pipelines,
//! plus a set of shared prefixes. A change under a shared prefix is a change to
//! a dependency of every pipeline, so it selects every pipeline in the table.
//!
//! Prefix matching is plain `starts_with` on the repository-relative path.
//! Include the trailing `/` in a prefix to match a directory only.

use serde::{Deserialize, Serialize};

use crate::{ChangeSet, PipelineName, PipelineSelection, RoutingConfigError};

/// Maps one path prefix to the pipelines that own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipRule {
    prefix: String,
    pipelines: Vec<PipelineName>,
}

impl OwnershipRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Fails if the prefix is empty or no pipeline is named.
    pub fn new(
        prefix: impl Into<String>,
        pipelines: impl IntoIterator<Item = PipelineName>,
    ) -> Result<Self, RoutingConfigError> {
        let prefix = prefix.into();
        let pipelines: Vec<PipelineName> = pipelines.into_iter().collect();
        if prefix.is_empty() {
            return Err(RoutingConfigError::EmptyPrefix);
        }
        if pipelines.is_empty() {
            return Err(RoutingConfigError::NoPipelines { prefix });
        }
        Ok(Self { prefix, pipelines })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn pipelines(&self) -> &[PipelineName] {
        &self.pipelines
    }

    fn owns(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Declared ownership policy for a repository.
///
/// Deserialises from configuration of the form:
///
/// ```toml
/// shared_prefixes = ["layers/shared/"]
///
/// [[rules]]
/// prefix = "lambda1/"
/// pipelines = ["lambda1-pipeline"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OwnershipTableConfig")]
pub struct OwnershipTable {
    rules: Vec<OwnershipRule>,
    shared_prefixes: Vec<String>,
}

/// Unvalidated wire form of [`OwnershipTable`].
#[derive(Deserialize)]
struct OwnershipTableConfig {
    #[serde(default)]
    rules: Vec<RawRule>,
    #[serde(default)]
    shared_prefixes: Vec<String>,
}

#[derive(Deserialize)]
struct RawRule {
    prefix: String,
    pipelines: Vec<PipelineName>,
}

impl TryFrom<OwnershipTableConfig> for OwnershipTable {
    type Error = RoutingConfigError;

    fn try_from(config: OwnershipTableConfig) -> Result<Self, Self::Error> {
        let rules = config
            .rules
            .into_iter()
            .map(|raw| OwnershipRule::new(raw.prefix, raw.pipelines))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules, config.shared_prefixes)
    }
}

impl OwnershipTable {
    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Fails if any shared prefix is empty; an empty shared prefix would match
    /// every path and fan out on every push.
    pub fn new(
        rules: Vec<OwnershipRule>,
        shared_prefixes: Vec<String>,
    ) -> Result<Self, RoutingConfigError> {
        if shared_prefixes.iter().any(String::is_empty) {
            return Err(RoutingConfigError::EmptySharedPrefix);
        }
        Ok(Self { rules, shared_prefixes })
    }

    pub fn rules(&self) -> &[OwnershipRule] {
        &self.rules
    }

    pub fn shared_prefixes(&self) -> &[String] {
        &self.shared_prefixes
    }

    /// Every pipeline named by any rule.
    pub fn all_pipelines(&self) -> PipelineSelection {
        self.rules.iter().flat_map(|r| r.pipelines.iter().cloned()).collect()
    }

    /// Returns `true` if `path` lies under a shared prefix.
    pub fn is_shared(&self, path: &str) -> bool {
        self.shared_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl Default for OwnershipTable {
    /// Two function directories, each with its own pipeline, and one shared
    /// layer that both functions import.
    fn default() -> Self {
        Self {
            rules: vec![
                OwnershipRule {
                    prefix: "lambda1/".to_string(),
                    pipelines: vec![PipelineName::from_static("lambda1-pipeline")],
                },
                OwnershipRule {
                    prefix: "lambda2/".to_string(),
                    pipelines: vec![PipelineName::from_static("lambda2-pipeline")],
                },
            ],
            shared_prefixes: vec!["layers/shared/".to_string()],
        }
    }
}

/// Selects the pipelines affected by `changes`.
///
/// If any path is under a shared prefix every pipeline in the table is
/// selected; otherwise a rule's pipelines are selected when at least one path
/// starts with its prefix. Rules are evaluated independently, so one path can
/// select several pipelines. An empty change set selects nothing.
pub fn route(changes: &ChangeSet, table: &OwnershipTable) -> PipelineSelection {
    let shared_touched = changes.iter().any(|path| table.is_shared(path));

    let mut selection = PipelineSelection::new();
    for rule in table.rules() {
        if shared_touched || changes.iter().any(|path| rule.owns(path)) {
            selection.extend(rule.pipelines().iter().cloned());
        }
    }
    selection
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
