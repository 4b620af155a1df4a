use crate::error::{PipelineError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::HashMap;

/// Inclusion/exclusion rules over a metric's name and tag keys.
///
/// All rules are glob patterns. `name_drop` takes precedence over
/// `name_pass`; `tag_drop` takes precedence over `tag_include`. No
/// configured rules means every metric matches. `tag_include` does not
/// affect the match decision at all; it is a projection over the merged
/// tag set, applied by [`CompiledFilter::project_tags`].
///
/// A `Filter` is plain configuration; it must be compiled into a
/// [`CompiledFilter`] before it can evaluate anything. Compilation fails on
/// a malformed pattern.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub name_pass: Vec<String>,
    #[serde(default)]
    pub name_drop: Vec<String>,
    #[serde(default)]
    pub tag_include: Vec<String>,
    #[serde(default)]
    pub tag_drop: Vec<String>,
}

impl Filter {
    pub fn compile(&self) -> Result<CompiledFilter> {
        Ok(CompiledFilter {
            name_pass: build_set(&self.name_pass)?,
            name_drop: build_set(&self.name_drop)?,
            tag_include: build_set(&self.tag_include)?,
            tag_drop: build_set(&self.tag_drop)?,
        })
    }
}

fn build_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| PipelineError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|source| PipelineError::InvalidPattern {
        pattern: source.glob().map(str::to_string).unwrap_or_default(),
        source,
    })?;
    Ok(Some(set))
}

/// The fast-evaluation form of a [`Filter`]. Evaluation is pure and safe to
/// call concurrently from any number of producers.
#[derive(Debug)]
pub struct CompiledFilter {
    name_pass: Option<GlobSet>,
    name_drop: Option<GlobSet>,
    tag_include: Option<GlobSet>,
    tag_drop: Option<GlobSet>,
}

impl CompiledFilter {
    /// Whether a metric with this name and tag set passes the filter.
    pub fn matches(&self, name: &str, tags: &HashMap<String, String>) -> bool {
        self.name_matches(name) && self.tags_pass(tags)
    }

    fn name_matches(&self, name: &str) -> bool {
        if let Some(drop) = &self.name_drop {
            if drop.is_match(name) {
                return false;
            }
        }
        if let Some(pass) = &self.name_pass {
            return pass.is_match(name);
        }
        true
    }

    fn tags_pass(&self, tags: &HashMap<String, String>) -> bool {
        match &self.tag_drop {
            Some(drop) => !tags.keys().any(|key| drop.is_match(key)),
            None => true,
        }
    }

    /// Projects the merged tag set: dropped keys are removed first, then, if
    /// an include list is configured, only matching keys are retained.
    pub fn project_tags(&self, tags: &mut HashMap<String, String>) {
        if let Some(drop) = &self.tag_drop {
            tags.retain(|key, _| !drop.is_match(key));
        }
        if let Some(include) = &self.tag_include {
            tags.retain(|key, _| include.is_match(key));
        }
    }
}
