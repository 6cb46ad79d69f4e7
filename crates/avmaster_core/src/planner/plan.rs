//! Assembly plan types and construction.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{AssetRole, RunContext};

use super::validation::validate_flags;
use super::PlanError;

/// Where an asset reference's path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    Default,
    Override,
}

/// An auxiliary segment: which role, and which file plays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub role: AssetRole,
    pub path: PathBuf,
    pub source: AssetSource,
}

/// One entry of an assembly plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "segment", rename_all = "lowercase")]
pub enum SegmentRef {
    /// The (possibly mastered) input.
    Body,
    /// A bumper asset.
    Asset(AssetRef),
}

impl SegmentRef {
    pub fn role(&self) -> Option<AssetRole> {
        match self {
            SegmentRef::Body => None,
            SegmentRef::Asset(asset) => Some(asset.role),
        }
    }
}

/// Ordered segments for one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyPlan {
    segments: Vec<SegmentRef>,
}

impl AssemblyPlan {
    pub fn segments(&self) -> &[SegmentRef] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Plan is the body alone; assembly is a copy/rename.
    pub fn is_body_only(&self) -> bool {
        matches!(self.segments.as_slice(), [SegmentRef::Body])
    }

    /// Distinct assets in first-use order.
    pub fn assets(&self) -> Vec<&AssetRef> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let SegmentRef::Asset(asset) = segment {
                if !seen.iter().any(|a: &&AssetRef| a.role == asset.role) {
                    seen.push(asset);
                }
            }
        }
        seen
    }

    /// Compact description, e.g. `[head, body, silence, tail, silence]`.
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self
            .segments
            .iter()
            .map(|s| s.role().map(|r| r.as_str()).unwrap_or("body"))
            .collect();
        format!("[{}]", names.join(", "))
    }

    /// Check structural invariants: body exactly once, each ident at most
    /// once, and one of the three accepted shapes.
    pub fn check_invariants(&self) -> Result<(), String> {
        let bodies = self
            .segments
            .iter()
            .filter(|s| matches!(s, SegmentRef::Body))
            .count();
        if bodies != 1 {
            return Err(format!("plan has {} body segments", bodies));
        }
        for role in [AssetRole::Head, AssetRole::Tail] {
            let count = self
                .segments
                .iter()
                .filter(|s| s.role() == Some(role))
                .count();
            if count > 1 {
                return Err(format!("plan uses the {} ident {} times", role, count));
            }
        }
        if !matches!(self.segments.len(), 1 | 4 | 5) {
            return Err(format!("unexpected plan shape {}", self.describe()));
        }
        Ok(())
    }
}

/// Compute the assembly plan for a run. Pure: reads only `ctx`.
pub fn plan(ctx: &RunContext) -> Result<AssemblyPlan, PlanError> {
    let flags = &ctx.flags;
    validate_flags(flags, ctx.default_head_available)?;

    if flags.skip_bumper {
        return Ok(AssemblyPlan {
            segments: vec![SegmentRef::Body],
        });
    }

    let mut segments = Vec::with_capacity(5);

    if !flags.omits(AssetRole::Head) {
        segments.push(SegmentRef::Asset(asset_ref(ctx, AssetRole::Head)));
    }

    segments.push(SegmentRef::Body);

    if !flags.omits(AssetRole::Tail) {
        let silence = SegmentRef::Asset(asset_ref(ctx, AssetRole::Silence));
        segments.push(silence.clone());
        segments.push(SegmentRef::Asset(asset_ref(ctx, AssetRole::Tail)));
        segments.push(silence);
    }

    Ok(AssemblyPlan { segments })
}

/// Custom path wins over the default for its role.
fn asset_ref(ctx: &RunContext, role: AssetRole) -> AssetRef {
    match ctx.flags.custom_path(role) {
        Some(path) => AssetRef {
            role,
            path: path.to_path_buf(),
            source: AssetSource::Override,
        },
        None => AssetRef {
            role,
            path: default_path(ctx, role).to_path_buf(),
            source: AssetSource::Default,
        },
    }
}

fn default_path(ctx: &RunContext, role: AssetRole) -> &Path {
    ctx.assets.get(role)
}
