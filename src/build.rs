//! Driving a vblock entry through its build passes.
use crate::collection::ContentSource;
use crate::entry::ResizePolicy;
use crate::error::{Result, VblockError};
use crate::output::OutputDir;
use crate::vblock::VblockEntry;
use std::collections::BTreeSet;

/// First-pass attempts before giving up on an entry.
pub const MAX_OBTAIN_PASSES: usize = 3;

/// Everything an entry reads from the surrounding build during a pass.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub section: &'a dyn ContentSource,
    pub outdir: &'a OutputDir,
    pub policy: ResizePolicy,
}

impl<'a> BuildContext<'a> {
    pub fn new(section: &'a dyn ContentSource, outdir: &'a OutputDir) -> Self {
        BuildContext {
            section,
            outdir,
            policy: ResizePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResizePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Point in the build at which the section may be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPass {
    /// Before first-pass attempt `n` (starting at 1).
    Obtain(usize),
    /// After layout, before the final pass (symbol writing happens here).
    Process,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub data: Vec<u8>,
    /// The entry changed size in the final pass.
    pub repack_required: bool,
    pub obtain_passes: usize,
    pub missing_bintools: Vec<String>,
}

/// Run the first pass until it succeeds, then the final pass.
///
/// `prepare` is called before every pass so the caller can fill in or
/// rewrite the contents of the signed entries.
pub fn build_vblock<S, F>(
    entry: &mut VblockEntry,
    section: &mut S,
    outdir: &OutputDir,
    policy: ResizePolicy,
    mut prepare: F,
) -> Result<BuildOutcome>
where
    S: ContentSource,
    F: FnMut(&mut S, BuildPass) -> Result<()>,
{
    let mut obtained = false;
    let mut passes = 0;
    while passes < MAX_OBTAIN_PASSES {
        passes += 1;
        prepare(&mut *section, BuildPass::Obtain(passes))?;
        let ctx = BuildContext::new(&*section, outdir).with_policy(policy);
        if entry.obtain_contents(&ctx)? {
            obtained = true;
            break;
        }
    }
    if !obtained {
        return Err(VblockError::PassOrder {
            node: entry.node().path.clone(),
            message: format!("could not obtain contents after {passes} passes"),
        });
    }

    prepare(&mut *section, BuildPass::Process)?;
    let ctx = BuildContext::new(&*section, outdir).with_policy(policy);
    let size_ok = entry.process_contents(&ctx)?;
    if !size_ok {
        tracing::info!(
            node = %entry.node().path,
            size = entry.contents_size(),
            "vblock changed size, image layout must be recomputed"
        );
    }

    let missing: BTreeSet<String> = entry.missing_bintools().iter().cloned().collect();
    Ok(BuildOutcome {
        data: entry.data().map(<[u8]>::to_vec).unwrap_or_default(),
        repack_required: !size_ok,
        obtain_passes: passes,
        missing_bintools: missing.into_iter().collect(),
    })
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
