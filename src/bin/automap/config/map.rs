use anyhow::{Result, anyhow};

use automap::{AtomId, MapConfig, ReactionSpec};

use crate::cli::{MappingOptions, ReactionOptions};

pub fn build_map_config(opts: &MappingOptions) -> MapConfig {
    MapConfig {
        max_rounds: opts.max_rounds,
        truncate: !opts.no_truncate,
        strict_partial: opts.strict,
        ..MapConfig::default()
    }
}

pub fn build_reaction_spec(opts: &ReactionOptions) -> Result<ReactionSpec> {
    let (pre_anchors, post_anchors) = split_pairs("--bonding-atoms", &opts.bonding_atoms)?;
    let (pre_deletions, post_deletions) = split_pairs("--delete-atoms", &opts.delete_atoms)?;

    Ok(ReactionSpec::new(pre_anchors, post_anchors)
        .with_deletions(pre_deletions, post_deletions)
        .with_creations(opts.create_atoms.iter().copied()))
}

fn split_pairs(flag: &str, ids: &[AtomId]) -> Result<(Vec<AtomId>, Vec<AtomId>)> {
    ReactionSpec::split_halves(ids).ok_or_else(|| {
        anyhow!(
            "{flag} received an odd number of ids ({}); expected pre ids followed by the same number of post ids",
            ids.len()
        )
    })
}
