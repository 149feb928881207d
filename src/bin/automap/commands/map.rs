use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use automap::io::{LammpsData, write_map, write_molecule};
use automap::{Element, Molecule, ReactionMap, SideTemplate, map_reaction};

use super::molecule::{display_target, read_data};
use crate::cli::MapArgs;
use crate::config::{build_map_config, build_reaction_spec};
use crate::display::{Context as DisplayContext, Progress, print_advisories, print_map_summary};
use crate::io::create_output;

const TOTAL_STEPS: u8 = 3;

pub fn run_map(args: MapArgs, ctx: DisplayContext) -> Result<()> {
    let reaction = build_reaction_spec(&args.reaction)?;
    let config = build_map_config(&args.mapping);
    let elements = &args.reaction.elements_by_type;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading pre and post molecules");
    let pre_data = read_data(&args.pre)?;
    let post_data = read_data(&args.post)?;
    let pre = to_molecule(&pre_data, elements, &args.pre)?;
    let post = to_molecule(&post_data, elements, &args.post)?;
    progress.complete_step(
        "Reading pre and post molecules",
        &[
            format!("pre: {} atoms, {} bonds", pre.atom_count(), pre.bond_count()),
            format!("post: {} atoms, {} bonds", post.atom_count(), post.bond_count()),
        ],
    );

    progress.step("Mapping reaction");
    let map = map_reaction(&pre, &post, &reaction, &config).context("Reaction mapping failed")?;
    progress.complete_step("Mapping reaction", &build_map_details(&map));

    if ctx.interactive {
        print_map_summary(&pre, &post, &map);
        print_advisories(&map.events);
    }

    progress.step("Writing templates");
    let outputs = &args.output;
    write_template(&outputs.pre, &pre_data, &map.pre)?;
    write_template(&outputs.post, &post_data, &map.post)?;
    let mut writer = create_output(Some(outputs.map.as_path()))?;
    write_map(&mut writer, &map).context("Failed to write map file")?;
    writer.flush().context("Failed to flush map file")?;
    progress.complete_step(
        "Writing templates",
        &[
            format!("Write pre molecule → {}", display_target(Some(outputs.pre.as_path()))),
            format!("Write post molecule → {}", display_target(Some(outputs.post.as_path()))),
            format!("Write map → {}", display_target(Some(outputs.map.as_path()))),
        ],
    );

    progress.finish("Mapping complete", map.events.len());

    Ok(())
}

fn to_molecule(data: &LammpsData, elements: &[Element], path: &Path) -> Result<Molecule> {
    data.to_molecule(elements)
        .with_context(|| format!("Failed to assign elements to {}", path.display()))
}

fn write_template(path: &Path, data: &LammpsData, template: &SideTemplate) -> Result<()> {
    let mut writer = create_output(Some(path))?;
    write_molecule(&mut writer, data, Some(template))
        .with_context(|| format!("Failed to write molecule file {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush molecule file {}", path.display()))
}

fn build_map_details(map: &ReactionMap) -> Vec<String> {
    let mut details = vec![format!("{} atom pairs matched", map.pairs.len())];

    match &map.pre.selection {
        Some(selection) => details.push(format!(
            "Reduced to {} atoms with {} edge atoms",
            selection.len(),
            map.edge_ids.len()
        )),
        None => details.push("Full molecules kept".to_string()),
    }

    let inferred = map.inference_count();
    if inferred > 0 {
        details.push(format!("{inferred} pair(s) assigned by inference"));
    }

    details
}
