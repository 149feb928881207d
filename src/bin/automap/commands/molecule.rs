use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use automap::io::{LammpsData, read_lammps, write_molecule};

use crate::cli::MoleculeArgs;
use crate::display::{Context as DisplayContext, Progress, print_data_summary};
use crate::io::{create_output, open_input, stdout_is_tty};

const TOTAL_STEPS: u8 = 2;

pub fn run_molecule(args: MoleculeArgs, ctx: DisplayContext) -> Result<()> {
    if args.output.is_none() && stdout_is_tty() {
        bail!(
            "No output file specified and stdout is a terminal.\n\nUsage: automap molecule <DATA> -o <FILE> or pipe output."
        );
    }

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading LAMMPS data");
    let data = read_data(&args.input)?;
    progress.complete_step(
        "Reading LAMMPS data",
        &[format!("{} atoms, {} bonds", data.atom_count(), data.bonds.len())],
    );

    if ctx.interactive {
        print_data_summary("Molecule Summary", &data);
    }

    progress.step("Writing molecule file");
    let mut writer = create_output(args.output.as_deref())?;
    write_molecule(&mut writer, &data, None).context("Failed to write molecule file")?;
    writer.flush().context("Failed to flush molecule file")?;
    progress.complete_step(
        "Writing molecule file",
        &[format!("Write molecule → {}", display_target(args.output.as_deref()))],
    );

    progress.finish("Conversion complete", 0);

    Ok(())
}

pub(super) fn read_data(path: &Path) -> Result<LammpsData> {
    let input = open_input(path)?;
    read_lammps(input).with_context(|| format!("Failed to read {}", path.display()))
}

pub(super) fn display_target(path: Option<&Path>) -> String {
    path.map(|p| {
        p.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    })
    .unwrap_or_else(|| "stdout".to_string())
}
