use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use automap::io::{
    LammpsData, read_coeffs, unify_coeffs, unify_types, write_coeffs, write_data,
};

use super::molecule::{display_target, read_data};
use crate::cli::CleanArgs;
use crate::display::{Context as DisplayContext, Progress, print_clean_summary};
use crate::io::{create_output, open_input};

const TOTAL_STEPS: u8 = 3;

pub fn run_clean(args: CleanArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading data and coefficient files");
    let mut files = args
        .inputs
        .iter()
        .map(|path| read_data_file(path))
        .collect::<Result<Vec<_>>>()?;
    let input = open_input(&args.coeff_file)?;
    let coeffs = read_coeffs(input)
        .with_context(|| format!("Failed to read {}", args.coeff_file.display()))?;
    progress.complete_step(
        "Reading data and coefficient files",
        &[
            format!("{} data file(s)", files.len()),
            format!("{} coefficient line(s)", coeffs.len()),
        ],
    );

    progress.step("Unifying types");
    let maps = unify_types(&mut files);
    let kept = unify_coeffs(&coeffs, &maps);
    let counts = maps.type_counts();
    progress.complete_step(
        "Unifying types",
        &[
            format!("{} atom type(s) in use", counts.atoms),
            format!("{} of {} coefficient line(s) kept", kept.len(), coeffs.len()),
        ],
    );

    if ctx.interactive {
        print_clean_summary(files.len(), &counts, kept.len());
    }

    progress.step("Writing cleaned files");
    let mut written = Vec::with_capacity(files.len() + 1);
    for (path, data) in args.inputs.iter().zip(&files) {
        let target = output_path(path, &args.prefix)?;
        let mut writer = create_output(Some(target.as_path()))?;
        write_data(&mut writer, data)
            .with_context(|| format!("Failed to write data file {}", target.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush data file {}", target.display()))?;
        written.push(format!("Write data → {}", display_target(Some(target.as_path()))));
    }
    let target = output_path(&args.coeff_file, &args.prefix)?;
    let mut writer = create_output(Some(target.as_path()))?;
    write_coeffs(&mut writer, &kept)
        .with_context(|| format!("Failed to write coefficient file {}", target.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush coefficient file {}", target.display()))?;
    written.push(format!("Write coefficients → {}", display_target(Some(target.as_path()))));
    progress.complete_step("Writing cleaned files", &written);

    progress.finish("Cleaning complete", 0);

    Ok(())
}

fn read_data_file(path: &Path) -> Result<LammpsData> {
    let data = read_data(path)?;
    if data.atoms.iter().any(|atom| atom.molecule.is_none()) {
        bail!(
            "{} is a molecule file; clean expects LAMMPS data files with an Atoms section",
            path.display()
        );
    }
    Ok(data)
}

/// `dir/name` becomes `dir/<prefix>name`.
fn output_path(path: &Path, prefix: &str) -> Result<PathBuf> {
    let Some(name) = path.file_name() else {
        bail!("{} does not name a file", path.display());
    };
    Ok(path.with_file_name(format!("{prefix}{}", name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_prefixes_file_name_only() {
        let path = output_path(Path::new("runs/pre.data"), "cleaned").unwrap();
        assert_eq!(path, PathBuf::from("runs/cleanedpre.data"));
    }

    #[test]
    fn output_path_rejects_directory_like_path() {
        assert!(output_path(Path::new(".."), "cleaned").is_err());
    }
}
