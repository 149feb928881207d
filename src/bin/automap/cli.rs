use std::path::PathBuf;

use automap::{AtomId, Element};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "automap",
    about = "Reaction mapping and template generation for LAMMPS fix bond/react",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a LAMMPS data file into a molecule file
    #[command(visible_alias = "mol")]
    Molecule(MoleculeArgs),

    /// Map a reaction and write its pre/post templates and map file
    #[command(visible_alias = "m")]
    Map(MapArgs),

    /// Renumber the types of data files and their coefficients onto the used ones
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct MoleculeArgs {
    /// LAMMPS data file to convert
    #[arg(value_name = "DATA")]
    pub input: PathBuf,

    /// Molecule file to write (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct MapArgs {
    /// LAMMPS data or molecule file before the reaction
    #[arg(value_name = "PRE")]
    pub pre: PathBuf,

    /// LAMMPS data or molecule file after the reaction
    #[arg(value_name = "POST")]
    pub post: PathBuf,

    #[command(flatten)]
    pub reaction: ReactionOptions,

    #[command(flatten)]
    pub mapping: MappingOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// LAMMPS data files that share one set of types
    #[arg(value_name = "DATA", num_args = 1.., required = true)]
    pub inputs: Vec<PathBuf>,

    /// File holding the pair_coeff and bonded *_coeff lines
    #[arg(long = "coeff-file", value_name = "FILE")]
    pub coeff_file: PathBuf,

    /// Prefix added to each output file name
    #[arg(long, value_name = "TEXT", default_value = "cleaned")]
    pub prefix: String,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Atoms that identify the reaction site.
#[derive(Args)]
#[command(next_help_heading = "Reaction Site")]
pub struct ReactionOptions {
    /// Bonding atom ids: all pre ids, then their post counterparts in the same order
    #[arg(
        long = "bonding-atoms",
        value_name = "ID",
        num_args = 1..,
        required = true
    )]
    pub bonding_atoms: Vec<AtomId>,

    /// Element symbol for each numeric atom type, in type order
    #[arg(
        long = "elements-by-type",
        value_name = "SYMBOL",
        num_args = 1..,
        required = true,
        value_parser = parse_element
    )]
    pub elements_by_type: Vec<Element>,

    /// Atoms that leave as a byproduct: pre ids, then post ids in the same order
    #[arg(long = "delete-atoms", value_name = "ID", num_args = 1..)]
    pub delete_atoms: Vec<AtomId>,

    /// Post atoms that have no pre-reaction counterpart
    #[arg(long = "create-atoms", value_name = "ID", num_args = 1..)]
    pub create_atoms: Vec<AtomId>,
}

/// Mapping behaviour switches.
#[derive(Args)]
#[command(next_help_heading = "Mapping Options")]
pub struct MappingOptions {
    /// Emit the full mapping instead of a minimal template
    #[arg(long)]
    pub no_truncate: bool,

    /// Abort when a mapped pair is kept on one side of the template only
    #[arg(long)]
    pub strict: bool,

    /// Rounds allowed when searching for unmatched atoms
    #[arg(long = "max-rounds", value_name = "N", default_value = "10")]
    pub max_rounds: usize,
}

#[derive(Args)]
#[command(next_help_heading = "Output Files")]
pub struct OutputOptions {
    /// Molecule file for the pre-reaction template
    #[arg(long = "pre-output", value_name = "FILE", default_value = "pre-molecule.data")]
    pub pre: PathBuf,

    /// Molecule file for the post-reaction template
    #[arg(long = "post-output", value_name = "FILE", default_value = "post-molecule.data")]
    pub post: PathBuf,

    /// Map file for fix bond/react
    #[arg(long = "map-output", value_name = "FILE", default_value = "automap.data")]
    pub map: PathBuf,
}

fn parse_element(s: &str) -> Result<Element, String> {
    Element::from_symbol_ignore_case(s).map_err(|e| e.to_string())
}

pub fn parse() -> Cli {
    Cli::parse()
}
