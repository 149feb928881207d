mod clean;
mod map;
mod molecule;

use clean::run_clean;
use map::run_map;
use molecule::run_molecule;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Molecule(args) => run_molecule(args, ctx),
        Command::Map(args) => run_map(args, ctx),
        Command::Clean(args) => run_clean(args, ctx),
    }
}
