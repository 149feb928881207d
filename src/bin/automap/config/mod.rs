mod map;

pub use map::{build_map_config, build_reaction_spec};
