//! Library half of the `tooldir` command: seed loading, the commands
//! themselves, and text rendering.

pub mod commands;
pub mod render;
pub mod seed;

pub use commands::{browse, facets, snapshot, submit, Submitter};
pub use render::{format_date, render_entry, render_facets, render_view};
pub use seed::{load_seed, parse_seed, save_seed, seeded_store};
