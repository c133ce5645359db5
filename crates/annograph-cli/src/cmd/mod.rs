use anyhow::Result;

use crate::args::{Cli, Command};

mod catalog;
mod plan;
mod validate;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Validate { spec } => validate::run(&spec),
        Command::Catalog { origin, group } => catalog::run(origin.as_deref(), group.as_deref()),
        Command::Plan { specs, data_dir } => plan::run(&specs, &data_dir),
    }
}
