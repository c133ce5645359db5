use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "annograph", version, about = "annograph data-item planner")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check a load spec against the recognized sections and shapes.
    Validate {
        /// Load-spec JSON file.
        spec: String,
    },

    /// List the item catalog.
    Catalog {
        /// Filter by origin: main|annox|derived
        #[arg(long)]
        origin: Option<String>,

        /// Filter by group: primary|graph|xmlid|feature|connectivity|temp
        #[arg(long)]
        group: Option<String>,
    },

    /// Resolve load specs in sequence against one session and print each
    /// differential plan.
    Plan {
        /// Load-spec JSON files, applied in order.
        #[arg(required = true)]
        specs: Vec<String>,

        /// Root directory holding the per-origin compiled data.
        #[arg(long, default_value = ".annograph")]
        data_dir: String,
    },
}
