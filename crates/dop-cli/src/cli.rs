use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const DOP_BEFORE_HELP: &str = concat!(
    "dop ",
    env!("CARGO_PKG_VERSION"),
    " – Differential operator repositories\n\n",
    "\x1b[1;36mDatasets\x1b[0m\n",
    "  bkp              Batyrev-Kreuzer periods, keys like 13.3754\n",
    "  btp              The same periods keyed by two integers, 13.3754\n",
    "  hks              Quartic surface pencils, keys like x4+y4__x3w+z4/dop.1\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    disable_help_subcommand = true,
    before_help = DOP_BEFORE_HELP
)]
#[allow(clippy::struct_excessive_bools)]
pub struct DopCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "Directory holding one subdirectory per dataset (overrides DOP_DATA_DIR)",
        global = true
    )]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(about = "Print the operator stored under KEY")]
    Get(KeyArgs),
    #[command(about = "List the keys of a dataset")]
    Keys(KeysArgs),
    #[command(about = "Show where the artifact for KEY lives and whether it is fetched")]
    Locate(KeyArgs),
    #[command(about = "Parse every available operator and report the ones that fail")]
    Check(DatasetArgs),
}

#[derive(Args, Debug)]
pub struct DatasetArgs {
    #[arg(value_name = "DATASET", help = "One of bkp, btp or hks")]
    pub dataset: String,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    #[arg(value_name = "DATASET", help = "One of bkp, btp or hks")]
    pub dataset: String,
    #[arg(value_name = "KEY", help = "Operator key as listed by `dop keys`")]
    pub key: String,
}

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[arg(value_name = "DATASET", help = "One of bkp, btp or hks")]
    pub dataset: String,
    #[arg(long, help = "Only list keys whose data is present locally")]
    pub available: bool,
}
