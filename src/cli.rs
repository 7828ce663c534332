use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "phraseaudit",
    version,
    about = "Phrase maintenance and phrase building reports for indexed document exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Report(ReportArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long)]
    pub documents_path: PathBuf,

    #[arg(long)]
    pub phrases_path: PathBuf,

    #[arg(long, default_value = "reports")]
    pub output_root: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = PhraseSort::Hits)]
    pub phrase_sort: PhraseSort,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PhraseSort {
    Hits,
    Source,
}

impl PhraseSort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::Source => "source",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "reports")]
    pub output_root: PathBuf,
}
