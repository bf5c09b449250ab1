use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Classification and extraction pipeline for security file corpora
#[derive(Parser, Debug)]
#[command(
    name = "corpusmill",
    about = "Classification and extraction pipeline for security file corpora",
    version,
    long_about = "corpusmill walks a corpus of exploit archives, advisories and source \
                  code, classifies every file into a processing tier, extracts software \
                  components, severity and compatibility metadata, and emits structured \
                  records for dataset assembly."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug logging)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Process a corpus into structured records",
        long_about = "Walks the corpus, loads index_.txt annotation files, classifies and \
                      processes every file under a bounded worker pool, and writes one \
                      JSON record per file.\n\n\
                      Examples:\n  \
                      corpusmill process ./corpus\n  \
                      corpusmill process ./corpus -o records.jsonl -c 8\n  \
                      corpusmill process ./corpus --dry-run"
    )]
    Process(ProcessArgs),

    #[command(
        about = "Report annotation coverage of a corpus",
        long_about = "Compares the files present in the corpus against the filenames \
                      declared by its annotation indexes.\n\n\
                      Examples:\n  \
                      corpusmill coverage ./corpus\n  \
                      corpusmill coverage ./corpus -f json"
    )]
    Coverage(CoverageArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ProcessArgs {
    #[arg(value_name = "ROOT", help = "Corpus root directory")]
    pub root: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Output JSONL file (default: records.jsonl next to the corpus)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Analyze and report statistics without writing records")]
    pub dry_run: bool,

    #[arg(
        short = 'c',
        long,
        value_name = "N",
        help = "Worker pool size (default: from environment/hardware)"
    )]
    pub concurrency: Option<usize>,

    #[arg(long, value_name = "SECONDS", help = "Per-file I/O timeout")]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct CoverageArgs {
    #[arg(value_name = "ROOT", help = "Corpus root directory")]
    pub root: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the report to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Human,
    Json,
}
