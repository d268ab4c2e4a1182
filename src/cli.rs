use clap::Parser;

#[derive(Parser)]
#[command(name = "codecontexter")]
#[command(
    about = "Create a Markdown summary of a code tree with rich metadata",
    long_about = None
)]
pub struct Cli {
    #[arg(help = "The target directory to scan for code files")]
    pub directory: String,

    #[arg(
        short,
        long,
        help = "Path for the output Markdown file (default: code_summary.md)"
    )]
    pub output: Option<String>,

    #[arg(short, long, help = "Show detailed processing information")]
    pub verbose: bool,

    #[arg(long, help = "Skip generating the metadata table")]
    pub no_metadata_table: bool,

    #[arg(long, help = "Include SHA-256 hash for each file (slower)")]
    pub include_hash: bool,

    #[arg(long, help = "Disable colors")]
    pub no_color: bool,

    #[arg(long, help = "Disable the progress indicator")]
    pub no_progress: bool,
}
