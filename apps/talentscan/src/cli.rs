use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "talentscan",
    about = "Screen a folder of résumés against a job profile and write a ranked report",
    version,
    after_help = "Examples:\n  \
        talentscan -c curriculos/ -p perfil_vaga.txt\n  \
        talentscan -c curriculos/ -p perfil_vaga.txt -o relatorio\n  \
        talentscan -c curriculos/ -p perfil_vaga.txt --concurrency 4 --verbose"
)]
pub struct Cli {
    /// Directory containing the résumés (PDF, DOCX, TXT or MD)
    #[arg(short = 'c', long = "curriculos", value_name = "DIR")]
    pub cv_dir: PathBuf,

    /// Text file with the job profile
    #[arg(short = 'p', long = "perfil", value_name = "FILE")]
    pub profile: PathBuf,

    /// Output path for the report files, without extension (defaults to a timestamped name)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of candidates scored at the same time (overrides SCREENING_CONCURRENCY)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,
}
