use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compare RAG pipelines on your own documents and questions
#[derive(Parser, Debug)]
#[command(
    name = "rag-optimizer",
    about = "Compare RAG pipelines on your own documents and questions",
    version,
    author,
    long_about = "rag-optimizer uploads documents to a RAG evaluation service, has every \
                  pipeline ingest them, asks your test questions and shows which pipeline \
                  scored best on accuracy, relevance, completeness and cost."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Evaluation service URL (overrides RAG_OPTIMIZER_API_URL)"
    )]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Upload documents, ingest them and evaluate test questions",
        long_about = "Runs the whole comparison: uploads the given documents, waits for \
                      every pipeline to ingest them, evaluates the questions and prints the \
                      ranked result.\n\n\
                      Examples:\n  \
                      rag-optimizer run --file guide.pdf --question \"What is the refund policy?\"\n  \
                      rag-optimizer run --file a.pdf --file b.docx --questions-file questions.txt\n  \
                      rag-optimizer run --file notes.txt --question \"Summarize\" --export ./reports"
    )]
    Run(RunArgs),

    #[command(
        about = "Check evaluation service availability",
        long_about = "Queries the evaluation service health and status endpoints.\n\n\
                      Examples:\n  \
                      rag-optimizer health\n  \
                      rag-optimizer health --format json"
    )]
    Health(HealthArgs),

    #[command(
        about = "Show a previously exported CSV report",
        long_about = "Reads a report written by `run --export` and prints it.\n\n\
                      Examples:\n  \
                      rag-optimizer report reports/rag-evaluation-2025-01-15T10:30:00.000Z.csv"
    )]
    Report(ReportArgs),

    #[command(
        about = "Show the effective configuration",
        long_about = "Prints the configuration read from RAG_OPTIMIZER_* variables and \
                      command-line overrides, then validates it.\n\n\
                      Examples:\n  \
                      rag-optimizer config\n  \
                      rag-optimizer --api-url http://eval.internal:8000 config --format json"
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[arg(
        long = "file",
        value_name = "PATH",
        required = true,
        help = "Document to upload (PDF, TXT or DOCX); repeat for several"
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        long = "question",
        value_name = "TEXT",
        help = "Test question; repeat for several"
    )]
    pub questions: Vec<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Read additional questions from a file, one per line"
    )]
    pub questions_file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        value_name = "DIR",
        help = "Write the CSV report into this directory"
    )]
    pub export: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    #[arg(value_name = "CSV", help = "Path to an exported report")]
    pub path: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
