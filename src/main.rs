use std::path::{Path, PathBuf};

use clap::{ArgGroup, CommandFactory, Parser};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use checkdiff_consensus::check::{CheckOptions, Checker};
use checkdiff_consensus::report::{render_json, render_text, DisplayOptions};
use checkdiff_core::{CheckDiffConfig, LineOffset, OutputFormat};
use checkdiff_difflens::select::HunkSelection;
use checkdiff_gitpulse::vcs::GitRepository;

#[derive(Parser)]
#[command(
    name = "git-check-diff",
    version,
    about = "Find the merge-base tags shared by the commits behind a pending change",
    long_about = "Find the merge-base tags shared by the commits behind a pending change.\n\n\
                   Blames the lines each uncommitted hunk touches, collects the commits\n\
                   that last changed them, and reports which MERGE_BASE_<N> tags contain\n\
                   every one of those commits.\n\n\
                   Examples:\n  \
                     git check-diff src/lib.rs            Check working-tree changes\n  \
                     git check-diff --cached a.c b.c      Check staged changes in two files\n  \
                     git check-diff -H 1,3 --hunk a.c     Check only hunks 1 and 3\n  \
                     git check-diff -B --line a.c         Blame the line before each removal",
    group(ArgGroup::new("offset").args(["before", "after"]))
)]
struct Cli {
    /// Files to check
    files: Vec<PathBuf>,

    /// Show all merge-base tags
    #[arg(long)]
    all: bool,

    /// Show only this many merge-base tags (0 shows all)
    #[arg(long)]
    limit: Option<usize>,

    /// Show the implicated line numbers for each commit
    #[arg(long)]
    line: bool,

    /// Blame the line before each removed line
    #[arg(short = 'B')]
    before: bool,

    /// Blame the line after each removed line
    #[arg(short = 'A')]
    after: bool,

    /// Show commit dates
    #[arg(long)]
    date: bool,

    /// Check staged changes instead of the working tree
    #[arg(long)]
    cached: bool,

    /// Only check these 1-based hunks, comma separated (single file only)
    #[arg(short = 'H', value_name = "LIST")]
    hunks: Option<String>,

    /// Print the text of each checked hunk
    #[arg(long)]
    hunk: bool,

    /// Output format
    #[arg(
        long,
        long_help = "Output format for the report.\n\n\
                       Formats:\n  \
                         text  Human-readable report (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: Option<OutputFormat>,

    /// Path to configuration file (default: .checkdiff.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short)]
    verbose: bool,

    /// Generate shell completion scripts
    #[arg(long, value_enum, value_name = "SHELL", hide = true)]
    completions: Option<clap_complete::Shell>,
}

impl Cli {
    fn offset(&self) -> LineOffset {
        if self.before {
            LineOffset::Before
        } else if self.after {
            LineOffset::After
        } else {
            LineOffset::None
        }
    }

    fn display(&self, config: &CheckDiffConfig) -> DisplayOptions {
        let limit = if self.all {
            None
        } else {
            match self.limit.unwrap_or(config.display.limit) {
                0 => None,
                n => Some(n),
            }
        };
        DisplayOptions {
            limit,
            show_lines: self.line || config.display.show_lines,
            show_hunks: self.hunk || config.display.show_hunks,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "git-check-diff", &mut std::io::stdout());
        return Ok(());
    }

    let cwd = Path::new(".");
    let config = CheckDiffConfig::discover(cli.config.as_deref(), cwd)?;
    tracing::debug!(?config, "loaded configuration");

    let selection = cli
        .hunks
        .as_deref()
        .map(str::parse::<HunkSelection>)
        .transpose()?;
    let options = CheckOptions {
        offset: cli.offset(),
        cached: cli.cached,
        selection,
        with_dates: cli.date || config.display.show_date,
    };

    let repo = GitRepository::open(cwd, &config.tags, &config.branches)?;
    let report = Checker::new(&repo, options).check_files(&cli.files)?;

    match cli.format.unwrap_or_default() {
        OutputFormat::Text => print!("{}", render_text(&report, &cli.display(&config))),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    Ok(())
}
