use clap::Parser;
use genre_diversity_lib::config::{Overrides, Settings, SourceKind};
use genre_diversity_lib::logging::LogState;
use std::path::PathBuf;
use std::process::ExitCode;

/// Calculate the genre diversity of your music library.
#[derive(Debug, Parser)]
#[command(name = "genre-diversity", version, about)]
struct Cli {
    /// Kind of library to read
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Path to the library (database, XML file, or music folder)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Config file (defaults to $GENRE_DIVERSITY_CONFIG, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How many of the most frequent genres to list
    #[arg(long = "top")]
    top_genres: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,

    /// Directory for the persistent log file
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Overrides {
            config: cli.config,
            source: cli.source,
            library: cli.library,
            top_genres: cli.top_genres,
            verbose: cli.verbose,
            log_dir: cli.log_dir,
            json: cli.json,
        }
    }
}

fn main() -> ExitCode {
    let overrides = Overrides::from(Cli::parse());
    let log = LogState::new();
    log.set_debug(overrides.verbose);

    let settings = match Settings::load(&overrides, &log) {
        Ok(settings) => settings,
        Err(e) => {
            log.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    log.set_debug(settings.debug);
    if settings.file_logging {
        log.init_log_dir(&settings.log_dir);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match genre_diversity_lib::run(&settings, &log, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("An error occurred during genre diversity calculation: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
