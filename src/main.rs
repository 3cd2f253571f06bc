use anyhow::{Context, Result};
use braille_trainer::catalog::Catalog;
use braille_trainer::config::Config;
use braille_trainer::dictation::{DictationEngine, DictationError};
use braille_trainer::progress::{JsonFileStore, ProgressRepository};
use braille_trainer::speech::{Announcer, CommandAnnouncer};
use braille_trainer::trainer::{self, Command, Feedback, LineInput, Trainer};
use braille_trainer::{report, telemetry};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "braille-trainer")]
#[command(about = "Braille chord keyboard trainer with spoken dictations", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.braille-trainer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mode to start in
    #[arg(short, long, value_enum, default_value_t = StartMode::Free)]
    mode: StartMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print recorded progress
    Report {
        /// Only this student
        #[arg(short, long)]
        student: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartMode {
    Free,
    Dictation,
}

const HELP: &str = "\
Клавиши: 7 4 1 8 5 2 точки 1-6, = прослушать, + добавить букву,
- отправить слово, . произнести слово, 0 очистить, m сменить режим, ? помощь";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    telemetry::init(&config.telemetry)?;
    info!("braille-trainer starting");

    let store_path = Config::expand_path(&config.store.path)?;
    let store = JsonFileStore::new(store_path);

    if let Some(Commands::Report { student }) = cli.command {
        let db = store.load_all().context("failed to read progress")?;
        print!("{}", report::render(&db, student.as_deref())?);
        return Ok(());
    }

    let catalog = match &config.dictation.catalog_path {
        Some(path) => Catalog::from_json_file(&Config::expand_path(path)?)
            .context("failed to load curriculum")?,
        None => Catalog::builtin(),
    };
    println!("✓ Curriculum loaded: {} units", catalog.len());

    let engine = DictationEngine::new(catalog, store, config.dictation_policy());
    let mut trainer = Trainer::new(engine);
    let mut announcer = CommandAnnouncer::new(config.speech.clone());

    println!("{HELP}");
    println!("Press Ctrl+C to exit.\n");

    if cli.mode == StartMode::Dictation {
        let feedback = trainer.switch_mode();
        trainer::render(&feedback, &mut announcer, &mut std::io::stdout())?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                println!("\nShutting down...");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                tokio::task::block_in_place(|| handle_line(&mut trainer, &mut announcer, &line))?;
            }
        }
    }

    Ok(())
}

/// Feeds one line of input to the trainer and plays back the feedback
///
/// While a student code is expected the whole line is the code, unless it is
/// just a mode switch or help; otherwise every character is a keypad key.
fn handle_line<R, A>(trainer: &mut Trainer<R>, announcer: &mut A, line: &str) -> Result<()>
where
    R: ProgressRepository,
    A: Announcer,
{
    let mut screen = std::io::stdout();

    let commands = match trainer.parse_line(line) {
        LineInput::StudentId(id) => {
            let result = trainer.begin_session(id);
            return report_result(result, announcer, &mut screen);
        }
        LineInput::Commands(commands) => commands,
    };

    for command in commands {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Key(key) => report_result(trainer.press(key), announcer, &mut screen)?,
        }
    }
    Ok(())
}

fn report_result<A: Announcer>(
    result: Result<Vec<Feedback>, DictationError>,
    announcer: &mut A,
    screen: &mut std::io::Stdout,
) -> Result<()> {
    let feedback = match result {
        Ok(feedback) => feedback,
        Err(DictationError::Persistence(e)) => {
            error!(error = %e, "progress not saved, session stopped");
            vec![Feedback::Speak(
                "Не удалось сохранить результат. Диктант остановлен".to_owned(),
            )]
        }
        Err(e) => {
            warn!(error = %e, "dictation request rejected");
            vec![Feedback::Display(format!("Ошибка: {e}"))]
        }
    };
    trainer::render(&feedback, announcer, screen)
}
