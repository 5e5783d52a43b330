use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use testme_core::LearningState;

#[derive(Debug, Parser, Clone)]
#[command(name = "testme", version, about = "TestMe flashcards: daily spaced-repetition study")]
pub struct Cli {
    /// Store file (defaults to the app data dir)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Number of timestamped backups to keep
    #[arg(long, default_value_t = 10)]
    pub backups: usize,

    /// Use UTC day boundaries instead of the local time zone
    #[arg(long)]
    pub utc: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Study today's due and new cards
    Study(StudyCmd),
    /// Show today's plan and progress
    Today,
    /// Learning settings
    #[command(subcommand)]
    Settings(SettingsCmd),
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Import cards
    #[command(subcommand)]
    Import(ImportCmd),
    /// Export cards
    #[command(subcommand)]
    Export(ExportCmd),
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    /// Stop after this many answers
    #[arg(long)]
    pub max: Option<usize>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum SettingsCmd {
    Show,
    Set(SettingsSet),
}

#[derive(Debug, Args, Clone)]
pub struct SettingsSet {
    #[arg(long)]
    pub new_limit: Option<u32>,
    #[arg(long)]
    pub review_limit: Option<u32>,
    #[arg(long)]
    pub personalized: Option<bool>,
    #[arg(long)]
    pub spaced_repetition: Option<bool>,
    #[arg(long)]
    pub reminder: Option<bool>,
    /// Reminder time, HH:MM
    #[arg(long, value_parser = parse_time)]
    pub reminder_time: Option<NaiveTime>,
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl From<StateArg> for LearningState {
    fn from(s: StateArg) -> Self {
        match s {
            StateArg::New => LearningState::New,
            StateArg::Learning => LearningState::Learning,
            StateArg::Reviewing => LearningState::Reviewing,
            StateArg::Mastered => LearningState::Mastered,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List(CardList),
    Rm { card_id: String },
    /// Mark a card learned (or unmark with --unset)
    Learned {
        card_id: String,
        #[arg(long)]
        unset: bool,
    },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub term: String,
    #[arg(long)]
    pub definition: String,
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CardList {
    #[arg(long, value_enum)]
    pub state: Option<StateArg>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ImportCmd {
    Csv {
        path: PathBuf,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Csv { path: PathBuf },
}
