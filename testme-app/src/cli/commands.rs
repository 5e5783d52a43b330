use crate::cli::opts::*;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;
use testme_core::{
    filter_by_category, filter_by_state, filter_by_text, Card, CardRepository, CoreError, LearningSession,
    LearningState, Quality, StorageProvider, StudyCalendar,
};
use testme_json::{paths, JsonStore};
use uuid::Uuid;

pub fn run_cli(args: Cli) -> Result<()> {
    let store = Arc::new(open_store(&args)?);
    let calendar = if args.utc { StudyCalendar::utc() } else { StudyCalendar::local() };

    match args.cmd {
        Command::Study(cmd) => study_cmd(store, calendar, cmd),
        Command::Today => today_cmd(store, calendar),
        Command::Settings(cmd) => settings_cmd(store, calendar, cmd),
        Command::Card(cmd) => card_cmd(store, calendar, cmd),
        Command::Import(cmd) => import_cmd(store, cmd),
        Command::Export(cmd) => export_cmd(store, cmd),
    }
}

pub fn open_store(args: &Cli) -> Result<JsonStore> {
    let (file, backups) = paths::store_paths(args.data_file.as_deref());
    let store = JsonStore::open_with(file, backups, args.backups)?;
    log::debug!("using store {}", store.path().display());
    Ok(store)
}

fn start_session(store: &Arc<JsonStore>, calendar: StudyCalendar) -> LearningSession {
    LearningSession::start(store.clone(), store.clone(), calendar, Utc::now())
}

fn report(warnings: Vec<CoreError>) {
    for w in warnings {
        match w {
            CoreError::EmptyDeck => println!("no cards yet; add some with `testme card add`"),
            other => eprintln!("warning: {other}"),
        }
    }
}

fn study_cmd(store: Arc<JsonStore>, calendar: StudyCalendar, cmd: StudyCmd) -> Result<()> {
    let mut session = start_session(&store, calendar);
    report(session.take_warnings());

    let stdin = stdin();
    let mut input = stdin.lock();
    let total = session.queue().len();
    let mut answered = 0usize;
    loop {
        if cmd.max.is_some_and(|max| answered >= max) {
            break;
        }
        let now = Utc::now();
        let Some(card) = session.next_card(now).cloned() else {
            break;
        };

        println!("\n[{}/{}] {}", session.queue().position() + 1, total, state_label(&card));
        println!("Q: {}", card.term);
        if prompt(&mut input, "[enter=show]")?.is_none() {
            break;
        }
        println!("A: {}", card.definition);
        println!("[0=Again, 3=Hard, 4=Good, 5=Easy, s=skip, q=quit]");

        match ask_quality(&mut input)? {
            Reply::Answer(q) => {
                let updated = session.answer(q, Utc::now())?;
                answered += 1;
                if let Some(next) = updated.next_review_date {
                    println!("→ next review {}", next.with_timezone(&calendar.offset()).format("%Y-%m-%d"));
                }
            }
            Reply::Skip => session.skip(),
            Reply::Quit => break,
        }
        report(session.take_warnings());
    }

    if session.is_finished() {
        println!("\nsession complete");
    }
    print_progress(&session);
    Ok(())
}

fn today_cmd(store: Arc<JsonStore>, calendar: StudyCalendar) -> Result<()> {
    let mut session = start_session(&store, calendar);
    report(session.take_warnings());
    let plan = session.plan();
    println!("due reviews: {}", plan.due_reviews.len());
    for c in &plan.due_reviews {
        println!("  {}\t{}", c.id, c.term);
    }
    println!("new cards: {}", plan.new_cards.len());
    for c in &plan.new_cards {
        println!("  {}\t{}", c.id, c.term);
    }
    print_progress(&session);
    Ok(())
}

fn print_progress(session: &LearningSession) {
    let s = session.stats();
    println!(
        "today: reviewed {} ({:.0}% correct), remaining {} new + {} reviews",
        s.reviewed_cards,
        s.percent_correct(),
        s.remaining_new,
        s.remaining_reviews
    );
}

fn settings_cmd(store: Arc<JsonStore>, calendar: StudyCalendar, cmd: SettingsCmd) -> Result<()> {
    let mut session = start_session(&store, calendar);
    report(session.take_warnings());
    match cmd {
        SettingsCmd::Show => {
            println!("{}", serde_json::to_string_pretty(session.settings())?);
            print_progress(&session);
        }
        SettingsCmd::Set(s) => {
            let mut settings = session.settings().clone();
            if let Some(v) = s.new_limit { settings.daily_new_cards_limit = v; }
            if let Some(v) = s.review_limit { settings.daily_review_cards_limit = v; }
            if let Some(v) = s.personalized { settings.use_personalized_learning = v; }
            if let Some(v) = s.spaced_repetition { settings.spaced_repetition_enabled = v; }
            if let Some(v) = s.reminder { settings.show_start_learning_reminder = v; }
            if let Some(t) = s.reminder_time { settings.reminder_time = Some(t); }
            session.update_settings(settings, Utc::now());
            report(session.take_warnings());
            println!("ok; today: {} due, {} new", session.plan().due_reviews.len(), session.plan().new_cards.len());
        }
    }
    Ok(())
}

fn card_cmd(store: Arc<JsonStore>, calendar: StudyCalendar, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let category = parse_category(a.category.as_deref())?;
            let card = Card::new(category, a.term, a.definition);
            store.insert(&card)?;
            println!("{}", card.id);
        }
        CardCmd::List(l) => {
            let mut cards = store.all_cards()?;
            if let Some(state) = l.state { cards = filter_by_state(&cards, state.into()); }
            if let Some(cat) = l.category { cards = filter_by_category(&cards, parse_uuid(&cat)?); }
            if let Some(q) = l.query { cards = filter_by_text(&cards, &q); }
            for c in cards {
                let next = c
                    .next_review_date
                    .map(|d| d.with_timezone(&calendar.offset()).format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\t{}\t{}\t{}\treps={}\tef={:.2}\tnext={}",
                    c.id, c.term, c.definition, state_label(&c), c.repetition_count, c.ease_factor, next
                );
            }
        }
        CardCmd::Rm { card_id } => {
            store.remove(parse_uuid(&card_id)?)?;
            println!("ok");
        }
        CardCmd::Learned { card_id, unset } => {
            let mut session = start_session(&store, calendar);
            let card = session.set_learned(parse_uuid(&card_id)?, !unset, Utc::now())?;
            println!("{}\t{}", card.id, state_label(&card));
        }
    }
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct CsvCard {
    term: String,
    definition: String,
    #[serde(default)]
    category: Option<Uuid>,
}

fn import_cmd(store: Arc<JsonStore>, cmd: ImportCmd) -> Result<()> {
    match cmd {
        ImportCmd::Csv { path, category } => {
            let fallback = parse_category(category.as_deref())?;
            let mut rdr = csv::Reader::from_path(&path)?;
            let mut cards = store.all_cards()?;
            let mut added = 0usize;
            for rec in rdr.deserialize::<CsvCard>() {
                let rec = rec?;
                cards.push(Card::new(rec.category.unwrap_or(fallback), rec.term, rec.definition));
                added += 1;
            }
            store.save_cards(&cards)?;
            println!("imported {added}");
        }
    }
    Ok(())
}

fn export_cmd(store: Arc<JsonStore>, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Csv { path } => {
            let mut wtr = csv::Writer::from_path(&path)?;
            for c in store.all_cards()? {
                wtr.serialize(CsvCard {
                    term: c.term,
                    definition: c.definition,
                    category: Some(c.category_id),
                })?;
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

// ===== Helpers =====
fn parse_uuid(s: &str) -> Result<Uuid> { Uuid::parse_str(s).map_err(|_| anyhow!("invalid uuid: {s}")) }

fn parse_category(s: Option<&str>) -> Result<Uuid> { s.map(parse_uuid).unwrap_or(Ok(Uuid::nil())) }

fn state_label(c: &Card) -> &'static str {
    match c.learning_state {
        LearningState::New => "new",
        LearningState::Learning => "learning",
        LearningState::Reviewing => "reviewing",
        LearningState::Mastered => "mastered",
    }
}

enum Reply {
    Answer(Quality),
    Skip,
    Quit,
}

/// Asks until the reply is usable. Closed input counts as quitting.
fn ask_quality(input: &mut impl BufRead) -> Result<Reply> {
    loop {
        let Some(line) = prompt(input, "answer> ")? else {
            return Ok(Reply::Quit);
        };
        match line.trim().to_lowercase().as_str() {
            "s" | "skip" => return Ok(Reply::Skip),
            "q" | "quit" => return Ok(Reply::Quit),
            "a" | "again" => return Ok(Reply::Answer(Quality::Again)),
            "h" | "hard" => return Ok(Reply::Answer(Quality::Hard)),
            "g" | "good" => return Ok(Reply::Answer(Quality::Good)),
            "e" | "easy" => return Ok(Reply::Answer(Quality::Easy)),
            other => match other.parse::<i64>().map(Quality::try_from) {
                Ok(Ok(q)) => return Ok(Reply::Answer(q)),
                Ok(Err(e)) => println!("{e}; enter 0/3/4/5, s, or q"),
                Err(_) => println!("enter 0/3/4/5, s, or q"),
            },
        }
    }
}

/// Prints `label` and reads one line; `None` once the input is closed.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
