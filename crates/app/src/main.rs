use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lingo_core::model::{SessionId, StudyMode, UserId};
use services::ai::{AiContentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use services::{AppServices, Clock, SessionError, SessionRequest};

mod db;
mod logging;
mod presets;
mod study;

#[derive(Parser)]
#[command(name = "lingo")]
#[command(about = "Topic-based vocabulary study: flashcards, then generated exercises", long_about = None)]
struct Cli {
    /// SQLite database (path, `sqlite:` or `sqlite://` URL).
    #[arg(long, env = "LINGO_DB_URL", default_value = "sqlite://lingo.sqlite3", global = true)]
    db: String,

    /// Learner whose sessions are read and written.
    #[arg(long, env = "LINGO_USER", default_value = "local", global = true)]
    user: UserId,

    #[arg(long, env = "LINGO_AI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[arg(long, env = "LINGO_AI_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_base_url: String,

    #[arg(long, env = "LINGO_AI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a word list and start a new session
    New {
        /// Topic text, or a preset number from `lingo presets`
        topic: String,
        /// Level text, or a preset number from `lingo presets`
        #[arg(long, default_value = presets::DEFAULT_LEVEL)]
        level: String,
        /// Number of words (clamped to 3..=50)
        #[arg(long, default_value_t = services::sessions::DEFAULT_WORDS)]
        count: usize,
        /// vocabulary, synonyms, antonyms or phrasal-verbs
        #[arg(long, default_value = "vocabulary")]
        mode: StudyMode,
        /// Create the session without studying it right away
        #[arg(long)]
        no_study: bool,
    },
    /// List your sessions, newest first
    List,
    /// Continue studying a session
    Study { id: SessionId },
    /// Show a session's progress and summary
    Show { id: SessionId },
    /// Look a term up in the AI dictionary
    Lookup { term: String },
    /// List preset topics, levels and word counts
    Presets,
}

impl Cli {
    fn ai_config(&self) -> Option<AiContentConfig> {
        let key = self.api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        let defaults = AiContentConfig::from_env().unwrap_or_else(|| AiContentConfig::new(key));
        Some(AiContentConfig {
            base_url: self.api_base_url.clone(),
            api_key: key.to_string(),
            model: self.model.clone(),
            ..defaults
        })
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_url = db::normalize_sqlite_url(&cli.db);
    // Open + migrate SQLite at startup; core and services stay storage-agnostic.
    db::prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, Clock::default_clock(), cli.ai_config())
        .await
        .with_context(|| format!("opening {db_url}"))?;
    let study_svc = services.study();
    let user = &cli.user;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::New {
            topic,
            level,
            count,
            mode,
            no_study,
        } => {
            if !services.content_enabled() {
                anyhow::bail!("set LINGO_AI_API_KEY (or --api-key) to generate vocabulary");
            }
            let topic = presets::resolve(topic, presets::TOPICS);
            let level = presets::resolve(level, presets::LEVELS);
            let request = SessionRequest::new(user.clone(), topic.clone(), level)
                .with_word_count(*count)
                .with_mode(*mode);
            writeln!(out, "Generating {} words about '{topic}'...", request.clamped_word_count())?;
            let mut active = match study_svc.create_session(&request).await {
                Ok(active) => active,
                Err(SessionError::GenerationFailed) => {
                    anyhow::bail!("could not generate vocabulary; try again or change the topic")
                }
                Err(err) => return Err(err.into()),
            };
            writeln!(out, "Session {} created.", active.session().id())?;
            if !no_study {
                let mut input = std::io::stdin().lock();
                study::study(&study_svc, &mut active, &mut input, &mut out).await?;
            }
        }
        Command::List => {
            let sessions = study_svc.list_sessions(user).await?;
            if sessions.is_empty() {
                writeln!(out, "No sessions yet. Start one with `lingo new <topic>`.")?;
            }
            for session in &sessions {
                writeln!(out, "{}", study::session_line(session))?;
            }
        }
        Command::Study { id } => {
            let mut active = study_svc.resume(*id, user).await?;
            let mut input = std::io::stdin().lock();
            study::study(&study_svc, &mut active, &mut input, &mut out).await?;
        }
        Command::Show { id } => {
            let machine = study_svc.inspect(*id, user).await?;
            writeln!(out, "{}", study::session_line(machine.session()))?;
            writeln!(
                out,
                "phase {}, step {}, {} words, {} exercises",
                machine.phase(),
                machine.session().current_step(),
                machine.session().total_words(),
                machine.exercise_count()
            )?;
            study::render_summary(&mut out, machine.session(), &machine.summary())?;
        }
        Command::Lookup { term } => match study_svc.lookup_word(term).await {
            Some(entry) => {
                writeln!(out, "{}  {}  ({})", entry.word, entry.phonetic, entry.pos)?;
                writeln!(out, "  {}", entry.meaning)?;
                writeln!(out, "  {}", entry.example_en)?;
                writeln!(out, "  {}", entry.example_vn)?;
            }
            None => writeln!(out, "No entry found for '{term}'.")?,
        },
        Command::Presets => presets::render(&mut out)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
