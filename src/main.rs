use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use study_engine::database::db;
use study_engine::export::json::{export_subject_to_path, import_subject};
use study_engine::models::{
    AccuracyTier, QuizAttempt, Subject, Topic, TopicStatus, attempt_history, daily_progress,
    global_stats, study_plan, subject_mastery,
};
use study_engine::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Track study subjects, review schedules and streaks")]
struct Cli {
    /// SQLite database file (overrides STUDY_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Owner whose subjects are shown (overrides STUDY_OWNER)
    #[arg(long)]
    owner: Option<String>,

    /// Pretend the current time is this RFC 3339 timestamp
    #[arg(long)]
    now: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Streak, daily goal, study plan and mastery overview
    Dashboard,
    /// Create a sample subject if the owner has none
    Seed,
    /// Create a new subject
    AddSubject {
        name: String,
        #[arg(long, default_value = "book")]
        icon: String,
    },
    /// Add a topic to a subject, with content inline or from a text file
    AddTopic {
        subject: String,
        name: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
    },
    /// Delete a topic with its quiz history and notes
    DeleteTopic { subject: String, topic: String },
    /// Attach a note to a topic
    AddNote {
        subject: String,
        topic: String,
        text: String,
    },
    /// Remove a note from a topic by its id
    RemoveNote {
        subject: String,
        topic: String,
        note_id: String,
    },
    /// Record a finished quiz on a topic
    Quiz {
        subject: String,
        topic: String,
        score: u32,
        total: u32,
        #[arg(long)]
        retry: bool,
    },
    /// Delete a subject with all its topics
    DeleteSubject { subject: String },
    /// List every attempt, newest first
    History,
    /// Write a subject to a JSON file
    Export { subject: String, path: PathBuf },
    /// Load a subject from a JSON file
    Import { path: PathBuf },
}

struct Session {
    conn: Connection,
    config: Config,
    now: DateTime<FixedOffset>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db_path) = cli.db {
        config.db_path = db_path;
    }
    if let Some(owner) = cli.owner {
        config.owner_id = owner;
    }

    let now = match cli.now.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --now timestamp '{}'", raw))?,
        None => Local::now().fixed_offset(),
    };

    let conn = db::init_database(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;

    let session = Session { conn, config, now };

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Dashboard => session.dashboard(),
        Command::Seed => session.seed(),
        Command::AddSubject { name, icon } => session.add_subject(&name, &icon),
        Command::AddTopic {
            subject,
            name,
            content,
            file,
        } => {
            let content = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => content.unwrap_or_default(),
            };
            session.add_topic(&subject, &name, &content)
        }
        Command::DeleteTopic { subject, topic } => session.delete_topic(&subject, &topic),
        Command::AddNote {
            subject,
            topic,
            text,
        } => session.add_note(&subject, &topic, &text),
        Command::RemoveNote {
            subject,
            topic,
            note_id,
        } => session.remove_note(&subject, &topic, &note_id),
        Command::Quiz {
            subject,
            topic,
            score,
            total,
            retry,
        } => session.quiz(&subject, &topic, score, total, retry),
        Command::DeleteSubject { subject } => session.delete_subject(&subject),
        Command::History => session.history(),
        Command::Export { subject, path } => session.export(&subject, &path),
        Command::Import { path } => session.import(&path),
    }
}

/// Matches by id first, then by case-insensitive name.
fn find_subject<'a>(subjects: &'a [Subject], key: &str) -> Result<&'a Subject> {
    subjects
        .iter()
        .find(|s| s.id == key)
        .or_else(|| subjects.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| anyhow!("no subject named '{}'", key))
}

fn find_topic<'a>(subject: &'a Subject, key: &str) -> Result<&'a Topic> {
    subject
        .topics
        .iter()
        .find(|t| t.id == key)
        .or_else(|| subject.topics.iter().find(|t| t.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| anyhow!("no topic named '{}' in '{}'", key, subject.name))
}

fn status_label(status: TopicStatus) -> &'static str {
    match status {
        TopicStatus::Pending => "pending",
        TopicStatus::InProgress => "in progress",
        TopicStatus::Mastered => "mastered",
    }
}

fn tier_label(tier: AccuracyTier) -> &'static str {
    match tier {
        AccuracyTier::Excellent => "excellent",
        AccuracyTier::Good => "good",
        AccuracyTier::Fair => "fair",
        AccuracyTier::Poor => "needs work",
    }
}

impl Session {
    fn subjects(&self) -> Result<Vec<Subject>> {
        db::get_subjects(&self.config.owner_id, &self.conn).context("failed to load subjects")
    }

    fn format_local(&self, date: DateTime<chrono::Utc>) -> String {
        date.with_timezone(&self.now.timezone())
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    fn dashboard(&self) -> Result<()> {
        let subjects = self.subjects()?;
        let streak = db::load_streak(&self.config.owner_id, &self.conn)?;
        let progress = daily_progress(&subjects, &self.now, self.config.daily_goal);

        println!("Streak: {} days", streak.count);
        if progress.goal_reached() {
            println!(
                "Daily goal: {}/{} ({}%) - goal reached!",
                progress.completed, progress.goal, progress.percent
            );
        } else {
            println!(
                "Daily goal: {}/{} ({}%) - {} reviews to go",
                progress.completed,
                progress.goal,
                progress.percent,
                progress.remaining()
            );
        }

        let plan = study_plan(&subjects, &self.now);
        println!();
        if plan.is_empty() {
            println!("Nothing due for review.");
        } else {
            println!("Due for review ({}):", plan.len());
            for entry in &plan {
                if let Some(due) = entry.topic.next_review_date {
                    println!(
                        "  - {} / {} (due {})",
                        entry.subject_name,
                        entry.topic.name,
                        self.format_local(due)
                    );
                }
            }
        }

        println!();
        for subject in &subjects {
            println!(
                "{} - {}% mastered, {} due, {} notes",
                subject.name,
                subject_mastery(subject, self.config.mastery_threshold),
                subject.due_count(&self.now),
                subject.note_count()
            );
            for topic in &subject.topics {
                let last = topic
                    .latest_attempt()
                    .map(|a| format!(", last {}%", a.percent()))
                    .unwrap_or_default();
                println!(
                    "    {} [{}{}]",
                    topic.name,
                    status_label(topic.status(self.config.mastery_threshold)),
                    last
                );
                for note in &topic.notes {
                    println!("        note {}: {}", note.id, note.text);
                }
            }
        }

        let stats = global_stats(&subjects);
        println!();
        println!(
            "{} subjects, {} quizzes, average accuracy {}% ({})",
            stats.subjects,
            stats.total_attempts,
            stats.average_accuracy_percent,
            tier_label(AccuracyTier::from_percent(stats.average_accuracy_percent))
        );
        Ok(())
    }

    fn seed(&self) -> Result<()> {
        if !self.subjects()?.is_empty() {
            println!("Owner '{}' already has subjects.", self.config.owner_id);
            return Ok(());
        }

        let mut subject = Subject::new(&self.config.owner_id, "Biology", "dna");
        subject.topics.push(Topic::new(
            "Cell structure",
            "Cells are the basic unit of life. Eukaryotic cells have a nucleus.",
        ));
        subject.topics.push(Topic::new(
            "Photosynthesis",
            "Plants convert light energy into chemical energy stored in glucose.",
        ));
        subject.topics.push(Topic::new(
            "Genetics",
            "Genes are segments of DNA that encode proteins.",
        ));

        db::create_subject(&subject, &self.conn)?;
        println!("Sample data created!");
        Ok(())
    }

    fn add_subject(&self, name: &str, icon: &str) -> Result<()> {
        let subject = Subject::new(&self.config.owner_id, name, icon);
        db::create_subject(&subject, &self.conn)?;
        println!("Subject '{}' created ({}).", subject.name, subject.id);
        Ok(())
    }

    fn add_topic(&self, subject_key: &str, name: &str, content: &str) -> Result<()> {
        let subjects = self.subjects()?;
        let mut subject = find_subject(&subjects, subject_key)?.clone();
        if subject.topics.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            bail!("topic '{}' already exists in '{}'", name, subject.name);
        }

        let topic = Topic::new(name, content);
        println!("Topic '{}' added to '{}'.", topic.name, subject.name);
        subject.topics.push(topic);
        db::update_subject(&subject, &self.conn)?;
        Ok(())
    }

    fn delete_topic(&self, subject_key: &str, topic_key: &str) -> Result<()> {
        let subjects = self.subjects()?;
        let mut subject = find_subject(&subjects, subject_key)?.clone();
        let topic_id = find_topic(&subject, topic_key)?.id.clone();

        if let Some(topic) = subject.remove_topic(&topic_id) {
            db::update_subject(&subject, &self.conn)?;
            println!("Topic '{}' deleted from '{}'.", topic.name, subject.name);
        }
        Ok(())
    }

    fn add_note(&self, subject_key: &str, topic_key: &str, text: &str) -> Result<()> {
        let subjects = self.subjects()?;
        let mut subject = find_subject(&subjects, subject_key)?.clone();
        let mut topic = find_topic(&subject, topic_key)?.clone();

        let note_id = topic.add_note(text, self.now.with_timezone(&chrono::Utc));
        subject.replace_topic(topic);
        db::update_subject(&subject, &self.conn)?;
        println!("Note {} added.", note_id);
        Ok(())
    }

    fn remove_note(&self, subject_key: &str, topic_key: &str, note_id: &str) -> Result<()> {
        let subjects = self.subjects()?;
        let mut subject = find_subject(&subjects, subject_key)?.clone();
        let mut topic = find_topic(&subject, topic_key)?.clone();

        if !topic.remove_note(note_id) {
            bail!("no note {} on '{}'", note_id, topic.name);
        }
        subject.replace_topic(topic);
        db::update_subject(&subject, &self.conn)?;
        println!("Note {} removed.", note_id);
        Ok(())
    }

    fn quiz(
        &self,
        subject_key: &str,
        topic_key: &str,
        score: u32,
        total: u32,
        retry: bool,
    ) -> Result<()> {
        let subjects = self.subjects()?;
        let subject = find_subject(&subjects, subject_key)?;
        let topic = find_topic(subject, topic_key)?;

        let attempt = QuizAttempt::new(
            uuid::Uuid::new_v4().to_string(),
            self.now.with_timezone(&chrono::Utc),
            score,
            total,
            Vec::new(),
            Vec::new(),
            retry,
        )?;

        let outcome = db::record_quiz(&subject.id, &topic.id, attempt, &self.now, &self.conn)?;
        println!(
            "Recorded {}/{} on '{}'. Next review in {} days ({}). Streak: {} days.",
            score,
            total,
            outcome.topic.name,
            outcome.interval_days,
            self.format_local(outcome.next_review_date),
            outcome.streak.count
        );
        Ok(())
    }

    fn delete_subject(&self, subject_key: &str) -> Result<()> {
        let subjects = self.subjects()?;
        let subject = find_subject(&subjects, subject_key)?;
        db::delete_subject(&subject.id, &self.conn)?;
        println!("Subject '{}' deleted.", subject.name);
        Ok(())
    }

    fn history(&self) -> Result<()> {
        let subjects = self.subjects()?;
        let history = attempt_history(&subjects);
        if history.is_empty() {
            println!("No quizzes taken yet.");
            return Ok(());
        }

        for entry in history {
            println!(
                "{}  {} / {}: {}/{} ({}%){}",
                self.format_local(entry.attempt.date()),
                entry.subject_name,
                entry.topic_name,
                entry.attempt.score(),
                entry.attempt.total(),
                entry.attempt.percent(),
                if entry.attempt.is_retry() { " retry" } else { "" }
            );
        }
        Ok(())
    }

    fn export(&self, subject_key: &str, path: &Path) -> Result<()> {
        let subjects = self.subjects()?;
        let subject = find_subject(&subjects, subject_key)?;
        export_subject_to_path(subject, path)?;
        println!("Subject '{}' exported to {}.", subject.name, path.display());
        Ok(())
    }

    fn import(&self, path: &Path) -> Result<()> {
        let subject = import_subject(path)
            .with_context(|| format!("failed to import {}", path.display()))?;
        let subject = db::save_imported_subject(subject, &self.config.owner_id, &self.conn)?;
        println!(
            "Subject '{}' imported with {} topics.",
            subject.name,
            subject.topics.len()
        );
        Ok(())
    }
}
