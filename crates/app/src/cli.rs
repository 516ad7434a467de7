//! Command-line surface of the `codelearn` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use learn_core::model::{CourseId, LessonId};
use storage::repository::DEFAULT_STORAGE_KEY;

/// Follow programming courses, take quizzes and track your progress.
#[derive(Debug, Parser)]
#[command(name = "codelearn", version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// SQLite database holding the progress document
    #[arg(
        long = "db",
        env = "CODELEARN_DB_URL",
        default_value = "sqlite://codelearn.sqlite3",
        global = true
    )]
    pub db_url: String,

    /// Slot name the progress document is stored under
    #[arg(long, env = "CODELEARN_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub storage_key: String,

    /// Course catalog JSON file (built-in catalog when absent)
    #[arg(long, env = "CODELEARN_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Log filter, e.g. `info` or `services=debug`
    #[arg(long = "log", env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List courses with your completion percentage
    Courses,

    /// Show a course and its lessons
    Course { course: CourseId },

    /// Read a lesson
    Lesson {
        course: CourseId,
        lesson: LessonId,
        /// Mark the lesson complete after showing it
        #[arg(long)]
        complete: bool,
    },

    /// Mark a lesson complete
    Complete { course: CourseId, lesson: LessonId },

    /// Take a lesson quiz
    Quiz {
        course: CourseId,
        lesson: LessonId,
        /// Zero-based answer per question, comma separated
        #[arg(long, required = true, value_delimiter = ',', num_args = 1..)]
        answers: Vec<usize>,
    },

    /// Points, course statistics, badges and recent activity
    Dashboard,

    /// Print the stored progress document as JSON
    Progress,

    /// Discard all progress
    Reset,
}
