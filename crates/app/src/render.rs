//! Plain-text rendering of service results for the terminal.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use learn_core::Catalog;
use learn_core::model::{BadgeId, Course, Lesson};
use learn_core::stats::{Activity, CourseStats, ScoreBand};
use services::{CourseOverview, Dashboard, LessonCompletion, QuizOutcome};

/// Lesson bodies are HTML. Strip anything outside the lesson markup, then
/// turn it into markdown that reads well in a terminal.
#[must_use]
pub fn lesson_text(html: &str) -> String {
    let tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "p", "br", "em", "strong", "b", "i", "mark", "code", "pre",
        "blockquote", "ul", "ol", "li", "a",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    let clean = ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string();
    html2md::parse_html(&clean).trim().to_owned()
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::High => "Excellent",
        ScoreBand::Medium => "Good",
        ScoreBand::Low => "Needs work",
    }
}

fn progress_bar(percentage: u32) -> String {
    let filled = usize::try_from(percentage.min(100) / 5).unwrap_or(0);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

fn write_new_badges(out: &mut impl Write, catalog: &Catalog, badges: &[BadgeId]) -> io::Result<()> {
    for id in badges {
        match catalog.badges().iter().find(|b| &b.id == id) {
            Some(badge) => writeln!(out, "Badge earned: {} {}", badge.icon, badge.name)?,
            None => writeln!(out, "Badge earned: {id}")?,
        }
    }
    Ok(())
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

pub fn courses(out: &mut impl Write, stats: &[CourseStats]) -> io::Result<()> {
    for course in stats {
        writeln!(
            out,
            "{} {:<12} {:<13} {} {:>3}%  {}/{} lessons",
            course.icon,
            course.course_id.as_str(),
            course.difficulty.label(),
            progress_bar(course.percentage),
            course.percentage,
            course.completed,
            course.total,
        )?;
    }
    Ok(())
}

pub fn course_overview(out: &mut impl Write, overview: &CourseOverview) -> io::Result<()> {
    let course = &overview.course;
    writeln!(out, "{} {} ({})", course.icon, course.name, course.difficulty)?;
    writeln!(out, "{}", course.description)?;
    writeln!(
        out,
        "{} lessons, about {}",
        course.total_lessons, course.estimated_time
    )?;
    writeln!(
        out,
        "Progress: {} {}% ({}/{})",
        progress_bar(overview.percentage),
        overview.percentage,
        overview.completed,
        course.total_lessons
    )?;
    writeln!(out)?;

    if overview.lessons.is_empty() {
        writeln!(out, "No lessons available yet.")?;
    }
    for entry in &overview.lessons {
        let mark = if entry.completed { "x" } else { " " };
        let quiz = if entry.has_quiz { "  [quiz]" } else { "" };
        writeln!(
            out,
            "[{mark}] {:>2}. {} ({} min){quiz}",
            entry.lesson.id.value(),
            entry.lesson.title,
            entry.lesson.duration
        )?;
    }
    Ok(())
}

pub fn lesson(
    out: &mut impl Write,
    course: &Course,
    lesson: &Lesson,
    completed: bool,
    next: Option<&Lesson>,
) -> io::Result<()> {
    writeln!(out, "{} / Lesson {}: {}", course.name, lesson.id, lesson.title)?;
    writeln!(out, "{} min", lesson.duration)?;
    if completed {
        writeln!(out, "Completed")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", lesson_text(&lesson.content))?;
    writeln!(out)?;
    match next {
        Some(next) => writeln!(out, "Next: lesson {} - {}", next.id, next.title),
        None => writeln!(out, "This is the last lesson of the course."),
    }
}

//
// ─── MUTATIONS ─────────────────────────────────────────────────────────────────
//

pub fn completion(
    out: &mut impl Write,
    catalog: &Catalog,
    done: &LessonCompletion,
) -> io::Result<()> {
    if done.newly_completed {
        writeln!(
            out,
            "Lesson {} completed: +{} points (total {})",
            done.key,
            done.points_awarded,
            done.progress.total_points()
        )?;
    } else {
        writeln!(
            out,
            "Lesson {} was already completed (total {} points)",
            done.key,
            done.progress.total_points()
        )?;
    }
    write_new_badges(out, catalog, &done.new_badges)
}

pub fn quiz_outcome(out: &mut impl Write, catalog: &Catalog, outcome: &QuizOutcome) -> io::Result<()> {
    let grade = &outcome.grade;
    for (number, review) in grade.reviews.iter().enumerate() {
        let mark = if review.is_correct { "✓" } else { "✗" };
        writeln!(out, "{mark} Question {}: {}", number + 1, review.question)?;
        for (index, option) in review.options.iter().enumerate() {
            let note = if index == review.correct_answer {
                "  <- correct answer"
            } else if Some(index) == review.selected {
                "  <- your answer"
            } else {
                ""
            };
            writeln!(out, "    {index}) {option}{note}")?;
        }
        writeln!(out, "    Explanation: {}", review.explanation)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Score: {}/{} ({}%) - {}",
        grade.score,
        grade.max_score,
        grade.percentage,
        band_label(grade.band)
    )?;
    if outcome.record.bonus_points > 0 {
        writeln!(
            out,
            "Perfect score bonus: +{} points (total {})",
            outcome.record.bonus_points,
            outcome.record.progress.total_points()
        )?;
    }
    write_new_badges(out, catalog, &outcome.record.new_badges)
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

fn activity_line(activity: &Activity) -> String {
    match activity {
        Activity::LessonCompleted { key, course_name } => format!(
            "Completed lesson {} of {}",
            key.lesson(),
            course_name.as_deref().unwrap_or(key.course().as_str())
        ),
        Activity::QuizTaken {
            key,
            course_name,
            percentage,
            band,
        } => format!(
            "Quiz on lesson {} of {}: {percentage}% ({})",
            key.lesson(),
            course_name.as_deref().unwrap_or(key.course().as_str()),
            band_label(*band)
        ),
    }
}

pub fn dashboard(out: &mut impl Write, dashboard: &Dashboard) -> io::Result<()> {
    let totals = &dashboard.totals;
    writeln!(out, "Points:            {}", totals.total_points)?;
    writeln!(out, "Lessons completed: {}", totals.lessons_completed)?;
    writeln!(out, "Quizzes completed: {}", totals.quizzes_completed)?;
    writeln!(
        out,
        "Badges:            {}/{}",
        dashboard.earned_count, dashboard.badge_count
    )?;
    writeln!(out, "Streak:            {} days", totals.current_streak)?;

    writeln!(out)?;
    writeln!(out, "Courses")?;
    for course in &dashboard.courses {
        write!(
            out,
            "  {} {:<12} {:>3}% ({}/{})",
            course.icon, course.name, course.percentage, course.completed, course.total
        )?;
        if course.quizzes_taken > 0 {
            write!(
                out,
                "  quizzes: {}, average {}%",
                course.quizzes_taken, course.average_quiz_percentage
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "Badges")?;
    for status in &dashboard.badges {
        let mark = if status.earned { "x" } else { " " };
        writeln!(
            out,
            "  [{mark}] {} {} - {}",
            status.badge.icon, status.badge.name, status.badge.description
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Recent activity")?;
    if dashboard.recent_activity.is_empty() {
        writeln!(out, "  Nothing yet. Start with a lesson!")?;
    }
    for activity in dashboard.recent_activity.iter().rev() {
        writeln!(out, "  {}", activity_line(activity))?;
    }
    Ok(())
}
