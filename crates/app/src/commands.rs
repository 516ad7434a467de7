use std::io::Write;

use anyhow::{Context, Result, anyhow};
use learn_core::model::LessonKey;
use learn_core::stats::course_stats;
use services::AppServices;

use crate::cli::Command;
use crate::render;

/// Run one subcommand against the assembled services, writing its output.
pub async fn execute(command: Command, services: &AppServices, out: &mut impl Write) -> Result<()> {
    let store = services.progress_store();
    let catalog = services.catalog_service();

    match command {
        Command::Courses => {
            let progress = store.load().await?;
            render::courses(out, &course_stats(&progress, store.catalog()))?;
        }
        Command::Course { course } => {
            let progress = store.load().await?;
            let overview = catalog
                .overview(&progress, &course)
                .ok_or_else(|| anyhow!("unknown course `{course}`"))?;
            render::course_overview(out, &overview)?;
        }
        Command::Lesson {
            course,
            lesson,
            complete,
        } => {
            let info = catalog
                .course(&course)
                .ok_or_else(|| anyhow!("unknown course `{course}`"))?;
            let body = catalog
                .lesson(&course, lesson)
                .ok_or_else(|| anyhow!("lesson {lesson} of `{course}` not found"))?;
            let next = catalog.next_lesson(&course, lesson);

            let progress = store.load().await?;
            let completed = progress.is_lesson_completed(&LessonKey::new(course.clone(), lesson));
            render::lesson(out, info, body, completed, next)?;

            if complete {
                writeln!(out)?;
                let done = store.complete_lesson(course, lesson).await?;
                render::completion(out, store.catalog(), &done)?;
            }
        }
        Command::Complete { course, lesson } => {
            let done = store.complete_lesson(course, lesson).await?;
            render::completion(out, store.catalog(), &done)?;
        }
        Command::Quiz {
            course,
            lesson,
            answers,
        } => {
            let outcome = services
                .quiz_service()
                .take(course, lesson, &answers)
                .await?;
            render::quiz_outcome(out, store.catalog(), &outcome)?;
        }
        Command::Dashboard => {
            let dashboard = services.dashboard_service().snapshot().await?;
            render::dashboard(out, &dashboard)?;
        }
        Command::Progress => {
            let progress = store.load().await?;
            let json = serde_json::to_string_pretty(&progress)
                .context("failed to encode progress document")?;
            writeln!(out, "{json}")?;
        }
        Command::Reset => {
            store.reset().await?;
            writeln!(out, "Progress reset.")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use learn_core::Catalog;
    use learn_core::model::{CourseId, LessonId};
    use learn_core::time::fixed_clock;

    async fn services() -> AppServices {
        AppServices::in_memory(Catalog::builtin(), fixed_clock())
            .await
            .unwrap()
    }

    async fn run(services: &AppServices, command: Command) -> String {
        let mut out = Vec::new();
        execute(command, services, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn lesson_with_complete_prints_points_and_badge() {
        let services = services().await;
        let text = run(
            &services,
            Command::Lesson {
                course: CourseId::new("html"),
                lesson: LessonId::new(1),
                complete: true,
            },
        )
        .await;

        assert!(text.contains("Introduction to HTML"));
        assert!(text.contains("Next: lesson 2"));
        assert!(text.contains("Lesson html_1 completed: +10 points (total 10)"));
        assert!(text.contains("Badge earned: 🌱 HTML Beginner"));
    }

    #[tokio::test]
    async fn completing_twice_reports_no_points() {
        let services = services().await;
        let complete = Command::Complete {
            course: CourseId::new("html"),
            lesson: LessonId::new(2),
        };
        run(&services, complete.clone()).await;
        let text = run(&services, complete).await;
        assert!(text.contains("already completed (total 10 points)"));
    }

    #[tokio::test]
    async fn quiz_prints_review_and_score() {
        let services = services().await;
        let text = run(
            &services,
            Command::Quiz {
                course: CourseId::new("html"),
                lesson: LessonId::new(1),
                answers: vec![1, 1],
            },
        )
        .await;
        assert!(text.contains("Score: 2/2 (100%) - Excellent"));
        assert!(text.contains("Perfect score bonus: +5 points (total 5)"));
    }

    #[tokio::test]
    async fn unknown_course_is_an_error() {
        let services = services().await;
        let mut out = Vec::new();
        let err = execute(
            Command::Course {
                course: CourseId::new("cobol"),
            },
            &services,
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("cobol"));
    }

    #[tokio::test]
    async fn progress_prints_camel_case_json() {
        let services = services().await;
        let text = run(&services, Command::Progress).await;
        assert!(text.contains("\"completedLessons\""));
        assert!(text.contains("\"totalPoints\": 0"));
    }

    #[tokio::test]
    async fn reset_then_dashboard_is_empty() {
        let services = services().await;
        run(
            &services,
            Command::Complete {
                course: CourseId::new("html"),
                lesson: LessonId::new(1),
            },
        )
        .await;
        run(&services, Command::Reset).await;
        let text = run(&services, Command::Dashboard).await;
        assert!(text.contains("Points:            0"));
        assert!(text.contains("Nothing yet"));
    }
}
