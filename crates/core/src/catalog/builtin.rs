use std::collections::BTreeMap;

use super::Catalog;
use crate::model::{
    BadgeCondition, BadgeDefinition, BadgeId, Course, CourseId, Difficulty, Lesson, LessonId,
    QuestionId, QuizQuestion,
};

#[allow(clippy::too_many_arguments)]
fn course(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    color: &str,
    difficulty: Difficulty,
    total_lessons: u32,
    estimated_time: &str,
) -> Course {
    Course {
        id: CourseId::new(id),
        name: name.into(),
        description: description.into(),
        icon: icon.into(),
        color: color.into(),
        difficulty,
        total_lessons,
        estimated_time: estimated_time.into(),
    }
}

fn lesson(id: u32, title: &str, content: &str, duration: u32) -> Lesson {
    Lesson {
        id: LessonId::new(id),
        title: title.into(),
        content: content.trim().into(),
        duration,
    }
}

fn question(
    id: u32,
    lesson_id: u32,
    text: &str,
    options: &[&str],
    correct_answer: usize,
    explanation: &str,
) -> QuizQuestion {
    QuizQuestion {
        id: QuestionId::new(id),
        lesson_id: LessonId::new(lesson_id),
        question: text.into(),
        options: options.iter().map(|o| (*o).to_owned()).collect(),
        correct_answer,
        explanation: explanation.into(),
    }
}

fn badge(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    condition: BadgeCondition,
) -> BadgeDefinition {
    BadgeDefinition {
        id: BadgeId::new(id),
        name: name.into(),
        description: description.into(),
        icon: icon.into(),
        condition,
    }
}

const HTML_INTRO: &str = r"
<h2>What is HTML?</h2>
<p>HTML (HyperText Markup Language) is the standard markup language for building web pages.</p>
<h3>Basic structure:</h3>
<pre><code>&lt;!DOCTYPE html&gt;
&lt;html&gt;
&lt;head&gt;
    &lt;title&gt;My first page&lt;/title&gt;
&lt;/head&gt;
&lt;body&gt;
    &lt;h1&gt;Hello world!&lt;/h1&gt;
&lt;/body&gt;
&lt;/html&gt;</code></pre>
<h3>Essential tags:</h3>
<ul>
  <li><strong>&lt;h1&gt; to &lt;h6&gt;</strong>: headings of different levels</li>
  <li><strong>&lt;p&gt;</strong>: paragraphs</li>
  <li><strong>&lt;a&gt;</strong>: hyperlinks</li>
  <li><strong>&lt;img&gt;</strong>: images</li>
</ul>
";

const HTML_TEXT_TAGS: &str = r"
<h2>Formatting text in HTML</h2>
<h3>Examples of text tags:</h3>
<pre><code>&lt;h1&gt;Main heading&lt;/h1&gt;
&lt;p&gt;A regular paragraph&lt;/p&gt;
&lt;strong&gt;Bold text&lt;/strong&gt;
&lt;em&gt;Italic text&lt;/em&gt;
&lt;mark&gt;Highlighted text&lt;/mark&gt;</code></pre>
<p>These tags structure and format the text content of your pages.</p>
";

const JS_VARIABLES: &str = r#"
<h2>Variables in JavaScript</h2>
<h3>Declaring variables:</h3>
<pre><code>let name = "Alice";
const age = 25;
var city = "Paris";</code></pre>
<h3>Data types:</h3>
<ul>
  <li><strong>String</strong>: "A string of characters"</li>
  <li><strong>Number</strong>: 42, 3.14</li>
  <li><strong>Boolean</strong>: true, false</li>
  <li><strong>Array</strong>: [1, 2, 3]</li>
  <li><strong>Object</strong>: {name: "Alice", age: 25}</li>
</ul>
"#;

pub(super) fn catalog() -> Catalog {
    let courses = vec![
        course(
            "html",
            "HTML",
            "Markup language for building web pages",
            "🌐",
            "bg-gradient-to-br from-orange-500 to-red-500",
            Difficulty::Beginner,
            12,
            "8 hours",
        ),
        course(
            "css",
            "CSS",
            "Style sheet language for laying out the web",
            "🎨",
            "bg-gradient-to-br from-blue-500 to-cyan-500",
            Difficulty::Beginner,
            15,
            "12 hours",
        ),
        course(
            "javascript",
            "JavaScript",
            "Programming language for web interactivity",
            "⚡",
            "bg-gradient-to-br from-yellow-500 to-orange-500",
            Difficulty::Intermediate,
            20,
            "25 hours",
        ),
        course(
            "python",
            "Python",
            "Versatile language for development and data science",
            "🐍",
            "bg-gradient-to-br from-green-500 to-emerald-500",
            Difficulty::Beginner,
            18,
            "20 hours",
        ),
        course(
            "php",
            "PHP",
            "Server-side language for web development",
            "🔧",
            "bg-gradient-to-br from-purple-500 to-indigo-500",
            Difficulty::Intermediate,
            16,
            "18 hours",
        ),
        course(
            "java",
            "Java",
            "Object-oriented language for enterprise applications",
            "☕",
            "bg-gradient-to-br from-red-600 to-orange-600",
            Difficulty::Advanced,
            24,
            "35 hours",
        ),
    ];

    let mut lessons = BTreeMap::new();
    lessons.insert(
        CourseId::new("html"),
        vec![
            lesson(1, "Introduction to HTML", HTML_INTRO, 30),
            lesson(2, "Text tags", HTML_TEXT_TAGS, 25),
        ],
    );
    lessons.insert(
        CourseId::new("javascript"),
        vec![lesson(1, "Variables and data types", JS_VARIABLES, 35)],
    );

    let mut quizzes = BTreeMap::new();
    quizzes.insert(
        CourseId::new("html"),
        vec![
            question(
                1,
                1,
                "Which tag defines the main heading of a page?",
                &["<title>", "<h1>", "<header>", "<main>"],
                1,
                "The <h1> tag defines the main heading visible on the page.",
            ),
            question(
                2,
                1,
                "What does HTML stand for?",
                &[
                    "Hyper Transfer Markup Language",
                    "HyperText Markup Language",
                    "High Tech Modern Language",
                    "Hyper Technical Meta Language",
                ],
                1,
                "HTML stands for HyperText Markup Language.",
            ),
        ],
    );
    quizzes.insert(
        CourseId::new("javascript"),
        vec![question(
            1,
            1,
            "What is the difference between 'let' and 'const'?",
            &[
                "There is no difference",
                "let is for numbers, const for strings",
                "const cannot be reassigned after declaration",
                "let is faster than const",
            ],
            2,
            "A variable declared with 'const' cannot be reassigned after its initial declaration.",
        )],
    );

    let badges = vec![
        badge(
            "html_starter",
            "HTML Beginner",
            "First HTML lesson completed",
            "🌱",
            BadgeCondition::LessonsCompleted {
                course: CourseId::new("html"),
                count: 1,
            },
        ),
        badge(
            "html_master",
            "HTML Master",
            "Every HTML lesson completed",
            "👑",
            BadgeCondition::LessonsCompleted {
                course: CourseId::new("html"),
                count: 12,
            },
        ),
        badge(
            "quiz_champion",
            "Quiz Champion",
            "10 quizzes passed with 100%",
            "🏆",
            BadgeCondition::PerfectQuizzes { count: 10 },
        ),
        badge(
            "polyglot",
            "Polyglot",
            "3 languages started",
            "🌍",
            BadgeCondition::CoursesStarted { count: 3 },
        ),
    ];

    Catalog {
        courses,
        lessons,
        quizzes,
        badges,
    }
}
