//! Parent-facing student progress prompt.

use std::fmt::Write;

use deckgen_shared::Record;

/// Column holding the student's name; it also names the artifact.
pub const NAME_COLUMN: &str = "Name";

/// `(label, column)` pairs rendered in order.
const FIELDS: [(&str, &str); 7] = [
    ("Student Name", NAME_COLUMN),
    ("Final Grade", "Final Grade"),
    ("ECA Participation", "ECA Participation"),
    ("Sports Involvement", "Sports Involvement"),
    ("Quiz Scores", "Quiz Scores"),
    ("Class Behavior", "Class Behavior"),
    ("Teacher's Comment", "Comment"),
];

const INSTRUCTION: &str = "Generate a parent-friendly presentation summarizing this student's \
academic and extracurricular performance, highlighting strengths, areas for improvement, and \
any special notes from the teacher.";

/// Render the prompt for one student row. Missing columns render empty.
pub fn student_prompt(record: &Record, n_slides: u32) -> String {
    let mut prompt = String::new();
    for (label, column) in FIELDS {
        let _ = writeln!(prompt, "{label}: {}", record.text(column));
    }
    prompt.push('\n');
    prompt.push_str(INSTRUCTION);
    let _ = write!(prompt, "\nTarget {n_slides} slides.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Record {
        [
            ("Name", "Alice"),
            ("Final Grade", "A"),
            ("ECA Participation", "Debate Club"),
            ("Sports Involvement", "Swimming"),
            ("Quiz Scores", "9, 10, 8"),
            ("Class Behavior", "Attentive"),
            ("Comment", "A pleasure to teach."),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn renders_exact_text() {
        let expected = "Student Name: Alice\n\
Final Grade: A\n\
ECA Participation: Debate Club\n\
Sports Involvement: Swimming\n\
Quiz Scores: 9, 10, 8\n\
Class Behavior: Attentive\n\
Teacher's Comment: A pleasure to teach.\n\
\n\
Generate a parent-friendly presentation summarizing this student's academic and extracurricular performance, highlighting strengths, areas for improvement, and any special notes from the teacher.\n\
Target 8 slides.";
        assert_eq!(student_prompt(&alice(), 8), expected);
    }

    #[test]
    fn missing_columns_render_empty() {
        let record: Record = [("Name", "Bob"), ("Final Grade", "C")].into_iter().collect();
        let prompt = student_prompt(&record, 8);
        assert!(prompt.starts_with("Student Name: Bob\nFinal Grade: C\nECA Participation: \n"));
        assert!(prompt.contains("Teacher's Comment: \n"));
    }

    #[test]
    fn deterministic() {
        assert_eq!(student_prompt(&alice(), 8), student_prompt(&alice(), 8));
    }
}
