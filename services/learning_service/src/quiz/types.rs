use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::EngineError;

/// Label of one of the four options of a question.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Option label must be one of A, B, C or D.")]
pub struct InvalidOptionLabel;

/// At most one per module; `pass_marks` is compared against the number of correct answers.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Quiz {
    #[builder(default = Uuid::new_v4())]
    pub quiz_id: Uuid,

    pub module_id: Uuid,

    pub course_id: Uuid,

    #[builder(setter(into))]
    pub title: String,

    pub pass_marks: u32,

    pub total_marks: u32,

    #[builder(default = chrono::offset::Utc::now())]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct Question {
    #[builder(default = Uuid::new_v4())]
    pub question_id: Uuid,

    pub quiz_id: Uuid,

    #[builder(setter(into))]
    pub text: String,

    #[builder(setter(into))]
    pub option_a: String,

    #[builder(setter(into))]
    pub option_b: String,

    #[builder(setter(into))]
    pub option_c: String,

    #[builder(setter(into))]
    pub option_d: String,

    pub correct_option: OptionLabel,

    #[builder(default = chrono::offset::Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// One scored submission. Recorded whether or not it passed.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, TypedBuilder)]
#[serde(rename_all = "PascalCase")]
pub struct QuizAttempt {
    #[builder(default = Uuid::new_v4())]
    pub attempt_id: Uuid,

    pub user_id: Uuid,

    pub quiz_id: Uuid,

    /// Question ID to the submitted label, normalized to upper case.
    #[builder(default)]
    pub answers: BTreeMap<Uuid, String>,

    pub score: u32,

    pub total_questions: u32,

    pub passed: bool,

    #[builder(default = chrono::offset::Utc::now())]
    pub attempted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AttemptResult {
    pub attempt_id: Uuid,
    pub score: u32,
    pub total_questions: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_marks", skip_on_field_errors = true))]
pub struct NewQuiz {
    pub title: Option<String>,

    pub pass_marks: u32,

    #[validate(range(min = 1, message = "Total marks must be at least 1."))]
    pub total_marks: u32,
}

#[derive(Debug, Clone, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, message = "Question text is required."))]
    pub text: String,

    #[validate(length(min = 1, message = "Option A is required."))]
    pub option_a: String,

    #[validate(length(min = 1, message = "Option B is required."))]
    pub option_b: String,

    #[validate(length(min = 1, message = "Option C is required."))]
    pub option_c: String,

    #[validate(length(min = 1, message = "Option D is required."))]
    pub option_d: String,

    #[validate(custom = "validate_option_label")]
    pub correct_option: String,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];
}

impl FromStr for OptionLabel {
    type Err = InvalidOptionLabel;

    /// Labels are case insensitive and surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(OptionLabel::A),
            "B" | "b" => Ok(OptionLabel::B),
            "C" | "c" => Ok(OptionLabel::C),
            "D" | "d" => Ok(OptionLabel::D),
            _ => Err(InvalidOptionLabel),
        }
    }
}

impl Display for OptionLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Question {
    pub fn option(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.option_a,
            OptionLabel::B => &self.option_b,
            OptionLabel::C => &self.option_c,
            OptionLabel::D => &self.option_d,
        }
    }
}

impl From<&QuizAttempt> for AttemptResult {
    fn from(attempt: &QuizAttempt) -> Self {
        AttemptResult {
            attempt_id: attempt.attempt_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            passed: attempt.passed,
        }
    }
}

impl NewQuiz {
    pub fn checked(self) -> Result<Self, EngineError> {
        self.validate().map_err(validation_error)?;
        Ok(self)
    }
}

impl NewQuestion {
    /// Trims every field, then validates. Whitespace-only text counts as missing.
    pub fn checked(self) -> Result<Self, EngineError> {
        let question = NewQuestion {
            text: self.text.trim().to_owned(),
            option_a: self.option_a.trim().to_owned(),
            option_b: self.option_b.trim().to_owned(),
            option_c: self.option_c.trim().to_owned(),
            option_d: self.option_d.trim().to_owned(),
            correct_option: self.correct_option.trim().to_owned(),
        };
        question.validate().map_err(validation_error)?;

        Ok(question)
    }
}

fn validate_marks(quiz: &NewQuiz) -> Result<(), ValidationError> {
    if quiz.pass_marks > quiz.total_marks {
        let mut err = ValidationError::new("pass_marks");
        err.message = Some("Pass marks cannot exceed total marks.".into());
        return Err(err);
    }

    Ok(())
}

fn validate_option_label(label: &str) -> Result<(), ValidationError> {
    label.parse::<OptionLabel>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("correct_option");
        err.message = Some("Correct option must be one of A, B, C or D.".into());
        err
    })
}

/// Flattens validator errors into a single message, fields in alphabetical order.
fn validation_error(errors: ValidationErrors) -> EngineError {
    let mut messages: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid.", field));
                (field.to_string(), msg)
            })
        })
        .collect();
    messages.sort();

    EngineError::Validation(messages.into_iter().map(|(_, m)| m).collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn new_question(correct_option: &str) -> NewQuestion {
        NewQuestion {
            text: "What does `&mut` grant?".to_owned(),
            option_a: "Shared access".to_owned(),
            option_b: "Exclusive access".to_owned(),
            option_c: "Ownership".to_owned(),
            option_d: "Nothing".to_owned(),
            correct_option: correct_option.to_owned(),
        }
    }

    #[rstest]
    #[case("A", Ok(OptionLabel::A))]
    #[case("b", Ok(OptionLabel::B))]
    #[case(" C ", Ok(OptionLabel::C))]
    #[case("d", Ok(OptionLabel::D))]
    #[case("E", Err(InvalidOptionLabel))]
    #[case("", Err(InvalidOptionLabel))]
    #[case("AB", Err(InvalidOptionLabel))]
    fn parses_option_labels(#[case] input: &str, #[case] expected: Result<OptionLabel, InvalidOptionLabel>) {
        assert_eq!(expected, input.parse::<OptionLabel>());
    }

    #[test]
    fn accepts_complete_question() {
        let question = new_question(" b ").checked().unwrap();
        assert_eq!("b", question.correct_option);
    }

    #[test]
    fn rejects_label_outside_a_to_d() {
        let err = new_question("E").checked().unwrap_err();
        assert!(matches!(err, EngineError::Validation(msg) if msg.contains("A, B, C or D")));
    }

    #[test]
    fn rejects_blank_option() {
        let mut question = new_question("A");
        question.option_c = "   ".to_owned();

        let err = question.checked().unwrap_err();
        assert!(matches!(err, EngineError::Validation(msg) if msg == "Option C is required."));
    }

    #[test]
    fn reports_every_invalid_field() {
        let mut question = new_question("Z");
        question.text = String::new();

        let msg = match question.checked() {
            Err(EngineError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert!(msg.contains("Question text is required."));
        assert!(msg.contains("Correct option must be one of A, B, C or D."));
    }

    #[rstest]
    #[case(3, 5, true)]
    #[case(5, 5, true)]
    #[case(0, 5, true)]
    #[case(6, 5, false)]
    #[case(0, 0, false)]
    fn validates_marks(#[case] pass_marks: u32, #[case] total_marks: u32, #[case] valid: bool) {
        let quiz = NewQuiz {
            title: None,
            pass_marks,
            total_marks,
        };

        assert_eq!(valid, quiz.checked().is_ok());
    }

    #[test]
    fn question_exposes_options_by_label() {
        let question = Question::builder()
            .quiz_id(Uuid::nil())
            .text("?")
            .option_a("a")
            .option_b("b")
            .option_c("c")
            .option_d("d")
            .correct_option(OptionLabel::D)
            .build();

        let options: Vec<&str> = OptionLabel::ALL.iter().map(|l| question.option(*l)).collect();
        assert_eq!(vec!["a", "b", "c", "d"], options);
    }
}
