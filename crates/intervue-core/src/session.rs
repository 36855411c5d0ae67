//! The interview session state machine.
//!
//! A session moves `resume → instructions → question → feedback` and then
//! either back to `question` or on to `complete`. While a question is open
//! the session can also be abandoned, which is terminal.
//!
//! The machine itself is synchronous and owns no timers. The driver in
//! [`crate::engine`] feeds it ticks and submissions one at a time; every
//! trigger carries the question index it was armed for, so a late tick or
//! a second submit for an already-answered question is recognised and
//! dropped instead of recording a second answer.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InterviewError;
use crate::evaluator::{evaluate_question, Evaluation};
use crate::model::{Answer, CandidateId, Question, QuestionSet, SubmitTrigger};
use crate::selector::{select_questions, SelectedQuestions};
use crate::statistics::final_score;

/// Default countdown per question, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 120;

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Resume,
    Instructions,
    Question,
    Feedback,
    Complete,
    Abandoned,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Abandoned)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resume => "resume",
            Stage::Instructions => "instructions",
            Stage::Question => "question",
            Stage::Feedback => "feedback",
            Stage::Complete => "complete",
            Stage::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// A recorded answer together with its scoring details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub question_index: usize,
    pub answer: Answer,
    pub evaluation: Evaluation,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The tick was armed for a question that is no longer open.
    Stale,
    Running { remaining: u32 },
    /// The countdown hit zero and the draft was submitted.
    Expired(SubmitOutcome),
}

/// Result of leaving the feedback stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// The last question was answered; carries the final score.
    Complete(f64),
}

/// One candidate's pass through an interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    interview_code: String,
    /// Every question in the set; the selector draws from these on start.
    pool: Vec<Question>,
    candidate_id: Option<CandidateId>,
    stage: Stage,
    selected: Option<SelectedQuestions>,
    current_index: usize,
    remaining: u32,
    time_limit: u32,
    draft: String,
    /// Set on the first submission for `current_index`, cleared on advance.
    submitted: bool,
    answers: Vec<Answer>,
    final_score: Option<f64>,
}

impl Session {
    /// A fresh session in the resume stage. A zero time limit is raised to one.
    pub fn new(question_set: &QuestionSet, time_limit: u32) -> Self {
        let time_limit = time_limit.max(1);
        Self {
            id: Uuid::new_v4(),
            interview_code: question_set.interview_code.clone(),
            pool: question_set.questions.clone(),
            candidate_id: None,
            stage: Stage::Resume,
            selected: None,
            current_index: 0,
            remaining: time_limit,
            time_limit,
            draft: String::new(),
            submitted: false,
            answers: Vec::new(),
            final_score: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn interview_code(&self) -> &str {
        &self.interview_code
    }

    pub fn candidate_id(&self) -> Option<CandidateId> {
        self.candidate_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selected(&self) -> Option<&SelectedQuestions> {
        self.selected.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The open question, or the one just answered while in feedback.
    pub fn current_question(&self) -> Option<&Question> {
        match self.stage {
            Stage::Question | Stage::Feedback => self.selected.as_ref()?.get(self.current_index),
            _ => None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    fn invalid(&self, action: &'static str) -> InterviewError {
        InterviewError::InvalidTransition {
            stage: self.stage,
            action,
        }
    }

    /// Attach the registered candidate and move on to the instructions.
    ///
    /// Candidate details are validated before the candidate is created, so
    /// this only records the id.
    pub fn capture_candidate(&mut self, candidate_id: CandidateId) -> Result<(), InterviewError> {
        if self.stage != Stage::Resume {
            return Err(self.invalid("capture candidate"));
        }
        self.candidate_id = Some(candidate_id);
        self.stage = Stage::Instructions;
        Ok(())
    }

    /// Select the questions and open the first one.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Question, InterviewError> {
        if self.stage != Stage::Instructions {
            return Err(self.invalid("start"));
        }
        let selected = select_questions(&self.pool, rng)?;
        self.selected = Some(selected);
        self.current_index = 0;
        self.open_question();
        self.current_question()
            .ok_or_else(|| self.invalid("start"))
    }

    fn open_question(&mut self) {
        self.stage = Stage::Question;
        self.remaining = self.time_limit;
        self.draft.clear();
        self.submitted = false;
    }

    /// Replace the text that a timeout would submit.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<(), InterviewError> {
        if self.stage != Stage::Question {
            return Err(self.invalid("edit the answer"));
        }
        self.draft = text.into();
        Ok(())
    }

    /// Count down one second for the question at `question_index`.
    ///
    /// Reaching zero submits the current draft, empty or not.
    pub fn tick(&mut self, question_index: usize) -> Result<TickOutcome, InterviewError> {
        if self.stage != Stage::Question || question_index != self.current_index || self.submitted
        {
            return Ok(TickOutcome::Stale);
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Ok(TickOutcome::Running {
                remaining: self.remaining,
            });
        }

        let draft = std::mem::take(&mut self.draft);
        self.submit(question_index, draft, SubmitTrigger::Timeout)
            .map(TickOutcome::Expired)
    }

    /// Score and record the answer for `question_index`.
    ///
    /// Only the first submission for an index has effect. Later ones, whether
    /// manual or from the timer, fail with
    /// [`InterviewError::ConcurrencyViolation`] and change nothing.
    pub fn submit(
        &mut self,
        question_index: usize,
        text: impl Into<String>,
        trigger: SubmitTrigger,
    ) -> Result<SubmitOutcome, InterviewError> {
        if self.stage.is_terminal() {
            return Err(self.invalid("submit"));
        }
        if self.selected.is_some()
            && (question_index < self.current_index
                || (question_index == self.current_index && self.submitted))
        {
            return Err(InterviewError::ConcurrencyViolation { question_index });
        }
        if self.stage != Stage::Question || question_index != self.current_index {
            return Err(self.invalid("submit"));
        }

        let question = self
            .current_question()
            .ok_or_else(|| self.invalid("submit"))?;
        let text = text.into();
        let evaluation = evaluate_question(&text, question)?;

        let answer = Answer {
            question_id: question.id.clone(),
            raw_text: text,
            matched_keywords: evaluation.matched_keywords.clone(),
            score: evaluation.score,
            trigger,
            submitted_at: Utc::now(),
        };

        self.submitted = true;
        self.stage = Stage::Feedback;
        self.draft.clear();
        self.answers.push(answer.clone());

        Ok(SubmitOutcome {
            question_index,
            answer,
            evaluation,
        })
    }

    /// Leave feedback for the next question, or complete the interview.
    pub fn advance(&mut self) -> Result<Advance, InterviewError> {
        if self.stage != Stage::Feedback {
            return Err(self.invalid("advance"));
        }
        let Some(selected) = self.selected.as_ref() else {
            return Err(self.invalid("advance"));
        };

        if self.current_index + 1 < selected.len() {
            self.current_index += 1;
            self.open_question();
            return Ok(Advance::Next(self.current_index));
        }

        let score = final_score(&self.answers, selected.as_slice());
        self.final_score = Some(score);
        self.stage = Stage::Complete;
        Ok(Advance::Complete(score))
    }

    /// Abandon the interview. Only possible while a question is open.
    pub fn abandon(&mut self) -> Result<(), InterviewError> {
        if self.stage != Stage::Question {
            return Err(self.invalid("abandon"));
        }
        self.stage = Stage::Abandoned;
        self.draft.clear();
        Ok(())
    }
}
