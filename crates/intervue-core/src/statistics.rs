//! Final score aggregation and per-interview statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::evaluator::round_to_tenth;
use crate::model::{Answer, Candidate, CandidateStatus, Question};

/// Difficulty-weighted average of answer scores.
///
/// Each answer counts with its question's tier weight (easy 1, medium 2,
/// hard 3). Answers whose question id is not among `questions` are skipped
/// rather than failing the whole computation, so a candidate always gets a
/// score. Returns `0.0` when no answer resolves.
pub fn final_score(answers: &[Answer], questions: &[Question]) -> f64 {
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut weighted_sum = 0.0;
    let mut total_weight = 0u32;

    for answer in answers {
        let Some(question) = by_id.get(answer.question_id.as_str()) else {
            tracing::debug!(
                question_id = %answer.question_id,
                "skipping answer for unknown question"
            );
            continue;
        };
        let weight = question.difficulty.weight();
        weighted_sum += answer.score * f64::from(weight);
        total_weight += weight;
    }

    if total_weight == 0 {
        return 0.0;
    }

    round_to_tenth(weighted_sum / f64::from(total_weight))
}

/// Headline numbers for an interviewer dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub abandoned: usize,
    /// Mean final score across all candidates, counting unscored ones as 0.
    pub average_score: f64,
}

/// Compute dashboard statistics for a set of candidates.
pub fn compute_dashboard_stats(candidates: &[Candidate]) -> DashboardStats {
    let count = |status: CandidateStatus| candidates.iter().filter(|c| c.status == status).count();

    let average_score = if candidates.is_empty() {
        0.0
    } else {
        let sum: f64 = candidates.iter().map(|c| c.final_score.unwrap_or(0.0)).sum();
        round_to_tenth(sum / candidates.len() as f64)
    };

    DashboardStats {
        total: candidates.len(),
        completed: count(CandidateStatus::Completed),
        in_progress: count(CandidateStatus::InProgress),
        abandoned: count(CandidateStatus::Abandoned),
        average_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateInfo, Difficulty, SubmitTrigger};
    use chrono::Utc;

    fn question(id: &str, difficulty: Difficulty) -> Question {
        Question {
            id: id.into(),
            difficulty,
            text: format!("question {id}"),
            keywords: vec!["kw".into()],
            max_score: 10.0,
        }
    }

    fn answer(question_id: &str, score: f64) -> Answer {
        Answer {
            question_id: question_id.into(),
            raw_text: String::new(),
            matched_keywords: vec![],
            score,
            trigger: SubmitTrigger::Manual,
            submitted_at: Utc::now(),
        }
    }

    fn six_questions() -> Vec<Question> {
        vec![
            question("e1", Difficulty::Easy),
            question("e2", Difficulty::Easy),
            question("m1", Difficulty::Medium),
            question("m2", Difficulty::Medium),
            question("h1", Difficulty::Hard),
            question("h2", Difficulty::Hard),
        ]
    }

    #[test]
    fn weighted_average_example() {
        let answers = vec![
            answer("e1", 8.0),
            answer("e2", 10.0),
            answer("m1", 6.0),
            answer("m2", 6.0),
            answer("h1", 4.0),
            answer("h2", 4.0),
        ];
        // (8 + 10 + 12 + 12 + 12 + 12) / 12
        assert_eq!(final_score(&answers, &six_questions()), 5.5);
    }

    #[test]
    fn equal_scores_collapse_to_that_score() {
        let answers: Vec<Answer> = six_questions()
            .iter()
            .map(|q| answer(&q.id, 7.3))
            .collect();
        assert_eq!(final_score(&answers, &six_questions()), 7.3);
    }

    #[test]
    fn average_not_sum_for_hard_only() {
        let answers = vec![answer("h1", 10.0), answer("h2", 10.0)];
        assert_eq!(final_score(&answers, &six_questions()), 10.0);
    }

    #[test]
    fn unknown_question_ids_are_skipped() {
        let answers = vec![answer("e1", 4.0), answer("ghost", 100.0)];
        assert_eq!(final_score(&answers, &six_questions()), 4.0);
    }

    #[test]
    fn no_resolvable_answers_scores_zero() {
        assert_eq!(final_score(&[], &six_questions()), 0.0);
        assert_eq!(final_score(&[answer("ghost", 9.0)], &six_questions()), 0.0);
    }

    #[test]
    fn dashboard_stats_count_unscored_as_zero() {
        let info = CandidateInfo::new("A", "a@example.com", "1");
        let mut done = Candidate::new("CODE22", info.clone());
        done.status = CandidateStatus::Completed;
        done.final_score = Some(9.0);
        let mut gone = Candidate::new("CODE22", info.clone());
        gone.status = CandidateStatus::Abandoned;
        let active = Candidate::new("CODE22", info);

        let stats = compute_dashboard_stats(&[done, gone, active]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.average_score, 3.0);
    }

    #[test]
    fn dashboard_stats_empty() {
        let stats = compute_dashboard_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, 0.0);
    }
}
