use crate::modules::models::response::SolvedProblem;
use cp_tracker_libs::codeforces::model::Submission;
use itertools::Itertools;
use std::collections::HashMap;

/// A solved problem that has no stored record yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub problem_id: String,
    pub problem_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub solved: Vec<SolvedProblem>,
    pub unseen: Vec<NewSubmission>,
}

/// Merges the judge's history with the ratings already stored for the user.
///
/// `history` is newest first, as the judge returns it. It is walked oldest first so that
/// the earliest accepted attempt of each problem is the one kept.
/// `stored` maps problem identifiers to their stored rating.
pub fn reconcile(history: &[Submission], stored: &HashMap<String, Option<i64>>) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();

    for submission in history
        .iter()
        .rev()
        .filter(|submission| submission.is_accepted())
        .unique_by(|submission| submission.problem.identifier())
    {
        let problem = &submission.problem;
        let problem_id = problem.identifier();

        let user_elo = match stored.get(&problem_id) {
            Some(rating) => *rating,
            None => {
                reconciliation.unseen.push(NewSubmission {
                    problem_id: problem_id.clone(),
                    problem_name: problem.name.clone(),
                });
                None
            }
        };

        reconciliation.solved.push(SolvedProblem {
            problem_id,
            contest_id: problem.contest_id,
            problem_index: problem.index.clone(),
            problem_name: problem.name.clone(),
            verdict: submission
                .verdict
                .map(|verdict| verdict.to_string())
                .unwrap_or_default(),
            language: submission.programming_language.clone(),
            user_elo,
            problem_rating: problem.rating,
            problem_tags: problem.tags.clone(),
            creation_time_seconds: submission.creation_time_seconds,
        });
    }

    reconciliation
}
