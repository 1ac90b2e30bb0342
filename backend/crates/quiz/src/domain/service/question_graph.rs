//! Question Graph
//!
//! Branching games wire answer options to follow-up questions. The graph is
//! validated when built: exactly one root, every edge lands on a question of
//! the same set, and no cycles.

use std::collections::{HashMap, HashSet};

use kernel::id::QuestionId;
use thiserror::Error;

use crate::domain::entity::question::Question;
use crate::domain::value_object::answer_option_id::AnswerOptionId;
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph has no questions")]
    Empty,

    /// Every question is the target of some edge
    #[error("no question is free of incoming edges")]
    NoRoot,

    #[error("{} questions have no incoming edge", .0.len())]
    MultipleRoots(Vec<QuestionId>),

    #[error("option {option_id} of question {question_id} points to unknown question {target}")]
    DanglingEdge {
        question_id: QuestionId,
        option_id: AnswerOptionId,
        target: QuestionId,
    },

    #[error("cycle through question {0}")]
    Cycle(QuestionId),
}

#[derive(Debug, Clone)]
pub struct QuestionGraph {
    questions: HashMap<QuestionId, Question>,
    edges: HashMap<QuestionId, HashMap<AnswerOptionId, QuestionId>>,
    /// Input order, for stable iteration
    order: Vec<QuestionId>,
    root: QuestionId,
}

impl QuestionGraph {
    pub fn build(questions: &[Question]) -> Result<Self, GraphError> {
        if questions.is_empty() {
            return Err(GraphError::Empty);
        }

        let by_id: HashMap<QuestionId, Question> =
            questions.iter().map(|q| (q.id, q.clone())).collect();

        let mut edges: HashMap<QuestionId, HashMap<AnswerOptionId, QuestionId>> = HashMap::new();
        let mut targets: HashSet<QuestionId> = HashSet::new();
        for question in questions {
            for option in &question.answer_options {
                let Some(target) = option.next_question_id else {
                    continue;
                };
                if !by_id.contains_key(&target) {
                    return Err(GraphError::DanglingEdge {
                        question_id: question.id,
                        option_id: option.id,
                        target,
                    });
                }
                edges.entry(question.id).or_default().insert(option.id, target);
                targets.insert(target);
            }
        }

        let roots: Vec<QuestionId> = questions
            .iter()
            .map(|q| q.id)
            .filter(|id| !targets.contains(id))
            .collect();
        let root = match roots.len() {
            0 => return Err(GraphError::NoRoot),
            1 => roots[0],
            _ => return Err(GraphError::MultipleRoots(roots)),
        };

        let order: Vec<QuestionId> = questions.iter().map(|q| q.id).collect();
        detect_cycle(&order, &edges)?;

        Ok(Self {
            questions: by_id,
            edges,
            order,
            root,
        })
    }

    /// The unique question without incoming edges
    pub fn first(&self) -> &Question {
        // root was taken from the same question set in `build`
        &self.questions[&self.root]
    }

    pub fn question(&self, id: QuestionId) -> QuizResult<&Question> {
        self.questions.get(&id).ok_or(QuizError::QuestionNotFound)
    }

    /// Follow the edge recorded for `option_id` on `question_id`
    pub fn next_question(
        &self,
        question_id: QuestionId,
        option_id: AnswerOptionId,
    ) -> QuizResult<&Question> {
        let target = self
            .edges
            .get(&question_id)
            .and_then(|out| out.get(&option_id))
            .ok_or(QuizError::QuestionNotFound)?;
        self.question(*target)
    }

    /// Any question, chosen with the OS RNG
    pub fn random_question(&self) -> &Question {
        let idx = platform::random::random_index(self.order.len()).unwrap_or(0);
        &self.questions[&self.order[idx]]
    }

    #[cfg(test)]
    pub(crate) fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.order.iter().copied()
    }

    /// Number of questions in the graph
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Iterative DFS with three colours; a back edge is a cycle.
fn detect_cycle(
    order: &[QuestionId],
    edges: &HashMap<QuestionId, HashMap<AnswerOptionId, QuestionId>>,
) -> Result<(), GraphError> {
    let mut marks: HashMap<QuestionId, Mark> = HashMap::with_capacity(order.len());

    for &start in order {
        if marks.contains_key(&start) {
            continue;
        }
        let mut stack: Vec<(QuestionId, Vec<QuestionId>)> = vec![(start, successors(start, edges))];
        marks.insert(start, Mark::InProgress);

        loop {
            let Some((node, pending)) = stack.last_mut() else {
                break;
            };
            let node = *node;
            match pending.pop() {
                Some(next) => match marks.get(&next) {
                    Some(Mark::InProgress) => return Err(GraphError::Cycle(next)),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::InProgress);
                        stack.push((next, successors(next, edges)));
                    }
                },
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }
    Ok(())
}

fn successors(
    id: QuestionId,
    edges: &HashMap<QuestionId, HashMap<AnswerOptionId, QuestionId>>,
) -> Vec<QuestionId> {
    edges
        .get(&id)
        .map(|out| out.values().copied().collect())
        .unwrap_or_default()
}
