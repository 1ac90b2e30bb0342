//! Game Management Use Case
//!
//! Author-side operations: create a game, add questions while it is being
//! edited, then start and finish it.

use std::collections::HashSet;
use std::sync::Arc;

use kernel::id::{GameId, QuestionId};

use crate::application::config::QuizConfig;
use crate::application::execution::{load_game, lock_game, within_deadline};
use crate::domain::entity::game::{Game, GameStatistics};
use crate::domain::entity::question::{NewAnswerOption, Question, QuestionDraft, is_branching};
use crate::domain::repository::{
    GameRepository, QuestionRepository, SessionRepository, TransactionManager, UnitOfWork,
};
use crate::domain::service::question_graph::QuestionGraph;
use crate::domain::value_object::{game_settings::GameSettings, question_type::QuestionType};
use crate::error::{QuizError, QuizResult};

#[derive(Debug, Clone, Default)]
pub struct CreateGameInput {
    pub title: Option<String>,
    pub settings: GameSettings,
}

#[derive(Debug, Clone)]
pub struct AddQuestionInput {
    pub text: String,
    pub question_type: QuestionType,
    pub image_id: Option<String>,
    pub answer_options: Vec<NewAnswerOption>,
}

/// Author view of a game, questions highest `sort` first
#[derive(Debug, Clone)]
pub struct GameDetails {
    pub game: Game,
    pub questions: Vec<Question>,
}

pub struct GameUseCase<T>
where
    T: TransactionManager,
{
    tx_manager: Arc<T>,
    config: Arc<QuizConfig>,
}

impl<T> GameUseCase<T>
where
    T: TransactionManager,
{
    pub fn new(tx_manager: Arc<T>, config: Arc<QuizConfig>) -> Self {
        Self { tx_manager, config }
    }

    pub async fn create(&self, input: CreateGameInput) -> QuizResult<Game> {
        within_deadline(self.config.operation_timeout, async {
            let mut tx = self.tx_manager.begin().await?;
            let game = Game::new(input.title, input.settings);
            tx.insert_game(&game).await?;
            tx.commit().await?;

            tracing::info!(game_id = %game.id, "Game created");
            Ok(game)
        })
        .await
    }

    pub async fn add_question(
        &self,
        game_id: GameId,
        input: AddQuestionInput,
    ) -> QuizResult<Question> {
        within_deadline(
            self.config.operation_timeout,
            self.run_add_question(game_id, input),
        )
        .await
    }

    async fn run_add_question(
        &self,
        game_id: GameId,
        input: AddQuestionInput,
    ) -> QuizResult<Question> {
        let mut tx = self.tx_manager.begin().await?;

        let game = lock_game(&mut tx, game_id).await?;
        game.ensure_editable()?;

        // Edges may only point at questions already in this game.
        let known: HashSet<QuestionId> = tx
            .questions_for_game(game_id)
            .await?
            .iter()
            .map(|q| q.id)
            .collect();
        if let Some(target) = input
            .answer_options
            .iter()
            .filter_map(|o| o.next_question_id)
            .find(|id| !known.contains(id))
        {
            return Err(QuizError::InvalidInput(format!(
                "next question {target} is not part of this game"
            )));
        }

        let sort = tx.next_question_sort(game_id).await?;
        let draft = QuestionDraft::new(
            game_id,
            sort,
            input.text,
            input.question_type,
            input.image_id,
            input.answer_options,
        )?;
        let question = tx.insert_question(draft).await?;

        tx.commit().await?;

        tracing::info!(
            game_id = %game_id,
            question_id = %question.id,
            question_type = %question.question_type,
            sort = question.sort,
            "Question added"
        );

        Ok(question)
    }

    pub async fn start(&self, game_id: GameId) -> QuizResult<Game> {
        within_deadline(self.config.operation_timeout, self.run_start(game_id)).await
    }

    async fn run_start(&self, game_id: GameId) -> QuizResult<Game> {
        let mut tx = self.tx_manager.begin().await?;

        let mut game = lock_game(&mut tx, game_id).await?;
        game.start()?;

        let questions = tx.questions_for_game(game_id).await?;
        if questions.is_empty() {
            return Err(QuizError::GameHasNoQuestions);
        }
        let branching = is_branching(&questions);
        if branching {
            let graph = QuestionGraph::build(&questions)?;
            tracing::debug!(
                game_id = %game_id,
                root = %graph.first().id,
                nodes = graph.len(),
                "Question graph validated"
            );
        }

        tx.update_game(&game).await?;
        tx.commit().await?;

        tracing::info!(
            game_id = %game_id,
            questions = questions.len(),
            branching,
            "Game started"
        );

        Ok(game)
    }

    pub async fn finish(&self, game_id: GameId) -> QuizResult<Game> {
        within_deadline(self.config.operation_timeout, async {
            let mut tx = self.tx_manager.begin().await?;
            let mut game = lock_game(&mut tx, game_id).await?;
            game.finish()?;
            tx.update_game(&game).await?;
            tx.commit().await?;

            tracing::info!(game_id = %game_id, "Game finished");
            Ok(game)
        })
        .await
    }

    pub async fn get(&self, game_id: GameId) -> QuizResult<GameDetails> {
        within_deadline(self.config.operation_timeout, async {
            let mut tx = self.tx_manager.begin().await?;
            let game = load_game(&mut tx, game_id).await?;
            let questions = tx.questions_for_game(game_id).await?;
            tx.commit().await?;

            Ok(GameDetails { game, questions })
        })
        .await
    }

    pub async fn statistics(&self, game_id: GameId) -> QuizResult<GameStatistics> {
        within_deadline(self.config.operation_timeout, async {
            let mut tx = self.tx_manager.begin().await?;
            load_game(&mut tx, game_id).await?;
            let counts = tx.session_counts(game_id).await?;
            tx.commit().await?;

            Ok(GameStatistics::from_counts(counts.total, counts.finished))
        })
        .await
    }
}
