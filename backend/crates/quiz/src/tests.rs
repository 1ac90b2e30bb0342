//! Engine tests over the in-memory store

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use kernel::id::{GameId, PlayerId, QuestionId};

    use crate::application::accept_answers::{
        AcceptAnswersInput, AcceptAnswersOutput, AcceptAnswersUseCase,
    };
    use crate::application::config::QuizConfig;
    use crate::application::finish_session::FinishSessionUseCase;
    use crate::application::get_current_state::{GetCurrentStateUseCase, SessionState};
    use crate::application::manage_game::{AddQuestionInput, CreateGameInput, GameUseCase};
    use crate::application::restart_session::RestartSessionUseCase;
    use crate::application::start_session::StartSessionUseCase;
    use crate::domain::entity::question::{NewAnswerOption, Question};
    use crate::domain::value_object::{game_settings::GameSettings, question_type::QuestionType};
    use crate::error::QuizResult;
    use crate::infra::memory::InMemoryTransactionManager;

    pub fn question(
        question_type: QuestionType,
        text: &str,
        options: &[(&str, bool)],
    ) -> AddQuestionInput {
        AddQuestionInput {
            text: text.into(),
            question_type,
            image_id: None,
            answer_options: options
                .iter()
                .map(|(text, is_correct)| NewAnswerOption {
                    text: (*text).into(),
                    is_correct: *is_correct,
                    next_question_id: None,
                })
                .collect(),
        }
    }

    /// The submitted form of an option: its id as a string
    pub fn pick(question: &Question, text: &str) -> String {
        question
            .answer_options
            .iter()
            .find(|o| o.text == text)
            .map(|o| o.id.to_string())
            .unwrap_or_else(|| panic!("no option {text}"))
    }

    pub struct Engine {
        pub store: InMemoryTransactionManager,
        pub tx_manager: Arc<InMemoryTransactionManager>,
        pub config: Arc<QuizConfig>,
    }

    impl Engine {
        pub fn new() -> Self {
            Self::with(InMemoryTransactionManager::new(), QuizConfig::default())
        }

        pub fn with(store: InMemoryTransactionManager, config: QuizConfig) -> Self {
            Self {
                tx_manager: Arc::new(store.clone()),
                store,
                config: Arc::new(config),
            }
        }

        pub fn games(&self) -> GameUseCase<InMemoryTransactionManager> {
            GameUseCase::new(self.tx_manager.clone(), self.config.clone())
        }

        /// Create and start a game whose questions are served in the given
        /// order when shuffling is off.
        pub async fn published_game(
            &self,
            settings: GameSettings,
            questions: Vec<AddQuestionInput>,
        ) -> (GameId, Vec<Question>) {
            let games = self.games();
            let game = games
                .create(CreateGameInput {
                    title: Some("Test game".into()),
                    settings,
                })
                .await
                .unwrap();

            // Later additions get a higher sort and are served first.
            let mut added = Vec::new();
            for input in questions.into_iter().rev() {
                added.push(games.add_question(game.id, input).await.unwrap());
            }
            added.reverse();

            games.start(game.id).await.unwrap();
            (game.id, added)
        }

        pub async fn start_session(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<()> {
            StartSessionUseCase::new(self.tx_manager.clone(), self.config.clone())
                .execute(game_id, player_id)
                .await
        }

        pub async fn state(
            &self,
            game_id: GameId,
            player_id: PlayerId,
        ) -> QuizResult<SessionState> {
            GetCurrentStateUseCase::new(self.tx_manager.clone(), self.config.clone())
                .execute(game_id, player_id)
                .await
        }

        pub async fn current(&self, game_id: GameId, player_id: PlayerId) -> Question {
            self.state(game_id, player_id)
                .await
                .unwrap()
                .current_question
                .expect("a question to be presented")
        }

        pub async fn answer(
            &self,
            game_id: GameId,
            player_id: PlayerId,
            question_id: QuestionId,
            answers: Vec<String>,
        ) -> QuizResult<AcceptAnswersOutput> {
            AcceptAnswersUseCase::new(self.tx_manager.clone(), self.config.clone())
                .execute(AcceptAnswersInput {
                    game_id,
                    player_id,
                    question_id,
                    answers,
                })
                .await
        }

        pub async fn finish(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<()> {
            FinishSessionUseCase::new(self.tx_manager.clone(), self.config.clone())
                .execute(game_id, player_id)
                .await
        }

        pub async fn restart(&self, game_id: GameId, player_id: PlayerId) -> QuizResult<()> {
            RestartSessionUseCase::new(self.tx_manager.clone(), self.config.clone())
                .execute(game_id, player_id)
                .await
        }
    }
}

#[cfg(test)]
mod session_tests {
    use super::support::*;
    use kernel::id::{GameId, PlayerId};
    use tokio_test::assert_ok;

    use crate::application::get_current_state::Progress;
    use crate::domain::value_object::{
        game_settings::GameSettings, question_type::QuestionType, session_status::SessionStatus,
    };
    use crate::error::QuizError;

    async fn two_question_game(
        engine: &Engine,
        settings: GameSettings,
    ) -> (GameId, Vec<crate::domain::Question>) {
        engine
            .published_game(
                settings,
                vec![
                    question(QuestionType::Choice, "Q1", &[("A", true), ("B", false)]),
                    question(
                        QuestionType::MultipleChoice,
                        "Q2",
                        &[("X", true), ("Y", true), ("Z", false)],
                    ),
                ],
            )
            .await
    }

    #[tokio::test]
    async fn test_linear_play_through_and_restart() {
        let engine = Engine::new();
        let (game_id, qs) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();

        assert_ok!(engine.start_session(game_id, player).await);

        let first = engine.current(game_id, player).await;
        assert_eq!(first.id, qs[0].id);
        let verdict = engine
            .answer(game_id, player, first.id, vec![pick(&qs[0], "A")])
            .await
            .unwrap();
        assert!(verdict.is_correct);

        let second = engine.current(game_id, player).await;
        assert_eq!(second.id, qs[1].id);
        let verdict = engine
            .answer(game_id, player, second.id, vec![pick(&qs[1], "X")])
            .await
            .unwrap();
        assert!(!verdict.is_correct);

        let exhausted = engine.state(game_id, player).await;
        assert!(matches!(exhausted, Err(QuizError::QuestionQueueEmpty)));

        assert_ok!(engine.finish(game_id, player).await);
        let terminal = engine.state(game_id, player).await.unwrap();
        assert_eq!(terminal.status, SessionStatus::Finished);
        assert!(terminal.current_question.is_none());
        assert_eq!(terminal.progress, Progress::default());

        assert_ok!(engine.restart(game_id, player).await);
        assert!(engine.store.snapshot().await.items.is_empty());

        let replay = engine.state(game_id, player).await.unwrap();
        assert_eq!(replay.status, SessionStatus::Started);
        assert_eq!(replay.current_question.map(|q| q.id), Some(qs[0].id));
        assert_eq!(replay.progress, Progress { answered: 0, total: 2 });
    }

    #[tokio::test]
    async fn test_pending_question_is_resumed() {
        let engine = Engine::new();
        let settings = GameSettings {
            shuffle_questions: true,
            ..GameSettings::default()
        };
        let (game_id, _) = two_question_game(&engine, settings).await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let first = engine.state(game_id, player).await.unwrap();
        let again = engine.state(game_id, player).await.unwrap();

        assert_eq!(
            first.current_question.map(|q| q.id),
            again.current_question.map(|q| q.id)
        );
        assert_eq!(first.progress.answered, 0);
        assert_eq!(again.progress.answered, 0);
        assert_eq!(engine.store.snapshot().await.items.len(), 1);
    }

    #[tokio::test]
    async fn test_second_answer_is_rejected() {
        let engine = Engine::new();
        let (game_id, qs) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let q = engine.current(game_id, player).await;
        assert_ok!(engine.answer(game_id, player, q.id, vec![pick(&qs[0], "B")]).await);

        let again = engine
            .answer(game_id, player, q.id, vec![pick(&qs[0], "A")])
            .await;
        assert!(matches!(again, Err(QuizError::AlreadyAnswered)));

        // The first verdict stands.
        let item = engine.store.snapshot().await.items[0].clone();
        assert_eq!(item.is_correct, Some(false));
    }

    #[tokio::test]
    async fn test_queue_exhausts_after_every_question() {
        let engine = Engine::new();
        let settings = GameSettings {
            shuffle_questions: true,
            ..GameSettings::default()
        };
        let (game_id, qs) = engine
            .published_game(
                settings,
                (1..=4)
                    .map(|n| {
                        question(
                            QuestionType::Choice,
                            &format!("Q{n}"),
                            &[("yes", true), ("no", false)],
                        )
                    })
                    .collect(),
            )
            .await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..qs.len() {
            let q = engine.current(game_id, player).await;
            assert!(!seen.contains(&q.id), "question served twice");
            engine
                .answer(game_id, player, q.id, vec![pick(&q, "yes")])
                .await
                .unwrap();
            seen.push(q.id);
        }

        assert!(matches!(
            engine.state(game_id, player).await,
            Err(QuizError::QuestionQueueEmpty)
        ));
    }

    #[tokio::test]
    async fn test_answer_requires_presented_question() {
        let engine = Engine::new();
        let (game_id, qs) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();
        engine.current(game_id, player).await;

        let result = engine
            .answer(game_id, player, qs[1].id, vec![pick(&qs[1], "X")])
            .await;
        assert!(matches!(result, Err(QuizError::SessionItemNotFound)));
    }

    #[tokio::test]
    async fn test_finished_session_rejects_answers() {
        let engine = Engine::new();
        let (game_id, qs) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();
        let q = engine.current(game_id, player).await;
        engine.finish(game_id, player).await.unwrap();

        let result = engine
            .answer(game_id, player, q.id, vec![pick(&qs[0], "A")])
            .await;
        assert!(matches!(result, Err(QuizError::SessionNotActive)));
    }

    #[tokio::test]
    async fn test_start_session_preconditions() {
        let engine = Engine::new();
        let (game_id, _) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();

        assert_ok!(engine.start_session(game_id, player).await);
        assert!(matches!(
            engine.start_session(game_id, player).await,
            Err(QuizError::SessionAlreadyExists)
        ));
        assert!(matches!(
            engine.start_session(GameId::new(), player).await,
            Err(QuizError::GameNotFound)
        ));
        assert!(matches!(
            engine.state(game_id, PlayerId::new()).await,
            Err(QuizError::SessionNotFound)
        ));

        let draft = engine.games().create(Default::default()).await.unwrap();
        assert!(matches!(
            engine.start_session(draft.id, player).await,
            Err(QuizError::GameNotActive)
        ));
    }

    #[tokio::test]
    async fn test_right_answers_follow_setting() {
        let engine = Engine::new();
        let (hidden_game, qs) = two_question_game(&engine, GameSettings::default()).await;
        let settings = GameSettings {
            show_right_answers: true,
            ..GameSettings::default()
        };
        let (shown_game, shown_qs) = two_question_game(&engine, settings).await;
        let player = PlayerId::new();

        engine.start_session(hidden_game, player).await.unwrap();
        let q = engine.current(hidden_game, player).await;
        let out = engine
            .answer(hidden_game, player, q.id, vec![pick(&qs[0], "B")])
            .await
            .unwrap();
        assert!(out.right_answers.is_none());

        engine.start_session(shown_game, player).await.unwrap();
        let q = engine.current(shown_game, player).await;
        let out = engine
            .answer(shown_game, player, q.id, vec![pick(&shown_qs[0], "B")])
            .await
            .unwrap();
        let right: Vec<String> = out
            .right_answers
            .unwrap()
            .into_iter()
            .map(|o| o.text)
            .collect();
        assert_eq!(right, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_shuffled_answers_keep_stored_order() {
        let engine = Engine::new();
        let settings = GameSettings {
            shuffle_answers: true,
            ..GameSettings::default()
        };
        let options: Vec<(String, bool)> = (0..8).map(|i| (format!("opt{i}"), i == 0)).collect();
        let borrowed: Vec<(&str, bool)> = options.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        let (game_id, qs) = engine
            .published_game(
                settings,
                vec![question(QuestionType::OneOfChoice, "Pick", &borrowed)],
            )
            .await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let shown = engine.current(game_id, player).await;
        let mut shown_ids: Vec<_> = shown.answer_options.iter().map(|o| o.id).collect();
        shown_ids.sort();
        let stored_ids: Vec<_> = qs[0].answer_options.iter().map(|o| o.id).collect();
        assert_eq!(shown_ids, stored_ids);

        let stored = engine.store.snapshot().await.questions[0].clone();
        let stored_after: Vec<_> = stored.answer_options.iter().map(|o| o.id).collect();
        assert_eq!(stored_after, stored_ids);
    }

    #[tokio::test]
    async fn test_fill_the_gap_tolerates_typos() {
        let engine = Engine::new();
        let (game_id, _) = engine
            .published_game(
                GameSettings::default(),
                vec![
                    question(QuestionType::FillTheGap, "Big grey animal", &[("elephant", true)]),
                    question(QuestionType::FillTheGap, "Tall animal", &[("giraffe", true)]),
                ],
            )
            .await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let q = engine.current(game_id, player).await;
        let out = engine
            .answer(game_id, player, q.id, vec!["Elefant".into()])
            .await
            .unwrap();
        assert!(out.is_correct);

        let q = engine.current(game_id, player).await;
        let out = engine
            .answer(game_id, player, q.id, vec!["elephant".into()])
            .await
            .unwrap();
        assert!(!out.is_correct);
    }

    #[tokio::test]
    async fn test_invalid_submission_leaves_item_pending() {
        let engine = Engine::new();
        let (game_id, qs) = two_question_game(&engine, GameSettings::default()).await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();
        let q = engine.current(game_id, player).await;

        let two_picks = engine
            .answer(game_id, player, q.id, vec![pick(&qs[0], "A"), pick(&qs[0], "B")])
            .await;
        assert!(matches!(two_picks, Err(QuizError::InvalidInput(_))));

        let items = engine.store.snapshot().await.items;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_pending());
    }
}

#[cfg(test)]
mod consistency_tests {
    use std::time::Duration;

    use super::support::*;
    use kernel::id::PlayerId;

    use crate::application::config::QuizConfig;
    use crate::domain::repository::{GameRepository, TransactionManager};
    use crate::domain::value_object::{game_settings::GameSettings, question_type::QuestionType};
    use crate::domain::Game;
    use crate::error::QuizError;
    use crate::infra::memory::InMemoryTransactionManager;

    #[tokio::test]
    async fn test_concurrent_state_requests_share_one_pending_item() {
        let engine = Engine::new();
        let settings = GameSettings {
            shuffle_questions: true,
            ..GameSettings::default()
        };
        let (game_id, _) = engine
            .published_game(
                settings,
                (1..=5)
                    .map(|n| {
                        question(
                            QuestionType::Choice,
                            &format!("Q{n}"),
                            &[("a", true), ("b", false)],
                        )
                    })
                    .collect(),
            )
            .await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();

        let (left, right) = tokio::join!(
            engine.state(game_id, player),
            engine.state(game_id, player)
        );
        let left = left.unwrap().current_question.map(|q| q.id);
        let right = right.unwrap().current_question.map(|q| q.id);

        assert_eq!(left, right);
        let items = engine.store.snapshot().await.items;
        assert_eq!(items.iter().filter(|i| i.is_pending()).count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = InMemoryTransactionManager::new();
        let game = Game::new(None, GameSettings::default());

        let mut tx = store.begin().await.unwrap();
        tx.insert_game(&game).await.unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_game(game.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_commits_nothing() {
        let store = InMemoryTransactionManager::new().with_commit_delay(Duration::from_secs(10));
        let config = QuizConfig {
            operation_timeout: Duration::from_millis(50),
            ..QuizConfig::default()
        };
        let engine = Engine::with(store, config);

        let result = engine.games().create(Default::default()).await;
        assert!(matches!(result, Err(QuizError::Timeout)));
        assert!(engine.store.snapshot().await.games.is_empty());
    }
}

#[cfg(test)]
mod game_tests {
    use super::support::*;
    use kernel::id::{GameId, PlayerId, QuestionId};

    use crate::application::get_current_state::Progress;
    use crate::application::list_sessions::{ListSessionsUseCase, PageRequest};
    use crate::application::manage_game::{AddQuestionInput, CreateGameInput};
    use crate::application::rename_player::RenamePlayerUseCase;
    use crate::application::session_statistics::SessionStatisticsUseCase;
    use crate::domain::entity::question::NewAnswerOption;
    use crate::domain::service::question_graph::GraphError;
    use crate::domain::value_object::{
        game_settings::GameSettings, game_status::GameStatus, question_type::QuestionType,
    };
    use crate::error::QuizError;

    fn branch(text: &str, options: &[(&str, Option<QuestionId>)]) -> AddQuestionInput {
        AddQuestionInput {
            text: text.into(),
            question_type: QuestionType::Choice,
            image_id: None,
            answer_options: options
                .iter()
                .enumerate()
                .map(|(i, (text, next))| NewAnswerOption {
                    text: (*text).into(),
                    is_correct: i == 0,
                    next_question_id: *next,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_game_lifecycle() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games
            .create(CreateGameInput {
                title: Some("  Capitals  ".into()),
                settings: GameSettings::default(),
            })
            .await
            .unwrap();
        assert_eq!(game.title.as_deref(), Some("Capitals"));
        assert_eq!(game.status, GameStatus::Created);

        assert!(matches!(
            games.start(game.id).await,
            Err(QuizError::GameHasNoQuestions)
        ));
        assert!(matches!(
            games.finish(game.id).await,
            Err(QuizError::InvalidGameTransition { .. })
        ));

        games
            .add_question(game.id, question(QuestionType::Choice, "Q", &[("a", true)]))
            .await
            .unwrap();
        let started = games.start(game.id).await.unwrap();
        assert_eq!(started.status, GameStatus::Started);

        assert!(matches!(
            games
                .add_question(game.id, question(QuestionType::Choice, "Late", &[("a", true)]))
                .await,
            Err(QuizError::GameNotEditable)
        ));
        assert!(matches!(
            games.start(game.id).await,
            Err(QuizError::InvalidGameTransition { .. })
        ));

        let finished = games.finish(game.id).await.unwrap();
        assert_eq!(finished.status, GameStatus::Finished);
        assert!(matches!(
            engine.start_session(game.id, PlayerId::new()).await,
            Err(QuizError::GameNotActive)
        ));
        assert!(matches!(
            games.get(GameId::new()).await,
            Err(QuizError::GameNotFound)
        ));
    }

    #[tokio::test]
    async fn test_game_changes_hold_the_game_lock() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        games
            .add_question(game.id, question(QuestionType::Choice, "Q", &[("a", true)]))
            .await
            .unwrap();
        games.start(game.id).await.unwrap();
        games.get(game.id).await.unwrap();
        games.statistics(game.id).await.unwrap();
        games.finish(game.id).await.unwrap();

        // add_question, start and finish; reads do not lock
        let locks = engine.store.snapshot().await.game_locks;
        assert_eq!(locks, vec![game.id; 3]);
    }

    #[tokio::test]
    async fn test_start_racing_add_question_keeps_graph_valid() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        let leaf = games
            .add_question(game.id, branch("Leaf", &[("ok", None)]))
            .await
            .unwrap();
        games
            .add_question(game.id, branch("Root", &[("next", Some(leaf.id))]))
            .await
            .unwrap();

        let (started, added) = tokio::join!(
            games.start(game.id),
            games.add_question(game.id, branch("Stray", &[("ok", None)])),
        );

        match (started, added) {
            // start won: the stray question was refused
            (Ok(game), Err(QuizError::GameNotEditable)) => {
                assert_eq!(game.status, GameStatus::Started);
                let details = games.get(game.id).await.unwrap();
                assert_eq!(details.questions.len(), 2);

                let player = PlayerId::new();
                engine.start_session(game.id, player).await.unwrap();
                assert_ne!(engine.current(game.id, player).await.text, "Stray");
            }
            // add won: start saw the second root
            (Err(QuizError::InvalidGraph(GraphError::MultipleRoots(_))), Ok(_)) => {
                let details = games.get(game.id).await.unwrap();
                assert_eq!(details.game.status, GameStatus::Created);
            }
            other => panic!("inconsistent outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_questions_are_numbered_in_insertion_order() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        for text in ["first", "second", "third"] {
            games
                .add_question(game.id, question(QuestionType::Choice, text, &[("a", true)]))
                .await
                .unwrap();
        }

        let details = games.get(game.id).await.unwrap();
        let listed: Vec<(i64, &str)> = details
            .questions
            .iter()
            .map(|q| (q.sort, q.text.as_str()))
            .collect();
        assert_eq!(listed, vec![(3, "third"), (2, "second"), (1, "first")]);
    }

    #[tokio::test]
    async fn test_add_question_validation() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        assert!(matches!(
            games
                .add_question(game.id, question(QuestionType::Choice, "Q", &[]))
                .await,
            Err(QuizError::EmptyAnswerOptions)
        ));
        assert!(matches!(
            games
                .add_question(game.id, question(QuestionType::Choice, "Q", &[("a", false)]))
                .await,
            Err(QuizError::InvalidInput(_))
        ));
        assert!(matches!(
            games
                .add_question(game.id, branch("Q", &[("a", Some(QuestionId::new()))]))
                .await,
            Err(QuizError::InvalidInput(_))
        ));
        assert!(matches!(
            games
                .add_question(GameId::new(), question(QuestionType::Choice, "Q", &[("a", true)]))
                .await,
            Err(QuizError::GameNotFound)
        ));
    }

    #[tokio::test]
    async fn test_branching_game_follows_chosen_option() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        let left = games
            .add_question(game.id, branch("Left", &[("done", None)]))
            .await
            .unwrap();
        let right = games
            .add_question(game.id, branch("Right", &[("done", None)]))
            .await
            .unwrap();
        let root = games
            .add_question(
                game.id,
                branch("Root", &[("go left", Some(left.id)), ("go right", Some(right.id))]),
            )
            .await
            .unwrap();
        games.start(game.id).await.unwrap();

        let player = PlayerId::new();
        engine.start_session(game.id, player).await.unwrap();

        let first = engine.current(game.id, player).await;
        assert_eq!(first.id, root.id);
        engine
            .answer(game.id, player, root.id, vec![pick(&root, "go right")])
            .await
            .unwrap();

        let second = engine.current(game.id, player).await;
        assert_eq!(second.id, right.id);
        engine
            .answer(game.id, player, right.id, vec![pick(&right, "done")])
            .await
            .unwrap();

        assert!(matches!(
            engine.state(game.id, player).await,
            Err(QuizError::QuestionQueueEmpty)
        ));
    }

    #[tokio::test]
    async fn test_start_rejects_graph_with_two_roots() {
        let engine = Engine::new();
        let games = engine.games();
        let game = games.create(Default::default()).await.unwrap();

        let leaf = games
            .add_question(game.id, branch("Leaf", &[("ok", None)]))
            .await
            .unwrap();
        games
            .add_question(game.id, branch("Root", &[("next", Some(leaf.id))]))
            .await
            .unwrap();
        games
            .add_question(game.id, branch("Stray", &[("ok", None)]))
            .await
            .unwrap();

        assert!(matches!(
            games.start(game.id).await,
            Err(QuizError::InvalidGraph(GraphError::MultipleRoots(_)))
        ));
        let details = games.get(game.id).await.unwrap();
        assert_eq!(details.game.status, GameStatus::Created);
    }

    #[tokio::test]
    async fn test_statistics_and_session_listing() {
        let engine = Engine::new();
        let (game_id, qs) = engine
            .published_game(
                GameSettings::default(),
                vec![
                    question(QuestionType::Choice, "Q1", &[("a", true), ("b", false)]),
                    question(QuestionType::Choice, "Q2", &[("a", true), ("b", false)]),
                ],
            )
            .await;
        let (early, late) = (PlayerId::new(), PlayerId::new());

        engine.start_session(game_id, early).await.unwrap();
        let q = engine.current(game_id, early).await;
        engine
            .answer(game_id, early, q.id, vec![pick(&qs[0], "a")])
            .await
            .unwrap();
        engine.current(game_id, early).await;
        engine.finish(game_id, early).await.unwrap();

        engine.start_session(game_id, late).await.unwrap();

        let stats = SessionStatisticsUseCase::new(engine.tx_manager.clone(), engine.config.clone())
            .execute(game_id, early)
            .await
            .unwrap();
        assert_eq!(stats.questions_count, 2);
        assert_eq!(stats.answered_count, 1);
        assert_eq!(stats.correct_answers_count, 1);

        let game_stats = engine.games().statistics(game_id).await.unwrap();
        assert_eq!(game_stats.participants_count, 2);
        assert_eq!(game_stats.finished_count, 1);
        assert_eq!(game_stats.completion_rate, 50);

        let listing = ListSessionsUseCase::new(engine.tx_manager.clone(), engine.config.clone());
        let page = listing
            .execute(
                game_id,
                PageRequest {
                    page: Some(1),
                    limit: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.questions_count, 2);
        assert_eq!(page.sessions.len(), 1);
        assert_eq!(page.sessions[0].session.player_id, late);

        let page = listing
            .execute(
                game_id,
                PageRequest {
                    page: Some(2),
                    limit: Some(1),
                },
            )
            .await
            .unwrap();
        let earliest = &page.sessions[0];
        assert_eq!(earliest.session.player_id, early);
        assert_eq!(earliest.player_name, "unknown");
        assert_eq!(earliest.items.len(), 2);
        assert_eq!(earliest.answered_count(), 1);
        assert_eq!(earliest.completion_rate(page.questions_count), 50);

        assert!(matches!(
            listing.execute(GameId::new(), PageRequest::default()).await,
            Err(QuizError::GameNotFound)
        ));
    }

    #[tokio::test]
    async fn test_rename_player() {
        let engine = Engine::new();
        let (game_id, _) = engine
            .published_game(
                GameSettings::default(),
                vec![question(QuestionType::Choice, "Q", &[("a", true)])],
            )
            .await;
        let player = PlayerId::new();
        engine.start_session(game_id, player).await.unwrap();
        let rename = RenamePlayerUseCase::new(engine.tx_manager.clone(), engine.config.clone());

        let renamed = rename.execute(player, "  Alice  ".into()).await.unwrap();
        assert_eq!(renamed.name, "Alice");
        assert!(renamed.name_user_entered);

        let long = rename.execute(player, "x".repeat(40)).await.unwrap();
        assert_eq!(long.name.chars().count(), 25);

        assert!(matches!(
            rename.execute(player, "   ".into()).await,
            Err(QuizError::InvalidInput(_))
        ));
        assert!(matches!(
            rename.execute(PlayerId::new(), "Bob".into()).await,
            Err(QuizError::PlayerNotFound)
        ));

        let state = engine.state(game_id, player).await.unwrap();
        assert_eq!(state.progress, Progress { answered: 0, total: 1 });
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::config::QuizConfig;
    use crate::infra::memory::InMemoryTransactionManager;
    use crate::presentation::router::quiz_router_generic;

    fn app() -> Router {
        quiz_router_generic(InMemoryTransactionManager::new(), QuizConfig::default())
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_play_through_over_http() {
        let app = app();

        let (status, game) = call(
            &app,
            Method::POST,
            "/games",
            Some(json!({"title": "Capitals"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let game_id = game["gameId"].as_str().unwrap().to_string();

        let (status, question) = call(
            &app,
            Method::POST,
            &format!("/games/{game_id}/questions"),
            Some(json!({
                "text": "Capital of France?",
                "questionType": "choice",
                "answerOptions": [
                    {"text": "Paris", "isCorrect": true},
                    {"text": "Lyon"}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(question["sort"], 1);
        let paris = question["answerOptions"][0]["id"].to_string();

        let (status, _) = call(&app, Method::POST, &format!("/games/{game_id}/start"), None).await;
        assert_eq!(status, StatusCode::OK);

        let player_id = uuid::Uuid::new_v4();
        let session = format!("/games/{game_id}/players/{player_id}/session");

        // First visit starts the session.
        let (status, state) = call(&app, Method::GET, &session, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["status"], "started");
        assert_eq!(state["progress"], json!({"answered": 0, "total": 1}));
        let current = &state["currentQuestion"];
        assert!(current["answerOptions"][0].get("isCorrect").is_none());
        let question_id = current["questionId"].as_str().unwrap().to_string();

        let (status, verdict) = call(
            &app,
            Method::POST,
            &format!("{session}/answers"),
            Some(json!({"questionId": question_id, "answers": [paris]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verdict["isCorrect"], true);

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("{session}/answers"),
            Some(json!({"questionId": question_id, "answers": [paris]})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Nothing left: the session is closed for the player.
        let (status, state) = call(&app, Method::GET, &session, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["status"], "finished");
        assert!(state["currentQuestion"].is_null());

        let (status, stats) = call(&app, Method::GET, &format!("{session}/statistics"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            stats,
            json!({"questionsCount": 1, "answeredCount": 1, "correctAnswersCount": 1})
        );

        let (status, renamed) = call(
            &app,
            Method::PUT,
            &format!("/players/{player_id}/name"),
            Some(json!({"name": "Ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Ada");

        let (status, listing) = call(
            &app,
            Method::GET,
            &format!("/games/{game_id}/sessions?page=1&limit=5"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["totalCount"], 1);
        assert_eq!(listing["sessions"][0]["playerName"], "Ada");
        assert_eq!(listing["sessions"][0]["completionRate"], 100);
    }

    #[tokio::test]
    async fn test_error_statuses_over_http() {
        let app = app();
        let missing = uuid::Uuid::new_v4();

        let (status, _) = call(&app, Method::GET, &format!("/games/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, game) = call(&app, Method::POST, "/games", Some(json!({}))).await;
        let game_id = game["gameId"].as_str().unwrap().to_string();

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/games/{game_id}/questions"),
            Some(json!({
                "text": "Essay",
                "questionType": "essay",
                "answerOptions": [{"text": "anything", "isCorrect": true}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(&app, Method::POST, &format!("/games/{game_id}/start"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let player_id = uuid::Uuid::new_v4();
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/games/{game_id}/players/{player_id}/session"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::domain::service::question_graph::GraphError;
    use crate::error::QuizError;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(QuizError, StatusCode)> = vec![
            (QuizError::GameNotFound, StatusCode::NOT_FOUND),
            (QuizError::SessionItemNotFound, StatusCode::NOT_FOUND),
            (QuizError::GameNotEditable, StatusCode::CONFLICT),
            (QuizError::SessionNotActive, StatusCode::CONFLICT),
            (QuizError::ConcurrentModification, StatusCode::CONFLICT),
            (QuizError::QuestionQueueEmpty, StatusCode::GONE),
            (QuizError::GameHasNoQuestions, StatusCode::UNPROCESSABLE_ENTITY),
            (
                QuizError::InvalidGraph(GraphError::Empty),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                QuizError::InvalidInput("answers".into()),
                StatusCode::BAD_REQUEST,
            ),
            (QuizError::Timeout, StatusCode::REQUEST_TIMEOUT),
            (
                QuizError::Database(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_error_display() {
        assert!(QuizError::AlreadyAnswered.to_string().contains("answered"));
        assert!(
            QuizError::UnsupportedQuestionType("essay".into())
                .to_string()
                .contains("essay")
        );
    }
}
