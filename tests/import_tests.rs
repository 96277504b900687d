mod common;

use std::sync::Arc;

use common::{FixedLlmClient, TestStores};
use quizstats_server::{
    ingest::{ExtractedPart, ExtractedQuiz, QuizImporter, QuizRow},
    repositories::{AnswerRepository, QuestionRepository, QuizRepository},
};

fn row(
    theme: &str,
    question: &str,
    player: Option<&str>,
    team: Option<&str>,
    guessed: bool,
) -> QuizRow {
    QuizRow {
        theme: theme.to_string(),
        xt: Some(1.0),
        xp: Some(1.0),
        question: question.to_string(),
        answer: "Answer".to_string(),
        player: player.map(str::to_string),
        team: team.map(str::to_string),
        guessed,
    }
}

fn extracted() -> ExtractedQuiz {
    ExtractedQuiz {
        season: 3,
        week: "4".to_string(),
        title: "Quiz Night".to_string(),
        parts: vec![
            ExtractedPart {
                sequence: 1,
                themes: vec!["Cinema".to_string()],
                questions: vec![
                    row(
                        "Cinema",
                        "Who directed Jaws?",
                        Some("Ana Silvaa"),
                        Some("jose figueiras"),
                        true,
                    ),
                    row(
                        "Cinema",
                        "Who directed Vertigo?",
                        Some("Equipa"),
                        Some("José Figueiras"),
                        true,
                    ),
                    row(
                        "Mystery Box",
                        "Capital of Peru?",
                        Some("Ana Silva"),
                        Some("Rivals FC"),
                        false,
                    ),
                ],
            },
            ExtractedPart {
                sequence: 2,
                themes: vec!["Art".to_string()],
                questions: vec![row(
                    "Art",
                    "Who painted Guernica?",
                    Some("Zé Ninguém"),
                    Some("José Figueiras"),
                    false,
                )],
            },
        ],
    }
}

#[tokio::test]
async fn imports_questions_and_tracked_answers() {
    let stores = TestStores::new();
    let ana = stores.add_user("Ana", "Silva", "ana").await;
    let state = stores.state();
    let importer = QuizImporter::from_state(&state);

    let summary = importer.import_quiz(&extracted()).await.unwrap();

    assert!(summary.quiz_created);
    assert_eq!(summary.parts, 2);
    assert_eq!(summary.questions, 4);
    assert_eq!(summary.answers, 1);
    assert_eq!(summary.unmatched_players, 1);

    let answers = stores.answers.find_all().await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].user_id, ana.id);
    assert!(answers[0].is_correct);

    let questions = stores.questions.find_all().await.unwrap();
    let boxed: Vec<_> = questions.iter().filter(|q| q.is_box).collect();
    assert_eq!(boxed.len(), 1);
    assert_eq!(boxed[0].statement, "Capital of Peru?");
}

#[tokio::test]
async fn reimport_reuses_every_record() {
    let stores = TestStores::new();
    let ana = stores.add_user("Ana", "Silva", "ana").await;
    let state = stores.state();
    let importer = QuizImporter::from_state(&state);

    let first = importer.import_quiz(&extracted()).await.unwrap();
    let second = importer.import_quiz(&extracted()).await.unwrap();

    assert_eq!(first.new_questions, 4);
    assert!(!second.quiz_created);
    assert_eq!(second.questions, 4);
    assert_eq!(second.new_questions, 0);
    assert_eq!(stores.quizzes.find_all().await.unwrap().len(), 1);
    assert_eq!(stores.quizzes.find_all_parts().await.unwrap().len(), 2);
    assert_eq!(stores.quizzes.find_all_topics().await.unwrap().len(), 3);
    assert_eq!(stores.questions.find_all().await.unwrap().len(), 4);

    let answers = stores.answers.find_all().await.unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].user_id, ana.id);
}

#[tokio::test]
async fn reimport_does_not_recategorize_existing_questions() {
    let stores = TestStores::new();
    let film = stores.add_category("Culture", "Film").await;
    stores.add_category("Culture", "Music").await;

    let llm = FixedLlmClient(Some("Film".to_string()));
    let state = stores.state_with_llm(Some(Arc::new(llm)));
    QuizImporter::from_state(&state)
        .import_quiz(&extracted())
        .await
        .unwrap();

    let llm = FixedLlmClient(Some("Music".to_string()));
    let state = stores.state_with_llm(Some(Arc::new(llm)));
    QuizImporter::from_state(&state)
        .import_quiz(&extracted())
        .await
        .unwrap();

    let questions = stores.questions.find_all().await.unwrap();
    assert_eq!(questions.len(), 4);
    assert!(questions.iter().all(|q| q.category_ids == vec![film.id.clone()]));
}

#[tokio::test]
async fn rows_without_players_import_questions_only() {
    let stores = TestStores::new();
    stores.add_user("Ana", "Silva", "ana").await;
    let state = stores.state();
    let importer = QuizImporter::from_state(&state);

    let data = ExtractedQuiz {
        season: 2,
        week: "7".to_string(),
        title: String::new(),
        parts: vec![ExtractedPart {
            sequence: 1,
            themes: Vec::new(),
            questions: vec![row("Science", "H2O?", None, None, false)],
        }],
    };
    let summary = importer.import_quiz(&data).await.unwrap();

    assert_eq!(summary.questions, 1);
    assert_eq!(summary.answers, 0);
    assert!(stores.answers.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn imported_questions_run_the_categorization_hook() {
    let stores = TestStores::new();
    let film = stores.add_category("Culture", "Film").await;
    let llm = FixedLlmClient(Some("Film".to_string()));
    let state = stores.state_with_llm(Some(Arc::new(llm)));
    let importer = QuizImporter::from_state(&state);

    importer.import_quiz(&extracted()).await.unwrap();

    let questions = stores.questions.find_all().await.unwrap();
    assert!(questions.iter().all(|q| q.category_ids == vec![film.id.clone()]));
}

#[tokio::test]
async fn batch_import_skips_bad_urls() {
    let stores = TestStores::new();
    let state = stores.state();
    let importer = QuizImporter::from_state(&state);

    let batch = importer
        .import_urls(&[
            "https://example.org/not-a-quiz.html".to_string(),
            "https://example.org/also-bad".to_string(),
        ])
        .await;

    assert!(batch.imported.is_empty());
    assert_eq!(batch.failed, 2);
}

#[tokio::test]
async fn unreachable_host_is_a_network_failure() {
    let stores = TestStores::new();
    let state = stores.state();
    let importer = QuizImporter::from_state(&state);
    let unreachable = "http://127.0.0.1:1/QNpt3_1.html".to_string();

    let err = importer.import_url(&unreachable).await.unwrap_err();
    assert!(err.is_network());

    let batch = importer
        .import_urls(&[unreachable, "https://example.org/not-a-quiz.html".to_string()])
        .await;

    assert!(batch.imported.is_empty());
    assert_eq!(batch.failed, 2);
    assert_eq!(batch.network_failures, 1);
}
