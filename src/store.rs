// src/store.rs
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{Choice, Question};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A question together with the choices it owns.
#[derive(Debug, Clone)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// Storage abstraction so handlers and tests can run without Postgres.
///
/// Every read takes the current time as an argument: eligibility (published,
/// not in the future, owning at least one choice) is evaluated at one instant
/// for the whole request.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Eligible questions, most recently published first.
    async fn latest_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>, StoreError>;

    /// The question and its choices, if the question is eligible.
    async fn eligible_question(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<QuestionDetail>, StoreError>;

    /// Add one vote to the given choice. Returns false when the choice does
    /// not belong to the question.
    async fn record_vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError>;
}

pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn latest_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>, StoreError> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions \
             WHERE pub_date <= $1 \
             AND EXISTS (SELECT 1 FROM choices WHERE choices.question_id = questions.id) \
             ORDER BY pub_date DESC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn eligible_question(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<QuestionDetail>, StoreError> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions \
             WHERE id = $1 AND pub_date <= $2 \
             AND EXISTS (SELECT 1 FROM choices WHERE choices.question_id = questions.id)",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        let Some(question) = question else {
            return Ok(None);
        };

        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM choices \
             WHERE question_id = $1 ORDER BY id",
        )
        .bind(question.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(QuestionDetail { question, choices }))
    }

    async fn record_vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = $1 AND question_id = $2")
                .bind(choice_id)
                .bind(question_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Mutex-guarded store used by the test suite and as the fallback backend
/// when no DATABASE_URL is configured. Mirrors the SQL semantics.
#[derive(Default, Clone)]
pub struct InMemoryPollStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    questions: Vec<Question>,
    choices: Vec<Choice>,
    next_question_id: i64,
    next_choice_id: i64,
}

impl InMemoryPollStore {
    pub fn add_question(&self, question_text: &str, pub_date: DateTime<Utc>) -> i64 {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.next_question_id += 1;
        let id = state.next_question_id;
        state.questions.push(Question {
            id,
            question_text: question_text.to_string(),
            pub_date,
        });
        id
    }

    pub fn add_choice(&self, question_id: i64, choice_text: &str) -> i64 {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.next_choice_id += 1;
        let id = state.next_choice_id;
        state.choices.push(Choice {
            id,
            question_id,
            choice_text: choice_text.to_string(),
            votes: 0,
        });
        id
    }
}

fn eligible(question: &Question, state: &MemoryState, now: DateTime<Utc>) -> bool {
    question.pub_date <= now
        && state
            .choices
            .iter()
            .any(|choice| choice.question_id == question.id)
}

#[async_trait]
impl PollStore for InMemoryPollStore {
    async fn latest_questions(&self, now: DateTime<Utc>) -> Result<Vec<Question>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut questions: Vec<Question> = state
            .questions
            .iter()
            .filter(|question| eligible(question, &state, now))
            .cloned()
            .collect();
        questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(questions)
    }

    async fn eligible_question(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<QuestionDetail>, StoreError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let question = state
            .questions
            .iter()
            .find(|question| question.id == id && eligible(question, &state, now))
            .cloned();

        Ok(question.map(|question| {
            let choices = state
                .choices
                .iter()
                .filter(|choice| choice.question_id == question.id)
                .cloned()
                .collect();
            QuestionDetail { question, choices }
        }))
    }

    async fn record_vote(&self, question_id: i64, choice_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        match state
            .choices
            .iter_mut()
            .find(|choice| choice.id == choice_id && choice.question_id == question_id)
        {
            Some(choice) => {
                choice.votes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with_question(days_offset: i64, with_choices: bool) -> (InMemoryPollStore, i64) {
        let store = InMemoryPollStore::default();
        let pub_date = Utc::now() + Duration::days(days_offset);
        let question_id = store.add_question("Past question", pub_date);
        if with_choices {
            store.add_choice(question_id, "choice 1");
            store.add_choice(question_id, "choice 2");
        }
        (store, question_id)
    }

    #[tokio::test]
    async fn latest_questions_orders_most_recent_first() {
        let store = InMemoryPollStore::default();
        let older = store.add_question("older", Utc::now() - Duration::days(30));
        let newer = store.add_question("newer", Utc::now() - Duration::days(5));
        store.add_choice(older, "choice 1");
        store.add_choice(newer, "choice 1");

        let questions = store.latest_questions(Utc::now()).await.unwrap();
        let ids: Vec<i64> = questions.iter().map(|question| question.id).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn latest_questions_excludes_future_questions() {
        let (store, _) = store_with_question(30, true);
        let questions = store.latest_questions(Utc::now()).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn latest_questions_excludes_questions_without_choices() {
        let (store, _) = store_with_question(-30, false);
        let questions = store.latest_questions(Utc::now()).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn eligible_question_returns_choices_in_insertion_order() {
        let (store, question_id) = store_with_question(-30, true);
        let detail = store
            .eligible_question(question_id, Utc::now())
            .await
            .unwrap()
            .expect("question is eligible");

        assert_eq!(detail.question.id, question_id);
        let texts: Vec<&str> = detail
            .choices
            .iter()
            .map(|choice| choice.choice_text.as_str())
            .collect();
        assert_eq!(texts, vec!["choice 1", "choice 2"]);
    }

    #[tokio::test]
    async fn eligible_question_rejects_future_and_choiceless_questions() {
        let (store, future_id) = store_with_question(30, true);
        assert!(store
            .eligible_question(future_id, Utc::now())
            .await
            .unwrap()
            .is_none());

        let (store, bare_id) = store_with_question(-30, false);
        assert!(store
            .eligible_question(bare_id, Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn record_vote_increments_exactly_one_tally() {
        let (store, question_id) = store_with_question(-30, true);
        let detail = store
            .eligible_question(question_id, Utc::now())
            .await
            .unwrap()
            .expect("question is eligible");
        let choice_id = detail.choices[0].id;

        assert!(store.record_vote(question_id, choice_id).await.unwrap());

        let detail = store
            .eligible_question(question_id, Utc::now())
            .await
            .unwrap()
            .expect("question is eligible");
        assert_eq!(detail.choices[0].votes, 1);
        assert_eq!(detail.choices[1].votes, 0);
    }

    #[tokio::test]
    async fn record_vote_rejects_choices_of_other_questions() {
        let store = InMemoryPollStore::default();
        let first = store.add_question("first", Utc::now() - Duration::days(1));
        let second = store.add_question("second", Utc::now() - Duration::days(1));
        let foreign_choice = store.add_choice(first, "choice 1");
        store.add_choice(second, "choice 1");

        assert!(!store.record_vote(second, foreign_choice).await.unwrap());
        assert!(!store.record_vote(second, 9999).await.unwrap());
    }
}
