//! Questions about a book, metered by the daily quota.
//!
//! A question takes two steps. [`QaService::begin`] puts the user into
//! [`QaState::AwaitingQuestion`] (if they have quota left), and the next
//! message goes to [`QaService::answer`], which always returns the user to
//! [`QaState::Idle`], whatever the outcome.

use crate::download::UNKNOWN_BOOK;
use crate::error::{ErrorKind, QuestionProblem, Result};
use exn::ResultExt;
use shelf_catalog::{Database, QuotaConfig, QuotaRepository, Repository};
use shelf_llm::{Completion, LlmConfig};
use std::collections::HashMap;
use std::sync::Arc;
use time::Date;
use tokio::sync::Mutex;
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QaState {
    #[default]
    Idle,
    AwaitingQuestion { book_id: i64 },
}

/// Per-user conversation state. Users without an entry are idle.
#[derive(Debug, Default)]
pub struct Sessions {
    awaiting: Mutex<HashMap<i64, i64>>,
}

impl Sessions {
    pub async fn state(&self, user_id: i64) -> QaState {
        match self.awaiting.lock().await.get(&user_id) {
            Some(&book_id) => QaState::AwaitingQuestion { book_id },
            None => QaState::Idle,
        }
    }

    /// Any state → `AwaitingQuestion`. Asking about another book replaces
    /// the pending one. Returns the previous state.
    pub async fn begin(&self, user_id: i64, book_id: i64) -> QaState {
        match self.awaiting.lock().await.insert(user_id, book_id) {
            Some(book_id) => QaState::AwaitingQuestion { book_id },
            None => QaState::Idle,
        }
    }

    /// `AwaitingQuestion` → `Idle`, handing back the book.
    pub async fn take(&self, user_id: i64) -> Option<i64> {
        self.awaiting.lock().await.remove(&user_id)
    }

    /// Any state → `Idle`. Returns whether a question was pending.
    pub async fn cancel(&self, user_id: i64) -> bool {
        self.take(user_id).await.is_some()
    }
}

/// Result of [`QaService::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Begin {
    AwaitingQuestion { book_id: i64, remaining: u32 },
    LimitReached { limit: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub book_name: String,
    pub text: String,
    /// Questions used today, including this one.
    pub used: u32,
    pub limit: u32,
}

/// Result of [`QaService::answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answered(Answer),
    /// The last slot went elsewhere (another device, another tab) between
    /// `begin` and `answer`.
    LimitReached { limit: u32 },
}

pub struct QaService {
    sessions: Sessions,
    quota: QuotaRepository,
    repo: Repository,
    completion: Arc<dyn Completion>,
    max_question_len: usize,
}

impl QaService {
    pub fn new(db: &Database, quota: &QuotaConfig, llm: &LlmConfig, completion: Arc<dyn Completion>) -> Self {
        Self {
            sessions: Sessions::default(),
            quota: QuotaRepository::new(db, quota),
            repo: Repository::from(db),
            completion,
            max_question_len: llm.max_question_len,
        }
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Questions used so far on `today`.
    pub async fn used(&self, user_id: i64, today: Date) -> Result<u32> {
        self.quota.count(user_id, today).await.or_raise(|| ErrorKind::Catalog)
    }

    pub fn daily_limit(&self) -> u32 {
        self.quota.daily_limit()
    }

    /// Starts waiting for a question about `book_id`, unless the user has
    /// nothing left for today. Nothing is spent yet.
    #[instrument(skip(self))]
    pub async fn begin(&self, user_id: i64, book_id: i64, today: Date) -> Result<Begin> {
        let limit = self.quota.daily_limit();
        let used = self.used(user_id, today).await?;
        if used >= limit {
            tracing::debug!(used, limit, "question refused before asking");
            return Ok(Begin::LimitReached { limit });
        }
        self.sessions.begin(user_id, book_id).await;
        Ok(Begin::AwaitingQuestion {
            book_id,
            remaining: limit - used,
        })
    }

    /// Answers the pending question.
    ///
    /// The quota is spent before the completion call and is not refunded if
    /// the call fails. A refused question (blank or too long) spends nothing.
    #[instrument(skip(self, question))]
    pub async fn answer(&self, user_id: i64, question: &str, today: Date) -> Result<Reply> {
        let book_id = self
            .sessions
            .take(user_id)
            .await
            .ok_or_else(|| exn::Exn::from(ErrorKind::NoPendingQuestion))?;
        let question = self.validate(question)?;

        let increment = self.quota.increment(user_id, today).await.or_raise(|| ErrorKind::Catalog)?;
        let limit = self.quota.daily_limit();
        if !increment.accepted {
            return Ok(Reply::LimitReached { limit });
        }

        let book_name = self
            .repo
            .book_display_name(book_id)
            .await
            .or_raise(|| ErrorKind::Catalog)?
            .unwrap_or_else(|| UNKNOWN_BOOK.to_string());
        let text = match self.completion.ask(&book_name, question).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = ?e, book_id, "completion failed");
                return Err(e).or_raise(|| ErrorKind::ServiceUnavailable);
            },
        };
        Ok(Reply::Answered(Answer {
            book_name,
            text,
            used: increment.count,
            limit,
        }))
    }

    /// Stops waiting for a question. Returns whether one was pending.
    pub async fn cancel(&self, user_id: i64) -> bool {
        self.sessions.cancel(user_id).await
    }

    fn validate<'q>(&self, question: &'q str) -> Result<&'q str> {
        let question = question.trim();
        if question.is_empty() {
            exn::bail!(ErrorKind::InvalidQuestion(QuestionProblem::Empty));
        }
        if question.chars().count() > self.max_question_len {
            exn::bail!(ErrorKind::InvalidQuestion(QuestionProblem::TooLong {
                max: self.max_question_len,
            }));
        }
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageCategory;
    use crate::testing::{book_id, catalog};
    use async_trait::async_trait;
    use shelf_llm::error::ErrorKind as LlmErrorKind;
    use std::sync::Mutex as StdMutex;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 03 - 14);
    const USER: i64 = 42;

    /// Records what it was asked and answers from a script.
    #[derive(Default)]
    struct FakeCompletion {
        fail: bool,
        asked: StdMutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Completion for FakeCompletion {
        async fn ask(&self, context: &str, question: &str) -> shelf_llm::error::Result<String> {
            self.asked.lock().unwrap().push((context.to_string(), question.to_string()));
            if self.fail {
                exn::bail!(LlmErrorKind::Timeout);
            }
            Ok(format!("about {context}"))
        }
    }

    async fn service(daily_limit: u32, fail: bool) -> (Database, Repository, Arc<FakeCompletion>, QaService) {
        let (db, repo) = catalog().await;
        let completion = Arc::new(FakeCompletion { fail, ..FakeCompletion::default() });
        let service = QaService::new(&db, &QuotaConfig { daily_limit }, &LlmConfig::default(), completion.clone());
        (db, repo, completion, service)
    }

    #[tokio::test]
    async fn test_sessions_state_machine() {
        let sessions = Sessions::default();
        assert_eq!(sessions.state(1).await, QaState::Idle);
        assert_eq!(sessions.begin(1, 10).await, QaState::Idle);
        assert_eq!(sessions.begin(1, 11).await, QaState::AwaitingQuestion { book_id: 10 });
        assert_eq!(sessions.state(1).await, QaState::AwaitingQuestion { book_id: 11 });
        assert_eq!(sessions.state(2).await, QaState::Idle);
        assert_eq!(sessions.take(1).await, Some(11));
        assert_eq!(sessions.take(1).await, None);
        sessions.begin(1, 12).await;
        assert!(sessions.cancel(1).await);
        assert!(!sessions.cancel(1).await);
    }

    #[tokio::test]
    async fn test_question_round_trip() {
        let (_db, repo, completion, service) = service(10, false).await;
        let hobbit = book_id(&repo, "Hobbit").await;

        let begin = service.begin(USER, hobbit, TODAY).await.unwrap();
        assert_eq!(begin, Begin::AwaitingQuestion { book_id: hobbit, remaining: 10 });
        assert_eq!(service.sessions().state(USER).await, QaState::AwaitingQuestion { book_id: hobbit });

        let reply = service.answer(USER, "  Кто такой Бильбо?  ", TODAY).await.unwrap();
        assert_eq!(
            reply,
            Reply::Answered(Answer {
                book_name: "Hobbit — Tolkien".to_string(),
                text: "about Hobbit — Tolkien".to_string(),
                used: 1,
                limit: 10,
            })
        );
        assert_eq!(
            *completion.asked.lock().unwrap(),
            [("Hobbit — Tolkien".to_string(), "Кто такой Бильбо?".to_string())]
        );
        assert_eq!(service.sessions().state(USER).await, QaState::Idle);
        assert_eq!(service.used(USER, TODAY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_begin_refuses_when_limit_reached() {
        let (_db, repo, _completion, service) = service(1, false).await;
        let hobbit = book_id(&repo, "Hobbit").await;
        service.begin(USER, hobbit, TODAY).await.unwrap();
        service.answer(USER, "Сколько страниц?", TODAY).await.unwrap();

        let begin = service.begin(USER, hobbit, TODAY).await.unwrap();
        assert_eq!(begin, Begin::LimitReached { limit: 1 });
        assert_eq!(service.sessions().state(USER).await, QaState::Idle);
    }

    #[tokio::test]
    async fn test_answer_without_begin() {
        let (_db, _repo, _completion, service) = service(10, false).await;
        let err = service.answer(USER, "Вопрос?", TODAY).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NoPendingQuestion));
    }

    #[tokio::test]
    async fn test_invalid_questions_spend_nothing() {
        let (_db, repo, completion, service) = service(10, false).await;
        let hobbit = book_id(&repo, "Hobbit").await;

        service.begin(USER, hobbit, TODAY).await.unwrap();
        let err = service.answer(USER, "   ", TODAY).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidQuestion(QuestionProblem::Empty)));
        assert_eq!(service.sessions().state(USER).await, QaState::Idle);

        service.begin(USER, hobbit, TODAY).await.unwrap();
        let long = "ы".repeat(301);
        let err = service.answer(USER, &long, TODAY).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidQuestion(QuestionProblem::TooLong { max: 300 })));

        service.begin(USER, hobbit, TODAY).await.unwrap();
        let longest = "ы".repeat(300);
        assert!(matches!(service.answer(USER, &longest, TODAY).await.unwrap(), Reply::Answered(_)));

        assert_eq!(service.used(USER, TODAY).await.unwrap(), 1);
        assert_eq!(completion.asked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slot_taken_between_begin_and_answer() {
        let (db, repo, completion, service) = service(1, false).await;
        let hobbit = book_id(&repo, "Hobbit").await;
        service.begin(USER, hobbit, TODAY).await.unwrap();

        let elsewhere = QuotaRepository::new(&db, &QuotaConfig { daily_limit: 1 });
        assert!(elsewhere.increment(USER, TODAY).await.unwrap().accepted);

        let reply = service.answer(USER, "Чем закончится?", TODAY).await.unwrap();
        assert_eq!(reply, Reply::LimitReached { limit: 1 });
        assert!(completion.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_is_service_unavailable() {
        let (_db, repo, _completion, service) = service(10, true).await;
        let hobbit = book_id(&repo, "Hobbit").await;
        service.begin(USER, hobbit, TODAY).await.unwrap();

        let err = service.answer(USER, "О чём книга?", TODAY).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ServiceUnavailable));
        assert_eq!(err.category(), MessageCategory::ServiceUnavailable);
        // Spent, not refunded.
        assert_eq!(service.used(USER, TODAY).await.unwrap(), 1);
        assert_eq!(service.sessions().state(USER).await, QaState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_book_still_gets_asked() {
        let (_db, _repo, completion, service) = service(10, false).await;
        service.begin(USER, 9999, TODAY).await.unwrap();
        service.answer(USER, "Кто автор?", TODAY).await.unwrap();
        assert_eq!(completion.asked.lock().unwrap()[0].0, UNKNOWN_BOOK);
    }
}
