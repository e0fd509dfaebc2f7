//! Library Error Types
//!
//! Service errors wrap the errors of the crates underneath them. What a user
//! gets to see is decided by [`ErrorKind::category`], never by the error
//! tree itself.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which thing was absent.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The catalog has no such record.
    #[display("catalog record")]
    Record,
    /// The catalog has the record, but its file is gone from storage.
    #[display("file")]
    File,
}

/// Why a question was refused before anything was spent on it.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum QuestionProblem {
    #[display("question is empty")]
    Empty,
    #[display("question is longer than {max} characters")]
    TooLong { max: usize },
}

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("catalog error")]
    Catalog,
    #[display("storage error")]
    Storage,
    #[display("search error")]
    Search,
    #[display("{_0} not found")]
    NotFound(#[error(not(source))] NotFound),
    #[display("{_0}")]
    InvalidQuestion(#[error(not(source))] QuestionProblem),
    /// A question arrived while the user was not being asked for one.
    #[display("no question was requested")]
    NoPendingQuestion,
    #[display("completion service unavailable")]
    ServiceUnavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog | Self::Storage | Self::ServiceUnavailable)
    }

    /// The message a user is shown for this error.
    pub fn category(&self) -> MessageCategory {
        match self {
            Self::Catalog | Self::Storage | Self::Search => MessageCategory::DataError,
            Self::InvalidQuestion(_) | Self::NoPendingQuestion => MessageCategory::DataError,
            Self::NotFound(_) => MessageCategory::NotFound,
            Self::ServiceUnavailable => MessageCategory::ServiceUnavailable,
        }
    }
}

/// User-facing failure categories. None of them carry internal detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    DataError,
    NotFound,
    /// Not an error: reported from [`Begin::LimitReached`](crate::Begin) and
    /// [`Reply::LimitReached`](crate::Reply), never by
    /// [`ErrorKind::category`].
    LimitReached,
    ServiceUnavailable,
}

impl MessageCategory {
    /// Default wording, in the catalog's language.
    pub fn text(self) -> &'static str {
        match self {
            Self::DataError => "Ошибка в данных запроса. Попробуйте ещё раз.",
            Self::NotFound => "Файл не найден!",
            Self::LimitReached => "Вы исчерпали лимит вопросов на сегодня. Возвращайтесь завтра!",
            Self::ServiceUnavailable => "Сервис ответов временно недоступен. Попробуйте позже.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Catalog, MessageCategory::DataError)]
    #[case(ErrorKind::InvalidQuestion(QuestionProblem::Empty), MessageCategory::DataError)]
    #[case(ErrorKind::NotFound(NotFound::File), MessageCategory::NotFound)]
    #[case(ErrorKind::ServiceUnavailable, MessageCategory::ServiceUnavailable)]
    fn test_category(#[case] kind: ErrorKind, #[case] expected: MessageCategory) {
        assert_eq!(kind.category(), expected);
    }

    #[rstest]
    #[case(ErrorKind::Catalog)]
    #[case(ErrorKind::Storage)]
    #[case(ErrorKind::Search)]
    #[case(ErrorKind::NotFound(NotFound::Record))]
    #[case(ErrorKind::InvalidQuestion(QuestionProblem::TooLong { max: 300 }))]
    #[case(ErrorKind::NoPendingQuestion)]
    #[case(ErrorKind::ServiceUnavailable)]
    fn test_limit_reached_is_never_an_error(#[case] kind: ErrorKind) {
        assert_ne!(kind.category(), MessageCategory::LimitReached);
    }

    #[test]
    fn test_messages_are_distinct() {
        let texts = [
            MessageCategory::DataError,
            MessageCategory::NotFound,
            MessageCategory::LimitReached,
            MessageCategory::ServiceUnavailable,
        ]
        .map(MessageCategory::text);
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
