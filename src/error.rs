use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CourseId, LessonId, TextField};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Coarse classification hosts can branch on without matching every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    OwnerOnly,
    NotFound,
    NotEnrolled,
    InvalidArgument,
    /// Rejected by an opt-in guard in `LedgerPolicy`.
    PolicyViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller is not the required owner")]
    OwnerOnly,
    #[error("course {course_id} not found")]
    CourseNotFound { course_id: CourseId },
    #[error("lesson {lesson_id} not found in course {course_id}")]
    LessonNotFound {
        course_id: CourseId,
        lesson_id: LessonId,
    },
    #[error("caller is not enrolled in course {course_id}")]
    NotEnrolled { course_id: CourseId },
    #[error("progress {value} outside [0, 100]")]
    InvalidProgress { value: u64 },
    #[error("rating {value} outside [1, 5]")]
    InvalidRating { value: u64 },
    #[error("invalid {} ({len} bytes)", .field.as_str())]
    InvalidText { field: TextField, len: usize },
    #[error("caller already enrolled in course {course_id}")]
    AlreadyEnrolled { course_id: CourseId },
    #[error("progress may not decrease from {current} to {requested}")]
    ProgressRegression { current: u8, requested: u8 },
    #[error("lesson {lesson_id} must be completed before rating")]
    CompletionRequired { lesson_id: LessonId },
    #[error("recipient has not completed course {course_id}")]
    ProgressIncomplete { course_id: CourseId },
    #[error("recipient already holds a certificate for course {course_id}")]
    DuplicateCertificate { course_id: CourseId },
    #[error("{counter} counter exhausted")]
    CounterOverflow { counter: &'static str },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::OwnerOnly => ErrorKind::OwnerOnly,
            LedgerError::CourseNotFound { .. } | LedgerError::LessonNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::NotEnrolled { .. } => ErrorKind::NotEnrolled,
            LedgerError::InvalidProgress { .. }
            | LedgerError::InvalidRating { .. }
            | LedgerError::InvalidText { .. }
            | LedgerError::CounterOverflow { .. } => ErrorKind::InvalidArgument,
            LedgerError::AlreadyEnrolled { .. }
            | LedgerError::ProgressRegression { .. }
            | LedgerError::CompletionRequired { .. }
            | LedgerError::ProgressIncomplete { .. }
            | LedgerError::DuplicateCertificate { .. } => ErrorKind::PolicyViolation,
        }
    }

    /// Stable numeric code carried in receipts. Owner-only is 100.
    pub fn code(&self) -> u32 {
        match self {
            LedgerError::OwnerOnly => 100,
            LedgerError::CourseNotFound { .. } => 101,
            LedgerError::LessonNotFound { .. } => 102,
            LedgerError::NotEnrolled { .. } => 103,
            LedgerError::InvalidProgress { .. } => 104,
            LedgerError::InvalidRating { .. } => 105,
            LedgerError::InvalidText { .. } => 106,
            LedgerError::AlreadyEnrolled { .. } => 107,
            LedgerError::ProgressRegression { .. } => 108,
            LedgerError::CompletionRequired { .. } => 109,
            LedgerError::ProgressIncomplete { .. } => 110,
            LedgerError::DuplicateCertificate { .. } => 111,
            LedgerError::CounterOverflow { .. } => 112,
        }
    }
}
