// Ledger records. Records reference each other by key only; the ledger resolves relations.

use crate::error::LedgerError;
use crate::principal::Principal;
use serde::{Deserialize, Serialize};

pub type CourseId = u64;
pub type LessonId = u64;
pub type CertificateId = u64;

pub const MAX_COURSE_NAME_LEN: usize = 32;
pub const MAX_LESSON_TITLE_LEN: usize = 64;
pub const MAX_COMMENT_LEN: usize = 256;

pub const MAX_PROGRESS: u64 = 100;
pub const MIN_RATING: u64 = 1;
pub const MAX_RATING: u64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextField {
    CourseName,
    LessonTitle,
    Comment,
}

impl TextField {
    pub fn max_len(self) -> usize {
        match self {
            TextField::CourseName => MAX_COURSE_NAME_LEN,
            TextField::LessonTitle => MAX_LESSON_TITLE_LEN,
            TextField::Comment => MAX_COMMENT_LEN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextField::CourseName => "course name",
            TextField::LessonTitle => "lesson title",
            TextField::Comment => "comment",
        }
    }
}

/// Bounded ASCII text of at most `field.max_len()` bytes; empty strings and control
/// characters are allowed. With `strict` the text must also be non-empty and
/// printable (0x20..=0x7E).
pub fn validate_text(field: TextField, value: &str, strict: bool) -> Result<(), LedgerError> {
    let printable = || !value.is_empty() && value.bytes().all(|b| (0x20..=0x7e).contains(&b));
    let valid = value.is_ascii() && value.len() <= field.max_len() && (!strict || printable());
    if !valid {
        return Err(LedgerError::InvalidText {
            field,
            len: value.len(),
        });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub price: u64,
    pub owner: Principal,
    pub lesson_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub title: String,
    pub duration: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrolled: bool,
    pub progress: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rating: u8,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub course_id: CourseId,
    pub recipient: Principal,
    pub issuer: Principal,
}

/// Read view returned by `get-student-progress`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProgress {
    pub enrolled: bool,
    pub progress: u8,
}

impl From<&Enrollment> for StudentProgress {
    fn from(e: &Enrollment) -> Self {
        StudentProgress {
            enrolled: e.enrolled,
            progress: e.progress,
        }
    }
}

// ---- canonical encoding (state root material) ----
// Fixed field order, little-endian integers, u64 length prefix on variable data.

pub(crate) fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_str(out: &mut Vec<u8>, s: &str) {
    put_u64(out, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

impl Course {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 8 + 8 + self.name.len() + 8 + 32 + 8);
        out.push(b'C');
        put_u64(&mut out, self.id);
        put_str(&mut out, &self.name);
        put_u64(&mut out, self.price);
        out.extend_from_slice(self.owner.as_bytes());
        put_u64(&mut out, self.lesson_count);
        out
    }
}

impl Lesson {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 8 + 8 + 8 + self.title.len() + 8);
        out.push(b'L');
        put_u64(&mut out, self.course_id);
        put_u64(&mut out, self.lesson_id);
        put_str(&mut out, &self.title);
        put_u64(&mut out, self.duration);
        out
    }
}

impl Enrollment {
    pub fn canonical_bytes(&self, student: &Principal, course_id: CourseId) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 32 + 8 + 2);
        out.push(b'E');
        out.extend_from_slice(student.as_bytes());
        put_u64(&mut out, course_id);
        out.push(self.enrolled as u8);
        out.push(self.progress);
        out
    }
}

pub fn completion_bytes(student: &Principal, course_id: CourseId, lesson_id: LessonId) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + 32 + 8 + 8 + 1);
    out.push(b'P');
    out.extend_from_slice(student.as_bytes());
    put_u64(&mut out, course_id);
    put_u64(&mut out, lesson_id);
    out.push(1);
    out
}

impl Rating {
    pub fn canonical_bytes(&self, student: &Principal, lesson_id: LessonId) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 32 + 8 + 1 + 8 + self.comment.len());
        out.push(b'R');
        out.extend_from_slice(student.as_bytes());
        put_u64(&mut out, lesson_id);
        out.push(self.rating);
        put_str(&mut out, &self.comment);
        out
    }
}

impl Certificate {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 8 + 8 + 32 + 32);
        out.push(b'Z');
        put_u64(&mut out, self.id);
        put_u64(&mut out, self.course_id);
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(self.issuer.as_bytes());
        out
    }
}

pub fn counters_bytes(next_course_id: CourseId, next_certificate_id: CertificateId) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + 16);
    out.push(b'N');
    out.push(crate::STATE_ENCODING_VERSION);
    put_u64(&mut out, next_course_id);
    put_u64(&mut out, next_certificate_id);
    out
}
