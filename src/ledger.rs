// Course ledger state machine.
// Every operation checks all of its preconditions before the first write, so a
// rejected call leaves the state (and the state root) exactly as it was.

use crate::auth::{Target, authorized};
use crate::config::{LedgerConfig, ReenrollmentPolicy};
use crate::error::{LedgerError, Result};
use crate::principal::Principal;
use crate::types::{
    CertificateId, Certificate, Course, CourseId, Enrollment, Lesson, LessonId, MAX_PROGRESS,
    MAX_RATING, MIN_RATING, Rating, StudentProgress, TextField, completion_bytes, counters_bytes,
    validate_text,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub type Hash = [u8; 32];

#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
    courses: BTreeMap<CourseId, Course>,
    lessons: BTreeMap<(CourseId, LessonId), Lesson>,
    enrollments: BTreeMap<(Principal, CourseId), Enrollment>,
    completions: BTreeSet<(Principal, CourseId, LessonId)>,
    ratings: BTreeMap<(Principal, LessonId), Rating>,
    certificates: BTreeMap<CertificateId, Certificate>,
    // Derived from `certificates`; not hashed into the root.
    certified: BTreeSet<(CourseId, Principal)>,
    next_course_id: CourseId,
    next_certificate_id: CertificateId,
}

fn logged<T>(op: &'static str, caller: &Principal, res: Result<T>) -> Result<T> {
    if let Err(e) = &res {
        debug!(op, caller = %caller, code = e.code(), error = %e, "rejected");
    }
    res
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Ledger {
            config,
            courses: BTreeMap::new(),
            lessons: BTreeMap::new(),
            enrollments: BTreeMap::new(),
            completions: BTreeSet::new(),
            ratings: BTreeMap::new(),
            certificates: BTreeMap::new(),
            certified: BTreeSet::new(),
            next_course_id: 0,
            next_certificate_id: 0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn course_or_err(&self, course_id: CourseId) -> Result<&Course> {
        self.courses
            .get(&course_id)
            .ok_or(LedgerError::CourseNotFound { course_id })
    }

    // ---------------- course & lesson management ----------------

    pub fn create_course(&mut self, name: &str, price: u64, caller: &Principal) -> Result<CourseId> {
        let res = self.try_create_course(name, price, caller);
        logged("create-course", caller, res)
    }

    fn try_create_course(&mut self, name: &str, price: u64, caller: &Principal) -> Result<CourseId> {
        if !authorized(self, caller, Target::Platform) {
            return Err(LedgerError::OwnerOnly);
        }
        validate_text(TextField::CourseName, name, self.config.policy.strict_text)?;
        let id = self.next_course_id;
        let next = id
            .checked_add(1)
            .ok_or(LedgerError::CounterOverflow { counter: "course" })?;

        self.courses.insert(
            id,
            Course {
                id,
                name: name.to_string(),
                price,
                owner: *caller,
                lesson_count: 0,
            },
        );
        self.next_course_id = next;
        debug!(course_id = id, price, "course created");
        Ok(id)
    }

    pub fn add_lesson(
        &mut self,
        course_id: CourseId,
        title: &str,
        duration: u64,
        caller: &Principal,
    ) -> Result<LessonId> {
        let res = self.try_add_lesson(course_id, title, duration, caller);
        logged("add-lesson", caller, res)
    }

    fn try_add_lesson(
        &mut self,
        course_id: CourseId,
        title: &str,
        duration: u64,
        caller: &Principal,
    ) -> Result<LessonId> {
        let course = self.course_or_err(course_id)?;
        if !authorized(self, caller, Target::Course(course)) {
            return Err(LedgerError::OwnerOnly);
        }
        validate_text(TextField::LessonTitle, title, self.config.policy.strict_text)?;
        let lesson_id = course.lesson_count;
        let next = lesson_id
            .checked_add(1)
            .ok_or(LedgerError::CounterOverflow { counter: "lesson" })?;

        self.lessons.insert(
            (course_id, lesson_id),
            Lesson {
                course_id,
                lesson_id,
                title: title.to_string(),
                duration,
            },
        );
        if let Some(course) = self.courses.get_mut(&course_id) {
            course.lesson_count = next;
        }
        debug!(course_id, lesson_id, duration, "lesson added");
        Ok(lesson_id)
    }

    pub fn get_course(&self, course_id: CourseId) -> Option<&Course> {
        self.courses.get(&course_id)
    }

    pub fn get_lesson(&self, course_id: CourseId, lesson_id: LessonId) -> Option<&Lesson> {
        self.lessons.get(&(course_id, lesson_id))
    }

    /// Number of courses created; also the next id to be assigned.
    pub fn course_count(&self) -> u64 {
        self.next_course_id
    }

    // ---------------- enrollment & progress ----------------

    pub fn enroll_in_course(&mut self, course_id: CourseId, caller: &Principal) -> Result<bool> {
        let res = self.try_enroll_in_course(course_id, caller);
        logged("enroll-in-course", caller, res)
    }

    fn try_enroll_in_course(&mut self, course_id: CourseId, caller: &Principal) -> Result<bool> {
        self.course_or_err(course_id)?;
        let key = (*caller, course_id);
        let policy = self.config.policy.reenrollment;

        match self.enrollments.get_mut(&key) {
            None => {
                self.enrollments.insert(
                    key,
                    Enrollment {
                        enrolled: true,
                        progress: 0,
                    },
                );
                debug!(course_id, student = %caller, "enrolled");
            }
            Some(existing) => match policy {
                ReenrollmentPolicy::Preserve => {
                    debug!(course_id, student = %caller, "already enrolled; kept");
                }
                ReenrollmentPolicy::Reset => {
                    existing.enrolled = true;
                    existing.progress = 0;
                    debug!(course_id, student = %caller, "re-enrolled; progress reset");
                }
                ReenrollmentPolicy::Reject => {
                    return Err(LedgerError::AlreadyEnrolled { course_id });
                }
            },
        }
        Ok(true)
    }

    pub fn update_progress(
        &mut self,
        course_id: CourseId,
        new_progress: u64,
        caller: &Principal,
    ) -> Result<bool> {
        let res = self.try_update_progress(course_id, new_progress, caller);
        logged("update-progress", caller, res)
    }

    fn try_update_progress(
        &mut self,
        course_id: CourseId,
        new_progress: u64,
        caller: &Principal,
    ) -> Result<bool> {
        let monotonic = self.config.policy.monotonic_progress;
        let enrollment = self
            .enrollments
            .get_mut(&(*caller, course_id))
            .ok_or(LedgerError::NotEnrolled { course_id })?;
        if new_progress > MAX_PROGRESS {
            return Err(LedgerError::InvalidProgress {
                value: new_progress,
            });
        }
        let requested = new_progress as u8;
        if monotonic && requested < enrollment.progress {
            return Err(LedgerError::ProgressRegression {
                current: enrollment.progress,
                requested,
            });
        }

        enrollment.progress = requested;
        debug!(course_id, student = %caller, progress = requested, "progress updated");
        Ok(true)
    }

    pub fn complete_lesson(
        &mut self,
        course_id: CourseId,
        lesson_id: LessonId,
        caller: &Principal,
    ) -> Result<bool> {
        let res = self.try_complete_lesson(course_id, lesson_id, caller);
        logged("complete-lesson", caller, res)
    }

    fn try_complete_lesson(
        &mut self,
        course_id: CourseId,
        lesson_id: LessonId,
        caller: &Principal,
    ) -> Result<bool> {
        if !self.enrollments.contains_key(&(*caller, course_id)) {
            return Err(LedgerError::NotEnrolled { course_id });
        }
        if !self.lessons.contains_key(&(course_id, lesson_id)) {
            return Err(LedgerError::LessonNotFound {
                course_id,
                lesson_id,
            });
        }

        // Repeat completions are a no-op; progress is tracked separately.
        if self.completions.insert((*caller, course_id, lesson_id)) {
            debug!(course_id, lesson_id, student = %caller, "lesson completed");
        }
        Ok(true)
    }

    pub fn get_student_progress(
        &self,
        student: &Principal,
        course_id: CourseId,
    ) -> Option<StudentProgress> {
        self.enrollments
            .get(&(*student, course_id))
            .map(StudentProgress::from)
    }

    pub fn is_lesson_completed(
        &self,
        student: &Principal,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> bool {
        self.completions.contains(&(*student, course_id, lesson_id))
    }

    /// Completion of `lesson_id` in any course (ratings are keyed by lesson id alone).
    fn has_completed_lesson_id(&self, student: &Principal, lesson_id: LessonId) -> bool {
        let lo = (*student, CourseId::MIN, LessonId::MIN);
        let hi = (*student, CourseId::MAX, LessonId::MAX);
        self.completions
            .range(lo..=hi)
            .any(|(_, _, l)| *l == lesson_id)
    }

    // ---------------- ratings ----------------

    pub fn rate_lesson(
        &mut self,
        lesson_id: LessonId,
        rating: u64,
        comment: &str,
        caller: &Principal,
    ) -> Result<bool> {
        let res = self.try_rate_lesson(lesson_id, rating, comment, caller);
        logged("rate-lesson", caller, res)
    }

    fn try_rate_lesson(
        &mut self,
        lesson_id: LessonId,
        rating: u64,
        comment: &str,
        caller: &Principal,
    ) -> Result<bool> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(LedgerError::InvalidRating { value: rating });
        }
        validate_text(TextField::Comment, comment, self.config.policy.strict_text)?;
        if self.config.policy.rating_requires_completion
            && !self.has_completed_lesson_id(caller, lesson_id)
        {
            return Err(LedgerError::CompletionRequired { lesson_id });
        }

        self.ratings.insert(
            (*caller, lesson_id),
            Rating {
                rating: rating as u8,
                comment: comment.to_string(),
            },
        );
        debug!(lesson_id, student = %caller, rating, "lesson rated");
        Ok(true)
    }

    pub fn get_lesson_rating(&self, student: &Principal, lesson_id: LessonId) -> Option<&Rating> {
        self.ratings.get(&(*student, lesson_id))
    }

    // ---------------- certificates ----------------

    pub fn issue_certificate(
        &mut self,
        course_id: CourseId,
        recipient: &Principal,
        caller: &Principal,
    ) -> Result<CertificateId> {
        let res = self.try_issue_certificate(course_id, recipient, caller);
        logged("issue-certificate", caller, res)
    }

    fn try_issue_certificate(
        &mut self,
        course_id: CourseId,
        recipient: &Principal,
        caller: &Principal,
    ) -> Result<CertificateId> {
        let course = self.course_or_err(course_id)?;
        if !authorized(self, caller, Target::Course(course)) {
            return Err(LedgerError::OwnerOnly);
        }
        let policy = &self.config.policy;
        if policy.certificate_requires_full_progress {
            let done = self
                .enrollments
                .get(&(*recipient, course_id))
                .is_some_and(|e| u64::from(e.progress) == MAX_PROGRESS);
            if !done {
                return Err(LedgerError::ProgressIncomplete { course_id });
            }
        }
        if policy.unique_certificates && self.certified.contains(&(course_id, *recipient)) {
            return Err(LedgerError::DuplicateCertificate { course_id });
        }
        let id = self.next_certificate_id;
        let next = id.checked_add(1).ok_or(LedgerError::CounterOverflow {
            counter: "certificate",
        })?;

        self.certificates.insert(
            id,
            Certificate {
                id,
                course_id,
                recipient: *recipient,
                issuer: *caller,
            },
        );
        self.certified.insert((course_id, *recipient));
        self.next_certificate_id = next;
        debug!(certificate_id = id, course_id, recipient = %recipient, "certificate issued");
        Ok(id)
    }

    pub fn get_certificate(&self, certificate_id: CertificateId) -> Option<&Certificate> {
        self.certificates.get(&certificate_id)
    }

    pub fn certificate_count(&self) -> u64 {
        self.next_certificate_id
    }

    // ---------------- read-back ----------------

    /// Deterministic Merkle root over every record in key order plus the counters.
    /// Collections are visited in a fixed order; each leaf is SHA-256 of a tagged encoding.
    pub fn state_root(&self) -> Hash {
        let mut leaves: Vec<Hash> = Vec::new();
        leaves.push(leaf(&counters_bytes(
            self.next_course_id,
            self.next_certificate_id,
        )));
        leaves.extend(self.courses.values().map(|c| leaf(&c.canonical_bytes())));
        leaves.extend(self.lessons.values().map(|l| leaf(&l.canonical_bytes())));
        leaves.extend(
            self.enrollments
                .iter()
                .map(|((s, c), e)| leaf(&e.canonical_bytes(s, *c))),
        );
        leaves.extend(
            self.completions
                .iter()
                .map(|(s, c, l)| leaf(&completion_bytes(s, *c, *l))),
        );
        leaves.extend(
            self.ratings
                .iter()
                .map(|((s, l), r)| leaf(&r.canonical_bytes(s, *l))),
        );
        leaves.extend(
            self.certificates
                .values()
                .map(|c| leaf(&c.canonical_bytes())),
        );
        merkle_root(leaves)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            next_course_id: self.next_course_id,
            next_certificate_id: self.next_certificate_id,
            courses: self.courses.values().cloned().collect(),
            lessons: self.lessons.values().cloned().collect(),
            enrollments: self
                .enrollments
                .iter()
                .map(|((student, course_id), e)| EnrollmentEntry {
                    student: *student,
                    course_id: *course_id,
                    enrolled: e.enrolled,
                    progress: e.progress,
                })
                .collect(),
            completions: self
                .completions
                .iter()
                .map(|(student, course_id, lesson_id)| CompletionEntry {
                    student: *student,
                    course_id: *course_id,
                    lesson_id: *lesson_id,
                })
                .collect(),
            ratings: self
                .ratings
                .iter()
                .map(|((student, lesson_id), r)| RatingEntry {
                    student: *student,
                    lesson_id: *lesson_id,
                    rating: r.rating,
                    comment: r.comment.clone(),
                })
                .collect(),
            certificates: self.certificates.values().cloned().collect(),
        }
    }
}

fn leaf(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Pairwise SHA-256 reduction; an odd node is paired with itself.
fn merkle_root(mut level: Vec<Hash>) -> Hash {
    if level.is_empty() {
        return [0u8; 32];
    }
    while level.len() > 1 {
        let mut next: Vec<Hash> = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            let a = level[i];
            let b = if i + 1 < level.len() {
                level[i + 1]
            } else {
                level[i]
            };
            let mut hasher = Sha256::new();
            hasher.update(a);
            hasher.update(b);
            next.push(hasher.finalize().into());
            i += 2;
        }
        level = next;
    }
    level[0]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentEntry {
    pub student: Principal,
    pub course_id: CourseId,
    pub enrolled: bool,
    pub progress: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub student: Principal,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub student: Principal,
    pub lesson_id: LessonId,
    pub rating: u8,
    pub comment: String,
}

/// Plain copy of committed state, in key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub next_course_id: CourseId,
    pub next_certificate_id: CertificateId,
    pub courses: Vec<Course>,
    pub lessons: Vec<Lesson>,
    pub enrollments: Vec<EnrollmentEntry>,
    pub completions: Vec<CompletionEntry>,
    pub ratings: Vec<RatingEntry>,
    pub certificates: Vec<Certificate>,
}
