// Transaction log vocabulary: one call, its authenticated caller, and its receipt.

use crate::error::{ErrorKind, LedgerError};
use crate::ledger::{Hash, Ledger};
use crate::principal::Principal;
use crate::types::{CourseId, LessonId, put_str, put_u64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Mutating calls, tagged with their wire operation names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Call {
    CreateCourse {
        name: String,
        price: u64,
    },
    AddLesson {
        course_id: CourseId,
        title: String,
        duration: u64,
    },
    EnrollInCourse {
        course_id: CourseId,
    },
    UpdateProgress {
        course_id: CourseId,
        progress: u64,
    },
    CompleteLesson {
        course_id: CourseId,
        lesson_id: LessonId,
    },
    RateLesson {
        lesson_id: LessonId,
        rating: u64,
        comment: String,
    },
    IssueCertificate {
        course_id: CourseId,
        recipient: Principal,
    },
}

impl Call {
    pub fn op_name(&self) -> &'static str {
        match self {
            Call::CreateCourse { .. } => "create-course",
            Call::AddLesson { .. } => "add-lesson",
            Call::EnrollInCourse { .. } => "enroll-in-course",
            Call::UpdateProgress { .. } => "update-progress",
            Call::CompleteLesson { .. } => "complete-lesson",
            Call::RateLesson { .. } => "rate-lesson",
            Call::IssueCertificate { .. } => "issue-certificate",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub caller: Principal,
    #[serde(flatten)]
    pub call: Call,
}

impl Transaction {
    pub fn new(caller: Principal, call: Call) -> Self {
        Transaction { caller, call }
    }

    /// Fixed-layout encoding: caller, op tag byte, then the call's fields in declaration order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + 1 + 64);
        out.extend_from_slice(self.caller.as_bytes());
        match &self.call {
            Call::CreateCourse { name, price } => {
                out.push(1);
                put_str(&mut out, name);
                put_u64(&mut out, *price);
            }
            Call::AddLesson {
                course_id,
                title,
                duration,
            } => {
                out.push(2);
                put_u64(&mut out, *course_id);
                put_str(&mut out, title);
                put_u64(&mut out, *duration);
            }
            Call::EnrollInCourse { course_id } => {
                out.push(3);
                put_u64(&mut out, *course_id);
            }
            Call::UpdateProgress {
                course_id,
                progress,
            } => {
                out.push(4);
                put_u64(&mut out, *course_id);
                put_u64(&mut out, *progress);
            }
            Call::CompleteLesson {
                course_id,
                lesson_id,
            } => {
                out.push(5);
                put_u64(&mut out, *course_id);
                put_u64(&mut out, *lesson_id);
            }
            Call::RateLesson {
                lesson_id,
                rating,
                comment,
            } => {
                out.push(6);
                put_u64(&mut out, *lesson_id);
                put_u64(&mut out, *rating);
                put_str(&mut out, comment);
            }
            Call::IssueCertificate {
                course_id,
                recipient,
            } => {
                out.push(7);
                put_u64(&mut out, *course_id);
                out.extend_from_slice(recipient.as_bytes());
            }
        }
        out
    }

    pub fn hash(&self) -> Hash {
        let mut h = Sha256::new();
        h.update(self.canonical_bytes());
        h.finalize().into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Uint(u64),
    Bool(bool),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Receipt {
    Ok {
        value: Value,
    },
    Err {
        kind: ErrorKind,
        code: u32,
        message: String,
    },
}

impl Receipt {
    pub fn is_ok(&self) -> bool {
        matches!(self, Receipt::Ok { .. })
    }

    pub fn value(&self) -> Option<Value> {
        match self {
            Receipt::Ok { value } => Some(*value),
            Receipt::Err { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<u32> {
        match self {
            Receipt::Ok { .. } => None,
            Receipt::Err { code, .. } => Some(*code),
        }
    }
}

impl From<Result<Value, LedgerError>> for Receipt {
    fn from(res: Result<Value, LedgerError>) -> Self {
        match res {
            Ok(value) => Receipt::Ok { value },
            Err(e) => Receipt::Err {
                kind: e.kind(),
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

impl Ledger {
    /// Dispatch one sequenced call. Never panics; errors come back in the receipt.
    pub fn apply(&mut self, tx: &Transaction) -> Receipt {
        let caller = &tx.caller;
        let res = match &tx.call {
            Call::CreateCourse { name, price } => self
                .create_course(name, *price, caller)
                .map(Value::Uint),
            Call::AddLesson {
                course_id,
                title,
                duration,
            } => self
                .add_lesson(*course_id, title, *duration, caller)
                .map(Value::Uint),
            Call::EnrollInCourse { course_id } => {
                self.enroll_in_course(*course_id, caller).map(Value::Bool)
            }
            Call::UpdateProgress {
                course_id,
                progress,
            } => self
                .update_progress(*course_id, *progress, caller)
                .map(Value::Bool),
            Call::CompleteLesson {
                course_id,
                lesson_id,
            } => self
                .complete_lesson(*course_id, *lesson_id, caller)
                .map(Value::Bool),
            Call::RateLesson {
                lesson_id,
                rating,
                comment,
            } => self
                .rate_lesson(*lesson_id, *rating, comment, caller)
                .map(Value::Bool),
            Call::IssueCertificate {
                course_id,
                recipient,
            } => self
                .issue_certificate(*course_id, recipient, caller)
                .map(Value::Uint),
        };
        Receipt::from(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    #[test]
    fn wire_format_uses_operation_names() {
        let tx = Transaction::new(
            Principal::from_bytes([0xaa; 32]),
            Call::EnrollInCourse { course_id: 0 },
        );
        let json = serde_json::to_string(&tx).expect("serialize");
        assert!(json.contains("\"op\":\"enroll-in-course\""));
        let back: Transaction = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tx);
        assert_eq!(tx.call.op_name(), "enroll-in-course");
    }

    #[test]
    fn parses_handwritten_rate_call() {
        let json = format!(
            "{{\"caller\":\"{}\",\"op\":\"rate-lesson\",\"lesson_id\":0,\"rating\":5,\"comment\":\"Great lesson!\"}}",
            "01".repeat(32)
        );
        let tx: Transaction = serde_json::from_str(&json).expect("parse");
        assert_eq!(
            tx.call,
            Call::RateLesson {
                lesson_id: 0,
                rating: 5,
                comment: "Great lesson!".into()
            }
        );
    }

    #[test]
    fn hash_distinguishes_caller_and_args() {
        let a = Principal::derive("a");
        let b = Principal::derive("b");
        let t1 = Transaction::new(a, Call::EnrollInCourse { course_id: 0 });
        let t2 = Transaction::new(b, Call::EnrollInCourse { course_id: 0 });
        let t3 = Transaction::new(a, Call::EnrollInCourse { course_id: 1 });
        let t4 = Transaction::new(
            a,
            Call::UpdateProgress {
                course_id: 0,
                progress: 0,
            },
        );
        assert_eq!(t1.hash(), t1.clone().hash());
        assert_ne!(t1.hash(), t2.hash());
        assert_ne!(t1.hash(), t3.hash());
        assert_ne!(t1.hash(), t4.hash());
    }

    #[test]
    fn apply_maps_results_to_receipts() {
        let deployer = Principal::derive("deployer");
        let user = Principal::derive("wallet_1");
        let mut ledger = Ledger::new(LedgerConfig::new(deployer));

        let ok = ledger.apply(&Transaction::new(
            deployer,
            Call::CreateCourse {
                name: "Python Basics".into(),
                price: 100,
            },
        ));
        assert_eq!(ok.value(), Some(Value::Uint(0)));

        let err = ledger.apply(&Transaction::new(
            user,
            Call::CreateCourse {
                name: "JavaScript".into(),
                price: 100,
            },
        ));
        assert!(!err.is_ok());
        assert_eq!(err.error_code(), Some(100));
        match err {
            Receipt::Err { kind, .. } => assert_eq!(kind, ErrorKind::OwnerOnly),
            Receipt::Ok { .. } => panic!("expected error receipt"),
        }

        let enrolled = ledger.apply(&Transaction::new(user, Call::EnrollInCourse { course_id: 0 }));
        assert_eq!(enrolled.value(), Some(Value::Bool(true)));
    }

    #[test]
    fn receipt_json_shape() {
        let r = Receipt::Ok {
            value: Value::Uint(3),
        };
        let json = serde_json::to_string(&r).expect("serialize");
        assert_eq!(json, "{\"status\":\"ok\",\"value\":{\"type\":\"uint\",\"value\":3}}");
    }
}
