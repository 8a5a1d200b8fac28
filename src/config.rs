use crate::principal::Principal;
use serde::{Deserialize, Serialize};

/// What `enroll-in-course` does when the caller is already enrolled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReenrollmentPolicy {
    /// Succeed without touching the existing record.
    #[default]
    Preserve,
    /// Succeed and set progress back to 0.
    Reset,
    /// Fail with `AlreadyEnrolled`.
    Reject,
}

/// Opt-in guards. The defaults reproduce the unguarded behavior.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerPolicy {
    #[serde(default)]
    pub reenrollment: ReenrollmentPolicy,
    #[serde(default)]
    pub monotonic_progress: bool,
    #[serde(default)]
    pub rating_requires_completion: bool,
    #[serde(default)]
    pub certificate_requires_full_progress: bool,
    #[serde(default)]
    pub unique_certificates: bool,
    /// Text must be non-empty and printable ASCII, on top of the length bound.
    #[serde(default)]
    pub strict_text: bool,
}

impl LedgerPolicy {
    pub fn strict() -> Self {
        Self {
            reenrollment: ReenrollmentPolicy::Reject,
            monotonic_progress: true,
            rating_requires_completion: true,
            certificate_requires_full_progress: true,
            unique_certificates: true,
            strict_text: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Only identity allowed to create courses. Fixed for the life of the ledger.
    pub deployer: Principal,
    #[serde(default)]
    pub policy: LedgerPolicy,
}

impl LedgerConfig {
    pub fn new(deployer: Principal) -> Self {
        Self {
            deployer,
            policy: LedgerPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| format!("invalid ledger config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_are_unguarded() {
        let p = LedgerPolicy::default();
        assert_eq!(p.reenrollment, ReenrollmentPolicy::Preserve);
        assert!(!p.monotonic_progress);
        assert!(!p.rating_requires_completion);
        assert!(!p.certificate_requires_full_progress);
        assert!(!p.unique_certificates);
        assert!(!p.strict_text);
    }

    #[test]
    fn parses_minimal_json() {
        let deployer = Principal::derive("deployer");
        let json = format!("{{\"deployer\":\"{}\"}}", deployer);
        let cfg = LedgerConfig::from_json(&json).expect("config");
        assert_eq!(cfg.deployer, deployer);
        assert_eq!(cfg.policy, LedgerPolicy::default());
    }

    #[test]
    fn parses_partial_policy() {
        let deployer = Principal::derive("deployer");
        let json = format!(
            "{{\"deployer\":\"{}\",\"policy\":{{\"reenrollment\":\"reject\",\"unique_certificates\":true}}}}",
            deployer
        );
        let cfg = LedgerConfig::from_json(&json).expect("config");
        assert_eq!(cfg.policy.reenrollment, ReenrollmentPolicy::Reject);
        assert!(cfg.policy.unique_certificates);
        assert!(!cfg.policy.monotonic_progress);
    }

    #[test]
    fn rejects_bad_deployer() {
        let err = LedgerConfig::from_json("{\"deployer\":\"nope\"}").unwrap_err();
        assert!(err.starts_with("invalid ledger config"));
    }
}
