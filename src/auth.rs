// Authorization predicate. Evaluated before any precondition that reads or writes state.

use crate::ledger::Ledger;
use crate::principal::Principal;
use crate::types::Course;

/// What the caller is trying to act on.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// Platform-wide actions (course creation): deployer only.
    Platform,
    /// Course-scoped privileged actions (lessons, certificates): course owner only.
    Course(&'a Course),
}

pub fn authorized(ledger: &Ledger, caller: &Principal, target: Target<'_>) -> bool {
    match target {
        Target::Platform => *caller == ledger.config().deployer,
        Target::Course(course) => *caller == course.owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    #[test]
    fn platform_is_deployer_only() {
        let deployer = Principal::derive("deployer");
        let ledger = Ledger::new(LedgerConfig::new(deployer));
        assert!(authorized(&ledger, &deployer, Target::Platform));
        assert!(!authorized(
            &ledger,
            &Principal::derive("wallet_1"),
            Target::Platform
        ));
    }

    #[test]
    fn course_is_owner_only() {
        let deployer = Principal::derive("deployer");
        let ledger = Ledger::new(LedgerConfig::new(deployer));
        let owner = Principal::derive("owner");
        let course = Course {
            id: 0,
            name: "Rust".into(),
            price: 1,
            owner,
            lesson_count: 0,
        };
        assert!(authorized(&ledger, &owner, Target::Course(&course)));
        // Deployer has no implicit rights over a course it does not own.
        assert!(!authorized(&ledger, &deployer, Target::Course(&course)));
    }
}
