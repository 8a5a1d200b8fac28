use codepulse_core::tx::{Call, Transaction};
use codepulse_core::{LedgerConfig, Principal, SharedLedger};
use std::thread;

#[test]
fn concurrent_enrollments_serialize() {
    let deployer = Principal::derive("deployer");
    let shared = SharedLedger::new(LedgerConfig::new(deployer));
    assert!(
        shared
            .apply(&Transaction::new(
                deployer,
                Call::CreateCourse {
                    name: "Rust".into(),
                    price: 10,
                },
            ))
            .is_ok()
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                let student = Principal::derive(&format!("student-{}", i));
                let receipts = shared.apply_batch(&[
                    Transaction::new(student, Call::EnrollInCourse { course_id: 0 }),
                    Transaction::new(
                        student,
                        Call::UpdateProgress {
                            course_id: 0,
                            progress: 10 * i as u64,
                        },
                    ),
                ]);
                receipts.iter().all(|r| r.is_ok())
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().expect("worker thread"));
    }

    let snap = shared.snapshot();
    assert_eq!(snap.enrollments.len(), 8);
    for i in 0..8u64 {
        let student = Principal::derive(&format!("student-{}", i));
        let progress = shared.read(|l| l.get_student_progress(&student, 0));
        assert_eq!(progress.map(|p| u64::from(p.progress)), Some(10 * i));
    }
}

#[test]
fn final_root_is_order_independent_for_disjoint_students() {
    let deployer = Principal::derive("deployer");
    let create = Transaction::new(
        deployer,
        Call::CreateCourse {
            name: "Rust".into(),
            price: 10,
        },
    );
    let enrolls: Vec<Transaction> = (0..4)
        .map(|i| {
            Transaction::new(
                Principal::derive(&format!("student-{}", i)),
                Call::EnrollInCourse { course_id: 0 },
            )
        })
        .collect();

    let forward = SharedLedger::new(LedgerConfig::new(deployer));
    forward.apply(&create);
    forward.apply_batch(&enrolls);

    let backward = SharedLedger::new(LedgerConfig::new(deployer));
    backward.apply(&create);
    let reversed: Vec<Transaction> = enrolls.iter().rev().cloned().collect();
    backward.apply_batch(&reversed);

    // Keyed, ordered collections: same set of records => same root.
    assert_eq!(forward.state_root(), backward.state_root());
}
