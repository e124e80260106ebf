//! Unit tests for the PoW engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PowConfig;
use crate::domain::services::{solution_hash, verify_difficulty};
use crate::engine::PowEngine;

/// Brute-force a solution the way a client would: successive nonces,
/// hex-encoded, until the combined hash meets the difficulty.
fn find_solution(challenge: &str, difficulty_bits: u8) -> String {
    for nonce in 0u64.. {
        let solution = format!("{nonce:016x}");
        let hash = solution_hash(challenge, &solution);
        if verify_difficulty(&hash, difficulty_bits) {
            return solution;
        }
    }
    unreachable!("search space exhausted");
}

fn engine_with(difficulty_bits: u8, solution_ttl: Duration) -> PowEngine {
    PowEngine::new(PowConfig {
        difficulty_bits,
        solution_ttl,
        cleanup_interval: Duration::from_secs(60),
    })
}

mod generation {
    use super::*;

    #[test]
    fn challenge_has_requested_length_and_is_hex() {
        let engine = PowEngine::new(PowConfig::default());
        for length in [8, 16, 32] {
            let challenge = engine.generate_challenge(length).unwrap();
            assert_eq!(challenge.len(), length * 2);
            assert!(platform::crypto::from_hex(&challenge).is_ok());
        }
    }

    #[test]
    fn challenges_are_unique() {
        let engine = PowEngine::new(PowConfig::default());
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let challenge = engine.generate_challenge(16).unwrap();
            assert!(seen.insert(challenge), "generated duplicate challenge");
        }
    }
}

mod verification {
    use super::*;

    #[test]
    fn rejects_empty_inputs() {
        let engine = engine_with(0, Duration::from_secs(300));
        assert!(!engine.verify_solution("", ""));
        assert!(!engine.verify_solution("1234", ""));
        assert!(!engine.verify_solution("", "5678"));
        // Step-1 rejections count as attempts but not as failures
        assert_eq!(engine.stats().total_attempts, 3);
        assert_eq!(engine.failed_attempts(), 0);
    }

    #[test]
    fn rejects_non_hex_solution() {
        let engine = engine_with(0, Duration::from_secs(300));
        assert!(!engine.verify_solution("1234", "xyz"));
        assert_eq!(engine.failed_attempts(), 1);
    }

    #[test]
    fn rejects_oversized_solution() {
        let engine = engine_with(0, Duration::from_secs(300));
        let oversized = "0".repeat(65);
        assert!(!engine.verify_solution("1234", &oversized));
        // Exactly at the bound is fine
        let at_bound = "0".repeat(64);
        assert!(engine.verify_solution("1234", &at_bound));
    }

    #[test]
    fn rejects_insufficient_difficulty() {
        // 256 leading zero bits cannot be met by any SHA-256 preimage we
        // can find; every structurally valid solution must fail the check.
        let engine = engine_with(255, Duration::from_secs(300));
        assert!(!engine.verify_solution("aabbccdd", "00112233"));
        assert_eq!(engine.stats().valid_solutions, 0);
        assert_eq!(engine.failed_attempts(), 1);
    }

    #[test]
    fn accepts_brute_forced_solution_at_difficulty_4() {
        let engine = engine_with(4, Duration::from_secs(300));
        let challenge = "aabbccdd";
        let solution = find_solution(challenge, 4);

        assert!(engine.verify_solution(challenge, &solution));
        // Identical resubmission is a replay
        assert!(!engine.verify_solution(challenge, &solution));

        let stats = engine.stats();
        assert_eq!(stats.valid_solutions, 1);
        assert_eq!(stats.replay_attempts, 1);
        assert_eq!(stats.total_attempts, 2);
    }

    #[test]
    fn counters_track_mixed_outcomes() {
        let engine = engine_with(0, Duration::from_secs(300));
        assert!(engine.verify_solution("aa", "bb"));
        assert!(!engine.verify_solution("aa", "bb")); // replay
        assert!(!engine.verify_solution("aa", "zz")); // not hex
        assert!(engine.verify_solution("aa", "cc"));

        let stats = engine.stats();
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.valid_solutions, 2);
        assert_eq!(stats.replay_attempts, 1);
        assert_eq!(engine.failed_attempts(), 2);
    }
}

mod replay {
    use super::*;

    #[test]
    fn pair_accepted_at_most_once_within_ttl() {
        let engine = engine_with(0, Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(engine.verify_at("1234", "5678", t0));
        assert!(!engine.verify_at("1234", "5678", t0 + Duration::from_secs(5)));
        assert_eq!(engine.stats().replay_attempts, 1);
    }

    #[test]
    fn expired_record_no_longer_blocks() {
        let engine = engine_with(0, Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(engine.verify_at("1234", "5678", t0));
        assert!(engine.verify_at("1234", "5678", t0 + Duration::from_secs(11)));
        // The late acceptance is not a replay
        assert_eq!(engine.stats().replay_attempts, 0);
        assert_eq!(engine.stats().valid_solutions, 2);
    }

    #[test]
    fn simultaneous_submissions_of_one_pair_accept_exactly_once() {
        let engine = Arc::new(engine_with(0, Duration::from_secs(300)));
        let rounds: u64 = 500;

        for round in 0..rounds {
            let challenge = format!("{round:08x}");
            let barrier = Arc::new(std::sync::Barrier::new(2));
            let workers: Vec<_> = (0..2)
                .map(|_| {
                    let engine = Arc::clone(&engine);
                    let barrier = Arc::clone(&barrier);
                    let challenge = challenge.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        engine.verify_solution(&challenge, "aa")
                    })
                })
                .collect();
            let accepted = workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .filter(|&ok| ok)
                .count();
            assert_eq!(accepted, 1, "pair accepted {accepted} times in round {round}");
        }

        let stats = engine.stats();
        assert_eq!(stats.valid_solutions, rounds);
        assert_eq!(stats.replay_attempts, rounds);
    }

    #[test]
    fn distinct_solutions_are_independent() {
        let engine = engine_with(0, Duration::from_secs(300));
        assert!(engine.verify_solution("1234", "aa"));
        assert!(engine.verify_solution("1234", "bb"));
        assert!(engine.verify_solution("4321", "aa"));
        assert_eq!(engine.stats().replay_attempts, 0);
    }
}

mod eviction {
    use super::*;

    #[test]
    fn evict_expired_drops_old_records_only() {
        let engine = engine_with(0, Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(engine.verify_at("aa", "11", t0));
        assert!(engine.verify_at("bb", "22", t0 + Duration::from_secs(8)));
        assert_eq!(engine.record_count(), 2);

        let removed = engine.evict_expired(t0 + Duration::from_secs(11));
        assert_eq!(removed, 1);
        assert_eq!(engine.record_count(), 1);
    }

    #[tokio::test]
    async fn eviction_task_sweeps_and_stops_on_shutdown() {
        let engine = Arc::new(PowEngine::new(PowConfig {
            difficulty_bits: 0,
            solution_ttl: Duration::from_millis(20),
            cleanup_interval: Duration::from_millis(10),
        }));
        assert!(engine.verify_solution("aa", "11"));
        assert_eq!(engine.record_count(), 1);

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let handle = engine.spawn_eviction(shutdown_rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.record_count(), 0, "sweeper should have evicted");

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
