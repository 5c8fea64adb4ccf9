#![cfg(feature = "loom")]

use lite_coord::barrier::Barrier;
use loom::future::block_on;
use loom::thread;
use std::sync::Arc;

#[test]
fn loom_barrier_two_party_rendezvous() {
    loom::model(|| {
        let barrier = Arc::new(Barrier::new(2).unwrap());
        let partner = barrier.clone();

        let other = thread::spawn(move || {
            block_on(async move {
                partner.wait().await;
            });
        });

        block_on(async move {
            barrier.wait().await;
        });

        other.join().unwrap();
    });
}

#[test]
fn loom_barrier_second_phase_starts_clean() {
    loom::model(|| {
        let barrier = Arc::new(Barrier::new(2).unwrap());
        let partner = barrier.clone();

        let other = thread::spawn(move || {
            block_on(async move {
                partner.wait().await;
                partner.wait().await;
            });
        });

        block_on(async move {
            barrier.wait().await;
            barrier.wait().await;
        });

        other.join().unwrap();
    });
}
