#![cfg(feature = "loom")]

use lite_coord::semaphore::Semaphore;
use loom::future::block_on;
use loom::thread;
use std::sync::Arc;

#[test]
fn loom_semaphore_handoff() {
    loom::model(|| {
        let semaphore = Arc::new(Semaphore::new(0));
        let releaser = semaphore.clone();

        thread::spawn(move || {
            releaser.release();
        });

        block_on(async move {
            semaphore.acquire().await;
        });
    });
}

#[test]
fn loom_semaphore_single_permit_exclusion() {
    loom::model(|| {
        let semaphore = Arc::new(Semaphore::new(1));
        let other = semaphore.clone();

        let holder = thread::spawn(move || {
            block_on(async move {
                other.acquire().await;
                other.release();
            });
        });

        block_on(async move {
            semaphore.acquire().await;
            semaphore.release();
        });

        holder.join().unwrap();
    });
}

#[test]
fn loom_semaphore_release_restores_permit() {
    loom::model(|| {
        let semaphore = Arc::new(Semaphore::new(1));
        let releaser = semaphore.clone();

        thread::spawn(move || {
            releaser.release();
        });

        block_on(async move {
            // One of the two permits (initial or released) admits us
            semaphore.acquire().await;
        });
    });
}
