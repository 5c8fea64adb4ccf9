use criterion::{Criterion, criterion_group, criterion_main};
use lite_coord::event::auto::AutoResetEvent;
use lite_coord::event::manual::ManualResetEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Benchmark: set before wait (fast path) comparison
/// 基准测试：等待前设置（快速路径）对比
fn bench_event_set_before_wait_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_set_before_wait_comparison");

    group.bench_function("custom_manual_reset_event", |b| {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&runtime).iter_custom(|iters| async move {
            let start = std::time::Instant::now();

            for _ in 0..iters {
                let event = ManualResetEvent::new(false);

                event.set();
                event.wait().await;
            }

            start.elapsed()
        });
    });

    group.bench_function("tokio_notify", |b| {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&runtime).iter_custom(|iters| async move {
            let start = std::time::Instant::now();

            for _ in 0..iters {
                let notify = Notify::new();

                notify.notify_one();
                notify.notified().await;
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmark: set after wait registration (slow path) comparison
/// 基准测试：等待注册后设置（慢速路径）对比
fn bench_event_set_after_wait_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_set_after_wait_comparison");

    group.bench_function("custom_manual_reset_event", |b| {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&runtime).iter_custom(|iters| async move {
            let mut total_duration = Duration::from_secs(0);

            for _ in 0..iters {
                let event = Arc::new(ManualResetEvent::new(false));
                let setter = event.clone();

                let start = std::time::Instant::now();

                tokio::spawn(async move {
                    setter.set();
                });

                event.wait().await;

                total_duration += start.elapsed();
            }

            total_duration
        });
    });

    group.bench_function("tokio_notify", |b| {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&runtime).iter_custom(|iters| async move {
            let mut total_duration = Duration::from_secs(0);

            for _ in 0..iters {
                let notify = Arc::new(Notify::new());
                let setter = notify.clone();

                let start = std::time::Instant::now();

                tokio::spawn(async move {
                    setter.notify_one();
                });

                notify.notified().await;

                total_duration += start.elapsed();
            }

            total_duration
        });
    });

    group.finish();
}

/// Benchmark: auto-reset ping-pong cycles
/// 基准测试：自动重置乒乓循环
fn bench_auto_reset_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_reset_cycles");

    group.bench_function("custom_auto_reset_event", |b| {
        let runtime = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&runtime).iter_custom(|iters| async move {
            let event = Arc::new(AutoResetEvent::new(false));

            let start = std::time::Instant::now();

            for _ in 0..iters {
                let gate = event.clone();
                tokio::spawn(async move {
                    gate.set();
                });

                event.wait().await;
            }

            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_event_set_before_wait_comparison,
    bench_event_set_after_wait_comparison,
    bench_auto_reset_cycles,
);

criterion_main!(benches);
