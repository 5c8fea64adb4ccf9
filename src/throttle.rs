//! Single-slot task throttle: run the current job, keep only the newest request.
//!
//! While a job is executing, newly submitted jobs do not queue up behind each
//! other: each submission *replaces* the previously queued one, and only the last
//! submission of a busy burst runs once the in-flight job finishes. Callers whose
//! job was replaced before it started observe a caller-supplied skip value instead.
//!
//! Useful wherever a rapid-fire stream of refresh/recompute requests should
//! collapse into "latest state wins".
//!
//! 单槽位任务节流：执行当前任务，只保留最新的请求。
//!
//! 任务执行期间，新提交的任务不会互相排队：每次提交会*替换*之前排队的那个，
//! 忙碌突发中只有最后一次提交会在在途任务结束后运行。任务在启动前被替换的
//! 调用者会得到调用者自己提供的跳过值。
//!
//! 适用于需要把连珠炮式的刷新/重算请求折叠为"最新状态获胜"的场景。

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::shim::sync::Mutex;
use crate::signal::Signal;

/// Single-slot throttle for asynchronous jobs
///
/// A cheap cloneable handle; clones share the same slot. Submissions may arrive
/// from any thread or task, so every state transition goes through one internal
/// lock.
///
/// 异步任务的单槽位节流器
///
/// 低成本可克隆句柄；克隆共享同一槽位。提交可能来自任意线程或任务，
/// 因此所有状态转换都经过同一把内部锁。
///
/// # Examples
///
/// ```
/// use lite_coord::throttle::EventThrottler;
///
/// # tokio_test::block_on(async {
/// let throttler = EventThrottler::<i32>::new();
///
/// let first = throttler.run_async(async { 1 }, -1);
/// let second = throttler.run_async(async { 2 }, -2);
/// let third = throttler.run_async(async { 3 }, -3);
///
/// // The first job runs; the second is replaced by the third before it starts.
/// assert_eq!(tokio::join!(first, second, third), (1, -2, 3));
/// # });
/// ```
pub struct EventThrottler<T = ()> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    state: Mutex<ThrottleState<T>>,
}

struct ThrottleState<T> {
    // Invariant: at most one job in flight (is_running) and at most one queued
    // (next); a new submission overwrites next rather than queueing behind it.
    is_running: bool,
    next: Option<Job<T>>,
}

struct Job<T> {
    work: BoxFuture<'static, T>,
    slot: Arc<ResultSlot<T>>,
}

/// Where a job reports back to its submitter: a value slot plus a completion
/// signal. A slot completed while still empty means the job was skipped.
struct ResultSlot<T> {
    value: Mutex<Option<T>>,
    done: Arc<Signal>,
}

impl<T> ResultSlot<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(None),
            done: Arc::new(Signal::new()),
        })
    }
}

impl<T: Send + 'static> EventThrottler<T> {
    /// Create an idle throttler
    ///
    /// 创建一个空闲的节流器
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ThrottleState {
                    is_running: false,
                    next: None,
                }),
            }),
        }
    }

    /// Submit a job and observe its outcome
    ///
    /// If nothing is running the job starts immediately. Otherwise it takes the
    /// single queue slot, evicting any job already waiting there; the evicted
    /// job never runs and its caller receives the `skipped` value that caller
    /// supplied. A job that does run delivers its real output.
    ///
    /// 提交一个任务并观察其结果
    ///
    /// 若当前无任务在运行，该任务立即启动。否则它占用唯一的排队槽位，并逐出
    /// 已在那里等待的任务；被逐出的任务永远不会运行，其调用者会收到自己
    /// 提供的 `skipped` 值。真正运行的任务交付其真实输出。
    pub async fn run_async<F>(&self, action: F, skipped: T) -> T
    where
        F: Future<Output = T> + Send + 'static,
    {
        let slot = ResultSlot::new();

        self.submit(Job {
            work: Box::pin(action),
            slot: slot.clone(),
        });

        slot.done.clone().wait().await;

        let value = slot.value.lock().take();
        value.unwrap_or(skipped)
    }

    /// Submit a fire-and-forget job with the same replace semantics
    ///
    /// 以相同的替换语义提交一个即发即忘任务
    pub fn run<F>(&self, action: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.submit(Job {
            work: Box::pin(action),
            slot: ResultSlot::new(),
        });
    }

    fn submit(&self, job: Job<T>) {
        let (replaced, run_now) = {
            let mut state = self.shared.state.lock();

            if state.is_running {
                (state.next.replace(job), None)
            } else {
                state.is_running = true;
                (None, Some(job))
            }
        };

        // Both the skip notification and the job start happen outside the lock.
        if let Some(evicted) = replaced {
            #[cfg(feature = "tracing")]
            tracing::trace!("queued job replaced before it started");

            evicted.slot.done.set();
        }

        if let Some(job) = run_now {
            #[cfg(feature = "tracing")]
            tracing::trace!("starting throttled job");

            let shared = self.shared.clone();
            tokio::spawn(async move {
                shared.run_and_drain(job).await;
            });
        }
    }
}

impl<T: Send + 'static> Default for EventThrottler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventThrottler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for EventThrottler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("EventThrottler")
            .field("is_running", &state.is_running)
            .field("queued", &state.next.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Shared<T> {
    /// Run `job`, then keep draining the queue slot until it stays empty.
    ///
    /// Runs detached from every submitter, so dropping a submitter's future
    /// never stalls jobs queued by others.
    async fn run_and_drain(self: Arc<Self>, mut job: Job<T>) {
        loop {
            let value = job.work.await;

            *job.slot.value.lock() = Some(value);
            job.slot.done.set();

            job = {
                let mut state = self.state.lock();

                match state.next.take() {
                    Some(next) => next,
                    None => {
                        state.is_running = false;

                        #[cfg(feature = "tracing")]
                        tracing::trace!("throttler idle");

                        return;
                    }
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::manual::ManualResetEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Duration, sleep};

    #[tokio::test]
    async fn test_burst_keeps_only_last() {
        let throttler = EventThrottler::<i32>::new();

        let first = throttler.run_async(async { 1 }, -1);
        let second = throttler.run_async(async { 2 }, -2);
        let third = throttler.run_async(async { 3 }, -3);

        assert_eq!(tokio::join!(first, second, third), (1, -2, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_with_slow_jobs() {
        let throttler = EventThrottler::<i32>::new();

        let first = throttler.run_async(
            async {
                sleep(Duration::from_millis(50)).await;
                1
            },
            -1,
        );
        let second = throttler.run_async(
            async {
                sleep(Duration::from_millis(50)).await;
                2
            },
            -2,
        );
        let third = throttler.run_async(
            async {
                sleep(Duration::from_millis(50)).await;
                3
            },
            -3,
        );

        assert_eq!(tokio::join!(first, second, third), (1, -2, 3));
    }

    #[tokio::test]
    async fn test_sequential_jobs_all_run() {
        let throttler = EventThrottler::<u32>::new();

        // No overlap, so nothing is ever skipped
        assert_eq!(throttler.run_async(async { 10 }, 0).await, 10);
        assert_eq!(throttler.run_async(async { 20 }, 0).await, 20);
        assert_eq!(throttler.run_async(async { 30 }, 0).await, 30);
    }

    #[tokio::test]
    async fn test_replaced_job_never_runs() {
        let ran = Arc::new(AtomicUsize::new(0));

        let throttler = EventThrottler::<()>::new();

        let slow = throttler.run_async(
            async {
                sleep(Duration::from_millis(20)).await;
            },
            (),
        );

        let counted = {
            let ran = ran.clone();
            throttler.run_async(
                async move {
                    ran.fetch_add(1, Ordering::AcqRel);
                },
                (),
            )
        };

        let replacement = throttler.run_async(async {}, ());

        tokio::join!(slow, counted, replacement);

        // The middle job was evicted before it started
        assert_eq!(ran.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn test_fire_and_forget_run() {
        let throttler = EventThrottler::new();
        let done = Arc::new(ManualResetEvent::new(false));

        let flag = done.clone();
        throttler.run(async move {
            flag.set();
        });

        tokio::time::timeout(Duration::from_secs(1), done.wait())
            .await
            .expect("fire-and-forget job should run");
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let throttler = EventThrottler::<i32>::new();
        let alias = throttler.clone();

        let first = throttler.run_async(async { 1 }, -1);
        let second = alias.run_async(async { 2 }, -2);
        let third = throttler.run_async(async { 3 }, -3);

        assert_eq!(tokio::join!(first, second, third), (1, -2, 3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_settle() {
        let throttler = EventThrottler::<usize>::new();

        let mut handles = Vec::new();
        for i in 0..50 {
            let t = throttler.clone();
            handles.push(tokio::spawn(async move {
                t.run_async(async move { i }, usize::MAX).await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();

            // Every caller observes either its real result or its skip value
            assert!(result < 50 || result == usize::MAX);
        }
    }
}
