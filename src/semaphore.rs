//! Async counting semaphore with strict FIFO admission.
//!
//! Permits are handed to waiters in the exact order their [`acquire`](Semaphore::acquire)
//! calls were made: a release transfers the permit directly to the oldest queued
//! waiter instead of bumping the shared count, so a later arrival can never steal a
//! permit from an earlier one.
//!
//! 具有严格 FIFO 准入的异步计数信号量。
//!
//! 许可按 [`acquire`](Semaphore::acquire) 调用的确切顺序交给等待者：释放时许可
//! 直接转移给队列中最早的等待者而不是增加共享计数，因此后来者永远无法抢走
//! 先到者的许可。

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::shim::sync::Mutex;
use crate::signal::{Signal, Waiting};

/// Async semaphore with a FIFO wait queue
///
/// 带 FIFO 等待队列的异步信号量
///
/// # Examples
///
/// ```
/// use lite_coord::semaphore::Semaphore;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let semaphore = Arc::new(Semaphore::new(2));
///
/// // At most two tasks inside the section at a time.
/// let mut handles = Vec::new();
/// for _ in 0..5 {
///     let sem = semaphore.clone();
///     handles.push(tokio::spawn(async move {
///         sem.acquire().await;
///         // ... bounded work ...
///         sem.release();
///     }));
/// }
///
/// for handle in handles {
///     handle.await.unwrap();
/// }
/// # });
/// ```
pub struct Semaphore {
    state: Mutex<State>,
}

struct State {
    // Invariant: permits > 0 implies waiters is empty; a permit is never held
    // back while someone is queued.
    permits: usize,
    waiters: VecDeque<Arc<Signal>>,
}

impl Semaphore {
    /// Create a semaphore with `permits` initially available permits
    ///
    /// 创建一个初始拥有 `permits` 个可用许可的信号量
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(State {
                permits,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Acquire one permit, waiting in FIFO order when none is available
    ///
    /// The bookkeeping happens synchronously inside this call: either a permit is
    /// taken immediately, or the caller's place in the queue is reserved before the
    /// future is returned, so fairness follows the order of `acquire()` *calls*,
    /// not the order of first polls.
    ///
    /// Dropping a future that is still queued forfeits the permit it would have
    /// received (there is no cancellation).
    ///
    /// 获取一个许可，无可用许可时按 FIFO 顺序等待
    ///
    /// 记账在本调用内同步完成：要么立即取走一个许可，要么在返回 future 之前
    /// 就已在队列中占位，因此公平性遵循 `acquire()` *调用*的顺序，
    /// 而不是首次轮询的顺序。
    ///
    /// 丢弃仍在排队的 future 会放弃它本应获得的许可（不支持取消）。
    pub fn acquire(&self) -> Acquire {
        let mut state = self.state.lock();

        if state.permits > 0 {
            state.permits -= 1;

            return Acquire { waiting: None };
        }

        let signal = Arc::new(Signal::new());
        state.waiters.push_back(signal.clone());

        Acquire {
            waiting: Some(signal.wait()),
        }
    }

    /// Release one permit
    ///
    /// Hands the permit directly to the oldest waiter if the queue is non-empty
    /// (the shared count is not touched); otherwise increments the available count.
    /// The waiter is woken after the internal lock is released.
    ///
    /// 释放一个许可
    ///
    /// 若队列非空则将许可直接交给最早的等待者（不触碰共享计数）；
    /// 否则增加可用计数。等待者在内部锁释放后被唤醒。
    pub fn release(&self) {
        let to_release = {
            let mut state = self.state.lock();

            match state.waiters.pop_front() {
                Some(waiter) => Some(waiter),
                None => {
                    state.permits += 1;
                    None
                }
            }
        };

        if let Some(waiter) = to_release {
            waiter.set();
        }
    }

    /// The number of permits currently available
    ///
    /// 当前可用的许可数量
    pub fn available_permits(&self) -> usize {
        self.state.lock().permits
    }
}

impl std::fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Semaphore")
            .field("permits", &state.permits)
            .field("queued", &state.waiters.len())
            .finish()
    }
}

/// Future returned by [`Semaphore::acquire`]
///
/// `Semaphore::acquire` 返回的 Future
#[derive(Debug)]
pub struct Acquire {
    // None: the permit was taken synchronously inside acquire()
    waiting: Option<Waiting>,
}

impl Unpin for Acquire {}

impl Future for Acquire {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match &mut self.get_mut().waiting {
            None => Poll::Ready(()),
            Some(waiting) => Pin::new(waiting).poll(cx),
        }
    }
}
