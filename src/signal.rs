//! Single-shot broadcast completion signal.
//!
//! The building block under every resettable event in this crate: a flag that
//! transitions from pending to completed exactly once and wakes every registered
//! waiter when it does. Waiters that arrive after completion resolve immediately.
//!
//! A [`Signal`] never goes back to pending. Primitives that need to "reset" swap in
//! a fresh `Arc<Signal>` instead of mutating the old one, so observers that already
//! hold the completed signal keep seeing it completed.
//!
//! 一次性广播完成信号。
//!
//! 本 crate 中所有可重置事件的基础构建块：一个从待定到完成只转换一次的标志，
//! 完成时唤醒所有已注册的等待者。完成之后到达的等待者立即返回。
//!
//! [`Signal`] 永远不会回到待定状态。需要"重置"的原语会换入一个全新的
//! `Arc<Signal>` 而不是修改旧的，因此已经持有完成信号的观察者会一直看到完成状态。

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::shim::atomic::{AtomicBool, Ordering};
use crate::shim::sync::Mutex;

/// Single-shot broadcast completion signal
///
/// 一次性广播完成信号
///
/// # Examples
///
/// ```
/// use lite_coord::signal::Signal;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let signal = Arc::new(Signal::new());
/// let waiter = signal.clone().wait();
///
/// let setter = signal.clone();
/// tokio::spawn(async move {
///     setter.set();
/// });
///
/// waiter.await;
/// assert!(signal.is_set());
/// # });
/// ```
pub struct Signal {
    completed: AtomicBool,
    wakers: Mutex<Vec<Waker>>,
}

impl Signal {
    /// Create a new pending signal
    ///
    /// 创建一个新的待定信号
    #[inline]
    pub fn new() -> Self {
        Self {
            completed: AtomicBool::new(false),
            wakers: Mutex::new(Vec::new()),
        }
    }

    /// Complete the signal, waking every registered waiter
    ///
    /// Idempotent: the first call wins, later calls are no-ops.
    /// Never blocks; wakers are invoked after the internal lock is released.
    ///
    /// 完成信号，唤醒所有已注册的等待者
    ///
    /// 幂等：第一次调用生效，后续调用为空操作。
    /// 从不阻塞；唤醒在内部锁释放后进行。
    pub fn set(&self) {
        if self.completed.swap(true, Ordering::AcqRel) {
            return;
        }

        let wakers = std::mem::take(&mut *self.wakers.lock());

        for waker in wakers {
            waker.wake();
        }
    }

    /// Returns true once the signal has completed
    ///
    /// 信号完成后返回 true
    #[inline]
    pub fn is_set(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Returns a future that completes once the signal is set
    ///
    /// Consumes an `Arc` handle so the future can outlive the place the signal is
    /// stored in (e.g. after an event swaps in a fresh signal).
    ///
    /// 返回一个在信号被设置后完成的 future
    ///
    /// 消耗一个 `Arc` 句柄，使 future 可以比信号的存放位置活得更久
    /// （例如事件换入新信号之后）。
    #[inline]
    pub fn wait(self: Arc<Self>) -> Waiting {
        Waiting {
            signal: self,
            slot: None,
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("completed", &self.is_set())
            .finish()
    }
}

/// Future returned by [`Signal::wait`]
///
/// `Signal::wait` 返回的 Future
pub struct Waiting {
    signal: Arc<Signal>,
    // Index of this waiter's entry in the signal's waker table. Entries are only
    // appended while the signal is pending and the whole table is drained on
    // completion, so a stored index stays valid for as long as we may re-poll.
    slot: Option<usize>,
}

impl Unpin for Waiting {}

impl Future for Waiting {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        // Fast path: already completed, no lock taken
        if this.signal.completed.load(Ordering::Acquire) {
            return Poll::Ready(());
        }

        {
            let mut wakers = this.signal.wakers.lock();

            // Re-check under the lock: set() flips the flag before draining, so a
            // completion that raced the fast-path check is visible here.
            if this.signal.completed.load(Ordering::Acquire) {
                return Poll::Ready(());
            }

            match this.slot {
                Some(idx) => {
                    if !wakers[idx].will_wake(cx.waker()) {
                        wakers[idx] = cx.waker().clone();
                    }
                }
                None => {
                    this.slot = Some(wakers.len());
                    wakers.push(cx.waker().clone());
                }
            }
        }

        Poll::Pending
    }
}

impl Drop for Waiting {
    fn drop(&mut self) {
        if let Some(idx) = self.slot {
            let mut wakers = self.signal.wakers.lock();

            // Indices of other waiters must not shift, so the entry is neutralized
            // in place rather than removed.
            if idx < wakers.len() {
                wakers[idx] = Waker::noop().clone();
            }
        }
    }
}

impl std::fmt::Debug for Waiting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiting")
            .field("completed", &self.signal.is_set())
            .field("registered", &self.slot.is_some())
            .finish()
    }
}
