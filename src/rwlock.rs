//! Async multiple-reader / single-writer lock with batched reader admission.
//!
//! Writers queue strictly FIFO. Readers that arrive while a writer holds or awaits
//! the lock are *batched*: they all share one signal, and when a writer release
//! finds no further queued writer it releases the whole batch at once. This is
//! deliberately not strict FIFO across readers and writers: a batch of readers is
//! admitted as one unit ahead of any writer that arrives after the batch started
//! draining.
//!
//! 具有批量读者准入的异步多读者/单写者锁。
//!
//! 写者严格按 FIFO 排队。在写者持有或等待锁期间到达的读者会被*批量*处理：
//! 它们共享一个信号，当写者释放时若队列中没有后续写者，整批读者会被一次性放行。
//! 这有意不是跨读者与写者的严格 FIFO：一批读者作为一个整体被准入，
//! 先于任何在该批开始放行之后才到达的写者。

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use crate::shim::sync::Mutex;
use crate::signal::{Signal, Waiting};

/// Multiple-reader / single-writer async lock
///
/// 多读者/单写者异步锁
///
/// # Examples
///
/// ```
/// use lite_coord::rwlock::RwLock;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let lock = Arc::new(RwLock::new());
///
/// {
///     // Readers share access...
///     let _r1 = lock.read().await;
///     let _r2 = lock.read().await;
/// }
///
/// // ...writers get it alone.
/// let _w = lock.write().await;
/// # });
/// ```
pub struct RwLock {
    state: Mutex<State>,
}

struct State {
    // 0 = free, -1 = held by a writer, N > 0 = N active readers.
    // Invariant: status < 0 implies no active readers; status > 0 implies no
    // active writer.
    status: isize,
    waiting_writers: VecDeque<Arc<Signal>>,
    waiting_readers: usize,
    // Shared by every reader waiting for the next batch release.
    reader_batch: Arc<Signal>,
}

impl RwLock {
    /// Create an unheld lock
    ///
    /// 创建一个未被持有的锁
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                status: 0,
                waiting_writers: VecDeque::new(),
                waiting_readers: 0,
                reader_batch: Arc::new(Signal::new()),
            }),
        }
    }

    /// Take shared read access
    ///
    /// Granted immediately when no writer holds or awaits the lock; otherwise the
    /// caller joins the current reader batch, which is released as one unit by a
    /// writer release. Admission bookkeeping happens synchronously at call time.
    ///
    /// 获取共享读访问
    ///
    /// 没有写者持有或等待锁时立即授予；否则调用者加入当前读者批次，
    /// 该批次在写者释放时被整体放行。准入记账在调用时同步完成。
    pub fn read(&self) -> ReadFuture<'_> {
        let mut state = self.state.lock();

        if state.status >= 0 && state.waiting_writers.is_empty() {
            state.status += 1;

            return ReadFuture {
                waiting: None,
                lock: self,
            };
        }

        state.waiting_readers += 1;

        ReadFuture {
            waiting: Some(state.reader_batch.clone().wait()),
            lock: self,
        }
    }

    /// Take exclusive write access
    ///
    /// Granted immediately only when the lock is fully free; otherwise the caller
    /// queues behind earlier writers, strictly FIFO.
    ///
    /// 获取独占写访问
    ///
    /// 仅当锁完全空闲时立即授予；否则调用者排在较早写者之后，严格 FIFO。
    pub fn write(&self) -> WriteFuture<'_> {
        let mut state = self.state.lock();

        if state.status == 0 {
            state.status = -1;

            return WriteFuture {
                waiting: None,
                lock: self,
            };
        }

        let signal = Arc::new(Signal::new());
        state.waiting_writers.push_back(signal.clone());

        WriteFuture {
            waiting: Some(signal.wait()),
            lock: self,
        }
    }

    /// Called when an active reader drops its guard.
    fn release_reader(&self) {
        let to_wake = {
            let mut state = self.state.lock();

            state.status -= 1;

            // Last reader out hands the lock straight to the oldest queued
            // writer, never passing through the free state.
            if state.status == 0 && !state.waiting_writers.is_empty() {
                state.status = -1;
                state.waiting_writers.pop_front()
            } else {
                None
            }
        };

        if let Some(writer) = to_wake {
            writer.set();
        }
    }

    /// Called when the active writer drops its guard.
    fn release_writer(&self) {
        let to_wake = {
            let mut state = self.state.lock();

            if let Some(writer) = state.waiting_writers.pop_front() {
                // Direct writer-to-writer transfer; status stays -1
                Some(writer)
            } else if state.waiting_readers > 0 {
                // Release the whole waiting batch at once and start a fresh one
                state.status = state.waiting_readers as isize;

                #[cfg(feature = "tracing")]
                tracing::trace!(readers = state.waiting_readers, "releasing reader batch");

                state.waiting_readers = 0;

                Some(std::mem::replace(
                    &mut state.reader_batch,
                    Arc::new(Signal::new()),
                ))
            } else {
                state.status = 0;
                None
            }
        };

        if let Some(signal) = to_wake {
            signal.set();
        }
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RwLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RwLock")
            .field("status", &state.status)
            .field("waiting_writers", &state.waiting_writers.len())
            .field("waiting_readers", &state.waiting_readers)
            .finish()
    }
}

/// Future returned by [`RwLock::read`]
///
/// `RwLock::read` 返回的 Future
#[derive(Debug)]
pub struct ReadFuture<'a> {
    waiting: Option<Waiting>,
    lock: &'a RwLock,
}

impl Unpin for ReadFuture<'_> {}

impl<'a> Future for ReadFuture<'a> {
    type Output = RwLockReadGuard<'a>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(waiting) = &mut this.waiting {
            ready!(Pin::new(waiting).poll(cx));
        }

        Poll::Ready(RwLockReadGuard {
            lock: Some(this.lock),
        })
    }
}

/// Future returned by [`RwLock::write`]
///
/// `RwLock::write` 返回的 Future
#[derive(Debug)]
pub struct WriteFuture<'a> {
    waiting: Option<Waiting>,
    lock: &'a RwLock,
}

impl Unpin for WriteFuture<'_> {}

impl<'a> Future for WriteFuture<'a> {
    type Output = RwLockWriteGuard<'a>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(waiting) = &mut this.waiting {
            ready!(Pin::new(waiting).poll(cx));
        }

        Poll::Ready(RwLockWriteGuard {
            lock: Some(this.lock),
        })
    }
}

/// Scoped releaser for shared read access
///
/// The default guard carries no back-reference; dropping it is a no-op.
///
/// 共享读访问的作用域释放器
///
/// 默认 guard 不携带回引用，析构为空操作。
#[derive(Debug, Default)]
pub struct RwLockReadGuard<'a> {
    lock: Option<&'a RwLock>,
}

impl Drop for RwLockReadGuard<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock {
            lock.release_reader();
        }
    }
}

/// Scoped releaser for exclusive write access
///
/// The default guard carries no back-reference; dropping it is a no-op.
///
/// 独占写访问的作用域释放器
///
/// 默认 guard 不携带回引用，析构为空操作。
#[derive(Debug, Default)]
pub struct RwLockWriteGuard<'a> {
    lock: Option<&'a RwLock>,
}

impl Drop for RwLockWriteGuard<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock {
            lock.release_writer();
        }
    }
}
