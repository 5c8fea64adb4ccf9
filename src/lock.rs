//! Scope-based async mutual exclusion.
//!
//! A [`Lock`] is a [`Semaphore`] with a single permit plus a guard type that gives
//! the critical section RAII shape: the permit is taken by awaiting
//! [`lock`](Lock::lock) and given back when the returned [`LockGuard`] drops.
//!
//! 基于作用域的异步互斥。
//!
//! [`Lock`] 是单许可的 [`Semaphore`] 加上一个 guard 类型，使临界区具有 RAII
//! 形态：通过等待 [`lock`](Lock::lock) 取得许可，返回的 [`LockGuard`] 析构时归还。

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use crate::semaphore::{Acquire, Semaphore};

/// Async mutual-exclusion lock with a scoped releaser
///
/// 带作用域释放器的异步互斥锁
///
/// # Examples
///
/// ```
/// use lite_coord::lock::Lock;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let lock = Arc::new(Lock::new());
///
/// {
///     let _guard = lock.lock().await;
///     // ... critical section ...
/// } // released here
///
/// let _guard = lock.lock().await;
/// # });
/// ```
pub struct Lock {
    semaphore: Semaphore,
}

impl Lock {
    /// Create an unlocked lock
    ///
    /// 创建一个未上锁的锁
    pub fn new() -> Self {
        Self {
            semaphore: Semaphore::new(1),
        }
    }

    /// Take the lock, waiting in FIFO order behind earlier callers
    ///
    /// The returned future resolves to a [`LockGuard`] that releases the lock
    /// exactly once when dropped.
    ///
    /// 获取锁，按 FIFO 顺序排在较早调用者之后
    ///
    /// 返回的 future 解析为一个 [`LockGuard`]，其析构时恰好释放锁一次。
    pub fn lock(&self) -> LockFuture<'_> {
        LockFuture {
            acquire: self.semaphore.acquire(),
            lock: self,
        }
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Lock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock")
            .field("locked", &(self.semaphore.available_permits() == 0))
            .finish()
    }
}

/// Future returned by [`Lock::lock`]
///
/// `Lock::lock` 返回的 Future
#[derive(Debug)]
pub struct LockFuture<'a> {
    acquire: Acquire,
    lock: &'a Lock,
}

impl Unpin for LockFuture<'_> {}

impl<'a> Future for LockFuture<'a> {
    type Output = LockGuard<'a>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        ready!(Pin::new(&mut this.acquire).poll(cx));

        Poll::Ready(LockGuard {
            lock: Some(this.lock),
        })
    }
}

/// Scoped releaser for [`Lock`]
///
/// The default guard carries no back-reference and its drop is a no-op, so a
/// guard slot can be initialized before any lock has actually been taken.
///
/// [`Lock`] 的作用域释放器
///
/// 默认 guard 不携带回引用，析构为空操作，因此可以在实际取得锁之前初始化
/// 一个 guard 槽位。
#[derive(Debug, Default)]
pub struct LockGuard<'a> {
    lock: Option<&'a Lock>,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock {
            lock.semaphore.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready};

    #[tokio::test]
    async fn test_mutual_exclusion() {
        let lock = Lock::new();

        let guard = lock.lock().await;

        let mut blocked = task::spawn(lock.lock());
        assert_pending!(blocked.poll());

        drop(guard);
        assert!(blocked.is_woken());
        let _second = assert_ready!(blocked.poll());
    }

    #[tokio::test]
    async fn test_guard_releases_exactly_once() {
        let lock = Lock::new();

        drop(lock.lock().await);
        drop(lock.lock().await);

        // Still exactly one permit: a double release would have minted a second
        let _held = lock.lock().await;
        let mut blocked = task::spawn(lock.lock());
        assert_pending!(blocked.poll());
    }

    #[tokio::test]
    async fn test_default_guard_is_noop() {
        let lock = Lock::new();
        let _held = lock.lock().await;

        // Dropping an unassociated guard must not release anything
        drop(LockGuard::default());

        let mut blocked = task::spawn(lock.lock());
        assert_pending!(blocked.poll());
    }

    #[tokio::test]
    async fn test_waiters_served_in_order() {
        let lock = Lock::new();

        let guard = lock.lock().await;
        let mut w1 = task::spawn(lock.lock());
        let mut w2 = task::spawn(lock.lock());
        assert_pending!(w1.poll());
        assert_pending!(w2.poll());

        drop(guard);
        let g1 = assert_ready!(w1.poll());
        assert_pending!(w2.poll());

        drop(g1);
        assert_ready!(w2.poll());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_exclusive_counter() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let lock = Arc::new(Lock::new());
        let active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let lock = lock.clone();
            let active = active.clone();

            handles.push(tokio::spawn(async move {
                let _guard = lock.lock().await;

                assert_eq!(active.fetch_add(1, Ordering::AcqRel), 0);
                tokio::task::yield_now().await;
                active.fetch_sub(1, Ordering::AcqRel);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
