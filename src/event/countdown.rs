use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::signal::Waiting;

use super::manual::ManualResetEvent;

pub mod error {
    //! Countdown error types.

    use thiserror::Error;

    /// Errors reported by [`CountdownEvent`](super::CountdownEvent)
    ///
    /// [`CountdownEvent`](super::CountdownEvent) 报告的错误
    #[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
    pub enum CountdownError {
        /// The initial count was zero
        ///
        /// 初始计数为零
        #[error("initial count must be greater than zero")]
        InvalidCount,

        /// Signaled after the count already reached zero
        ///
        /// 计数已到零之后又发出信号
        #[error("countdown already completed")]
        AlreadyCompleted,
    }
}

use self::error::CountdownError;

/// Countdown gate: opens once it has been signaled down to zero
///
/// Composes an atomic counter with a [`ManualResetEvent`]; the decrement that
/// reaches exactly zero sets the event, releasing every current and future waiter.
///
/// 倒计数门：被递减到零后打开
///
/// 将原子计数器与 [`ManualResetEvent`] 组合；恰好到达零的那次递减会设置事件，
/// 释放所有当前和未来的等待者。
///
/// # Examples
///
/// ```
/// use lite_coord::event::countdown::CountdownEvent;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let countdown = Arc::new(CountdownEvent::new(3).unwrap());
///
/// for _ in 0..3 {
///     let c = countdown.clone();
///     tokio::spawn(async move {
///         // ... finish a unit of work ...
///         c.signal().unwrap();
///     });
/// }
///
/// countdown.wait().await;
/// assert_eq!(countdown.remaining(), 0);
/// # });
/// ```
pub struct CountdownEvent {
    remaining: AtomicUsize,
    event: ManualResetEvent,
}

impl CountdownEvent {
    /// Create a countdown that opens after `initial_count` signals
    ///
    /// Fails with [`CountdownError::InvalidCount`] when `initial_count` is zero;
    /// the count is never clamped.
    ///
    /// 创建一个在 `initial_count` 次信号后打开的倒计数
    ///
    /// `initial_count` 为零时返回 [`CountdownError::InvalidCount`]；计数从不被钳制。
    pub fn new(initial_count: usize) -> Result<Self, CountdownError> {
        if initial_count == 0 {
            return Err(CountdownError::InvalidCount);
        }

        Ok(Self {
            remaining: AtomicUsize::new(initial_count),
            event: ManualResetEvent::new(false),
        })
    }

    /// The number of signals still required to open the gate
    ///
    /// 打开门还需要的信号次数
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Returns a future that completes once the count reaches zero
    ///
    /// 返回一个在计数到零后完成的 future
    #[inline]
    pub fn wait(&self) -> Waiting {
        self.event.wait()
    }

    /// Decrement the count, setting the event when it reaches zero
    ///
    /// Fails with [`CountdownError::AlreadyCompleted`] when the count is already
    /// zero; the counter never goes negative.
    ///
    /// 递减计数，到零时设置事件
    ///
    /// 计数已为零时返回 [`CountdownError::AlreadyCompleted`]；计数器永不为负。
    pub fn signal(&self) -> Result<(), CountdownError> {
        let mut current = self.remaining.load(Ordering::Acquire);

        loop {
            if current == 0 {
                return Err(CountdownError::AlreadyCompleted);
            }

            match self.remaining.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if current == 1 {
                        self.event.set();
                    }

                    return Ok(());
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Signal once, then wait for the gate to open
    ///
    /// 发出一次信号，然后等待门打开
    pub async fn signal_and_wait(&self) -> Result<(), CountdownError> {
        self.signal()?;
        self.wait().await;
        Ok(())
    }
}

impl std::fmt::Debug for CountdownEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEvent")
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready};

    #[test]
    fn test_zero_count_rejected() {
        assert_eq!(
            CountdownEvent::new(0).unwrap_err(),
            CountdownError::InvalidCount
        );
    }

    #[tokio::test]
    async fn test_opens_after_exact_count() {
        let countdown = CountdownEvent::new(3).unwrap();

        let mut waiter = task::spawn(countdown.wait());
        assert_pending!(waiter.poll());

        countdown.signal().unwrap();
        countdown.signal().unwrap();
        assert_pending!(waiter.poll());
        assert_eq!(countdown.remaining(), 1);

        countdown.signal().unwrap();
        assert!(waiter.is_woken());
        assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_signal_past_zero_fails() {
        let countdown = CountdownEvent::new(1).unwrap();

        countdown.signal().unwrap();
        assert_eq!(
            countdown.signal().unwrap_err(),
            CountdownError::AlreadyCompleted
        );

        // The failed signal left the open gate untouched
        countdown.wait().await;
    }

    #[tokio::test]
    async fn test_late_waiters_pass_through() {
        let countdown = CountdownEvent::new(1).unwrap();

        countdown.signal().unwrap();

        countdown.wait().await;
        countdown.wait().await;
    }

    #[tokio::test]
    async fn test_signal_and_wait_rendezvous() {
        let countdown = Arc::new(CountdownEvent::new(2).unwrap());

        let other = countdown.clone();
        let handle = tokio::spawn(async move { other.signal_and_wait().await });

        countdown.signal_and_wait().await.unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(countdown.remaining(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signals_reach_zero_once() {
        for _ in 0..50 {
            let countdown = Arc::new(CountdownEvent::new(8).unwrap());

            let mut handles = Vec::new();
            for _ in 0..8 {
                let c = countdown.clone();
                handles.push(tokio::spawn(async move { c.signal() }));
            }

            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            countdown.wait().await;
            assert_eq!(countdown.remaining(), 0);
        }
    }
}
