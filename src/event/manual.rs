use arc_swap::ArcSwap;

use crate::signal::{Signal, Waiting};

/// Broadcast gate that stays signaled until explicitly reset
///
/// Any number of waiters proceed once the event is set, including waiters that
/// arrive after the fact, until [`reset`](ManualResetEvent::reset) installs a fresh
/// pending phase.
///
/// 显式重置前保持有信号状态的广播门
///
/// 事件被设置后，任意数量的等待者（包括之后到达的等待者）都会通过，
/// 直到 [`reset`](ManualResetEvent::reset) 装入一个全新的待定阶段。
///
/// # Examples
///
/// ```
/// use lite_coord::event::manual::ManualResetEvent;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let event = Arc::new(ManualResetEvent::new(false));
///
/// let opener = event.clone();
/// tokio::spawn(async move {
///     opener.set();
/// });
///
/// // Both waiters pass through the same open gate.
/// event.wait().await;
/// event.wait().await;
///
/// event.reset();
/// assert!(!event.is_set());
/// # });
/// ```
pub struct ManualResetEvent {
    signal: ArcSwap<Signal>,
}

impl ManualResetEvent {
    /// Create a new event, optionally starting in the signaled state
    ///
    /// 创建一个新事件，可选择以有信号状态开始
    pub fn new(initial_state: bool) -> Self {
        let signal = Signal::new();

        if initial_state {
            signal.set();
        }

        Self {
            signal: ArcSwap::from_pointee(signal),
        }
    }

    /// Returns a future tied to the phase current at the time of this call
    ///
    /// The future resolves once that phase is signaled; it keeps resolving even if
    /// the event is reset afterwards, because a completed signal never un-completes.
    ///
    /// 返回绑定到调用时当前阶段的 future
    ///
    /// 该 future 在该阶段被设置后完成；即使事件之后被重置它也保持完成，
    /// 因为已完成的信号永远不会取消完成。
    #[inline]
    pub fn wait(&self) -> Waiting {
        self.signal.load_full().wait()
    }

    /// Signal the current phase, releasing all current and future waiters
    ///
    /// Non-blocking and idempotent while the event stays signaled.
    ///
    /// 设置当前阶段，释放所有当前和未来的等待者
    ///
    /// 非阻塞；事件保持有信号状态期间幂等。
    #[inline]
    pub fn set(&self) {
        self.signal.load().set();
    }

    /// Returns true while the event is signaled
    ///
    /// 事件处于有信号状态时返回 true
    #[inline]
    pub fn is_set(&self) -> bool {
        self.signal.load().is_set()
    }

    /// Return the event to the unsignaled state
    ///
    /// Installs a fresh pending phase only if the current one is signaled, via a
    /// compare-and-swap on the signal reference; concurrent resets collapse into a
    /// single replacement. A no-op while the event is unsignaled.
    ///
    /// 将事件恢复为无信号状态
    ///
    /// 仅当当前阶段有信号时，通过对信号引用的比较并交换装入全新的待定阶段；
    /// 并发重置会合并为一次替换。事件无信号时为空操作。
    pub fn reset(&self) {
        super::replace_if_completed(&self.signal);
    }
}

impl Default for ManualResetEvent {
    fn default() -> Self {
        Self::new(false)
    }
}

impl std::fmt::Debug for ManualResetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualResetEvent")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready};

    #[tokio::test]
    async fn test_initially_signaled() {
        let event = ManualResetEvent::new(true);

        assert!(event.is_set());
        event.wait().await;
    }

    #[tokio::test]
    async fn test_set_releases_all_waiters() {
        let event = ManualResetEvent::new(false);

        let mut w1 = task::spawn(event.wait());
        let mut w2 = task::spawn(event.wait());
        assert_pending!(w1.poll());
        assert_pending!(w2.poll());

        event.set();

        assert!(w1.is_woken());
        assert!(w2.is_woken());
        assert_ready!(w1.poll());
        assert_ready!(w2.poll());

        // Late waiters pass straight through while the gate stays open
        let mut w3 = task::spawn(event.wait());
        assert_ready!(w3.poll());
    }

    #[tokio::test]
    async fn test_reset_closes_the_gate() {
        let event = ManualResetEvent::new(false);

        event.set();
        event.reset();
        assert!(!event.is_set());

        let mut waiter = task::spawn(event.wait());
        assert_pending!(waiter.poll());

        event.set();
        assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_reset_while_unsignaled_is_noop() {
        let event = ManualResetEvent::new(false);

        let mut waiter = task::spawn(event.wait());
        assert_pending!(waiter.poll());

        // Must not replace the phase the waiter is registered on
        event.reset();
        event.set();

        assert_ready!(waiter.poll());
    }

    #[tokio::test]
    async fn test_wait_captures_phase_at_call_time() {
        let event = ManualResetEvent::new(true);

        // Captured while signaled; resolves even though a reset follows
        let captured = event.wait();
        event.reset();

        captured.await;

        let mut fresh = task::spawn(event.wait());
        assert_pending!(fresh.poll());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_set_reset_cycles() {
        use std::sync::Arc;

        let event = Arc::new(ManualResetEvent::new(false));

        for _ in 0..100 {
            let waiter = {
                let e = event.clone();
                tokio::spawn(async move { e.wait().await })
            };

            let setter = event.clone();
            tokio::spawn(async move { setter.set() });

            waiter.await.unwrap();
            event.reset();
        }
    }
}
