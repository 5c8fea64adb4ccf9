use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::signal::Signal;

/// Single-release gate: one waiter proceeds per signal
///
/// [`set`](AutoResetEvent::set) opens the gate for exactly one waiter; the winning
/// waiter atomically returns the event to the pending state on its way out.
/// Consecutive `set()` calls with no waiter in between collapse into a single
/// pending release; no signal count accumulates.
///
/// 单次释放门：每个信号只放行一个等待者
///
/// [`set`](AutoResetEvent::set) 只为一个等待者打开门；获胜的等待者在离开时
/// 原子地将事件恢复为待定状态。中间没有等待者的连续 `set()` 调用会合并为
/// 一次待定释放，信号不会累积计数。
///
/// # Examples
///
/// ```
/// use lite_coord::event::auto::AutoResetEvent;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let event = Arc::new(AutoResetEvent::new(true));
///
/// // The initial signal admits exactly one waiter...
/// event.wait().await;
///
/// // ...after which the event is pending again.
/// let gate = event.clone();
/// tokio::spawn(async move {
///     gate.set();
/// });
/// event.wait().await;
/// # });
/// ```
pub struct AutoResetEvent {
    signal: ArcSwap<Signal>,
}

impl AutoResetEvent {
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

    /// Wait until this caller wins a signal, resetting the event on the way out
    ///
    /// Awaits the current signal, then claims it by compare-and-swapping a fresh
    /// pending signal into the event. Exactly one awakened waiter wins the claim;
    /// the others move onto the fresh signal and keep waiting for the next
    /// [`set`](AutoResetEvent::set).
    ///
    /// 等待本调用者赢得一次信号，并在离开时重置事件
    ///
    /// 等待当前信号，然后通过比较并交换将全新的待定信号换入事件来认领它。
    /// 被唤醒的等待者中恰好一个认领成功；其余等待者转移到新信号上，
    /// 继续等待下一次 [`set`](AutoResetEvent::set)。
    pub async fn wait(&self) {
        loop {
            let current = self.signal.load_full();

            current.clone().wait().await;

            let prev = self
                .signal
                .compare_and_swap(&current, Arc::new(Signal::new()));

            if Arc::ptr_eq(&*prev, &current) {
                // Claimed: the event now holds a fresh pending signal
                return;
            }

            // Another waiter claimed this signal (or a reset replaced it);
            // go around and wait on whatever is installed now.
        }
    }

    /// Signal the event, releasing at most one waiter
    ///
    /// Idempotent while unsignaled: bursts of `set()` before any waiter drains
    /// collapse into a single release.
    ///
    /// 设置事件，最多释放一个等待者
    ///
    /// 无信号期间幂等：在任何等待者消费之前的多次 `set()` 合并为一次释放。
    #[inline]
    pub fn set(&self) {
        self.signal.load().set();
    }

    /// Force the event back to the unsignaled state
    ///
    /// 强制事件回到无信号状态
    pub fn reset(&self) {
        super::replace_if_completed(&self.signal);
    }
}

impl Default for AutoResetEvent {
    fn default() -> Self {
        Self::new(false)
    }
}

impl std::fmt::Debug for AutoResetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoResetEvent")
            .field("is_set", &self.signal.load().is_set())
            .finish()
    }
}
