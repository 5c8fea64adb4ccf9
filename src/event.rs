//! Resettable async event primitives built on the completion [`Signal`](crate::signal::Signal).
//!
//! All three events share one mechanism: the current phase is an `Arc<Signal>`
//! stored in an [`ArcSwap`], and "resetting" means compare-and-swapping a fresh
//! pending signal into that slot. A completed signal is never mutated back to
//! pending, so waiters that already captured it keep resolving.
//!
//! 基于完成 [`Signal`](crate::signal::Signal) 构建的可重置异步事件原语。
//!
//! 三种事件共享同一机制：当前阶段是存放在 [`ArcSwap`] 中的 `Arc<Signal>`，
//! "重置"意味着通过比较并交换将一个全新的待定信号换入该槽位。已完成的信号
//! 永远不会被改回待定状态，因此已经捕获它的等待者会继续正常返回。
//!
//! # Variants | 变体
//!
//! ## [`manual::ManualResetEvent`]
//!
//! Broadcast gate: once set, every current and future waiter proceeds until an
//! explicit `reset()`.
//!
//! 广播门：一旦设置，所有当前和未来的等待者都会通过，直到显式 `reset()`。
//!
//! ## [`auto::AutoResetEvent`]
//!
//! Single-release gate: each `set()` releases at most one waiter, after which the
//! event is pending again.
//!
//! 单次释放门：每次 `set()` 最多释放一个等待者，之后事件回到待定状态。
//!
//! ## [`countdown::CountdownEvent`]
//!
//! A counter over a manual-reset event: the event sets once the counter has been
//! signaled down to zero.
//!
//! 基于手动重置事件的计数器：计数器被递减到零后事件被设置。

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::signal::Signal;

pub mod auto;
pub mod countdown;
pub mod manual;

/// Swap a fresh pending signal into `slot`, but only while the current one is
/// completed. Retries when a concurrent swap wins and the slot still holds a
/// completed signal; a concurrent reset that already installed a pending signal
/// makes this a no-op.
///
/// 仅当 `slot` 当前的信号已完成时，才将一个全新的待定信号换入。当并发交换获胜
/// 且槽位仍持有已完成信号时重试；若并发重置已装入待定信号，则本次调用为空操作。
pub(crate) fn replace_if_completed(slot: &ArcSwap<Signal>) {
    loop {
        let current = slot.load_full();

        if !current.is_set() {
            return;
        }

        let prev = slot.compare_and_swap(&current, Arc::new(Signal::new()));

        if Arc::ptr_eq(&*prev, &current) {
            return;
        }
    }
}
