//! Cyclic async rendezvous point for a fixed number of participants.
//!
//! Each phase collects `participants` calls to [`wait`](Barrier::wait); the call
//! that completes the head count swaps in a fresh phase and releases everyone
//! registered in the finished one. The barrier is immediately reusable for the
//! next phase.
//!
//! 固定参与者数量的循环异步汇合点。
//!
//! 每个阶段收集 `participants` 次 [`wait`](Barrier::wait) 调用；凑齐人数的那次
//! 调用换入新阶段并释放已在完成阶段注册的所有参与者。屏障可立即用于下一阶段。

use std::sync::Arc;

use crate::shim::sync::Mutex;
use crate::signal::{Signal, Waiting};

pub mod error {
    //! Barrier error types.

    use thiserror::Error;

    /// The participant count was zero
    ///
    /// 参与者数量为零
    #[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
    #[error("participant count must be greater than zero")]
    pub struct InvalidParticipantCount;
}

use self::error::InvalidParticipantCount;

/// Cyclic rendezvous barrier
///
/// 循环汇合屏障
///
/// # Examples
///
/// ```
/// use lite_coord::barrier::Barrier;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let barrier = Arc::new(Barrier::new(3).unwrap());
///
/// let mut handles = Vec::new();
/// for _ in 0..3 {
///     let b = barrier.clone();
///     handles.push(tokio::spawn(async move {
///         // ... per-participant work ...
///         b.wait().await;
///     }));
/// }
///
/// for handle in handles {
///     handle.await.unwrap();
/// }
/// # });
/// ```
pub struct Barrier {
    participants: usize,
    state: Mutex<PhaseState>,
}

struct PhaseState {
    // Counts down within the current phase; reset by the closing participant.
    remaining: usize,
    // Shared by every participant registered in the current phase.
    signal: Arc<Signal>,
}

impl Barrier {
    /// Create a barrier for `participants` parties per phase
    ///
    /// Fails with [`InvalidParticipantCount`] when `participants` is zero.
    ///
    /// 创建一个每阶段需要 `participants` 个参与方的屏障
    ///
    /// `participants` 为零时返回 [`InvalidParticipantCount`]。
    pub fn new(participants: usize) -> Result<Self, InvalidParticipantCount> {
        if participants == 0 {
            return Err(InvalidParticipantCount);
        }

        Ok(Self {
            participants,
            state: Mutex::new(PhaseState {
                remaining: participants,
                signal: Arc::new(Signal::new()),
            }),
        })
    }

    /// The number of participants required per phase
    ///
    /// 每阶段所需的参与者数量
    #[inline]
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Signal arrival and wait for the rest of the phase
    ///
    /// Registration and the count-down happen synchronously inside this call; a
    /// repeated call before the current phase completes registers for that same
    /// phase. The closing participant resets the count, swaps in a fresh phase and
    /// releases the finished one; the release order across waiters is unspecified.
    ///
    /// 宣告到达并等待本阶段的其余参与者
    ///
    /// 注册与倒计数在本调用内同步完成；当前阶段完成前的重复调用注册到同一阶段。
    /// 凑齐人数的参与者重置计数、换入新阶段并释放已完成的阶段；
    /// 等待者之间的释放顺序不作规定。
    pub fn wait(&self) -> Waiting {
        let (signal, phase_complete) = {
            let mut state = self.state.lock();

            state.remaining -= 1;

            if state.remaining == 0 {
                state.remaining = self.participants;

                let completed =
                    std::mem::replace(&mut state.signal, Arc::new(Signal::new()));

                (completed, true)
            } else {
                (state.signal.clone(), false)
            }
        };

        if phase_complete {
            #[cfg(feature = "tracing")]
            tracing::trace!(participants = self.participants, "barrier phase complete");

            signal.set();
        }

        signal.wait()
    }
}

impl std::fmt::Debug for Barrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Barrier")
            .field("participants", &self.participants)
            .field("remaining", &state.remaining)
            .finish()
    }
}
