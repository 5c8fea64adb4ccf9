//! # lite-coord
//!
//! Lightweight async coordination primitives for Rust.
//!
//! 轻量级的 Rust 异步协调原语库。
//!
//! ## Overview / 概述
//!
//! `lite-coord` provides a small set of awaitable coordination primitives
//! (resettable events, a FIFO semaphore, scope-released locks and a cyclic
//! barrier) plus a single-slot task throttler and a compact arithmetic
//! expression evaluator. Everything is built on one shared mechanism: a
//! single-shot broadcast [`signal::Signal`] that is replaced, never rewound,
//! when a primitive resets.
//!
//! `lite-coord` 提供一组小而完整的可等待协调原语（可重置事件、FIFO 信号量、
//! 作用域释放的锁和循环屏障），外加一个单槽位任务节流器和一个紧凑的算术
//! 表达式求值器。一切都建立在同一共享机制之上：一次性广播的
//! [`signal::Signal`]，原语重置时替换它而永不回拨。
//!
//! ## Key Features / 主要特性
//!
//! - **Pure async suspension**: no primitive ever blocks the OS thread while waiting
//! - **Short critical sections**: internal locks guard queue/counter mutation only
//!   and are never held across a suspension point; all waking happens after unlock
//! - **Call-order fairness**: semaphore and writer queues reserve their place at
//!   call time, so FIFO order is the order of calls, not of first polls
//! - **Runtime-light**: only the throttler's detached drain needs a tokio runtime
//!
//! - **纯异步挂起**：等待期间没有任何原语会阻塞操作系统线程
//! - **短临界区**：内部锁只保护队列/计数器变更，从不跨挂起点持有；
//!   所有唤醒都在解锁之后进行
//! - **按调用顺序的公平性**：信号量与写者队列在调用时占位，
//!   因此 FIFO 顺序是调用顺序而非首次轮询顺序
//! - **轻运行时**：只有节流器的后台排空任务需要 tokio 运行时
//!
//! ## Modules / 模块
//!
//! ### [`signal`]
//!
//! Single-shot broadcast completion signal, the building block under every event
//! in this crate. Set once, wakes every waiter, never un-completes.
//!
//! 一次性广播完成信号，本 crate 中所有事件的基础构建块。设置一次，
//! 唤醒所有等待者，永不取消完成。
//!
//! ### [`event`]
//!
//! Resettable gates: [`event::manual::ManualResetEvent`] (broadcast, stays open),
//! [`event::auto::AutoResetEvent`] (one waiter per signal) and
//! [`event::countdown::CountdownEvent`] (opens at zero).
//!
//! 可重置的门：[`event::manual::ManualResetEvent`]（广播，保持打开）、
//! [`event::auto::AutoResetEvent`]（每信号放行一个等待者）以及
//! [`event::countdown::CountdownEvent`]（计数到零时打开）。
//!
//! ### [`semaphore`]
//!
//! Bounded-concurrency admission with a strict FIFO wait queue; releases hand the
//! permit directly to the oldest waiter.
//!
//! 具有严格 FIFO 等待队列的有界并发准入；释放时将许可直接交给最早的等待者。
//!
//! ### [`lock`] and [`rwlock`]
//!
//! Mutual exclusion over a single-permit semaphore, and a multiple-reader /
//! single-writer lock with FIFO writers and batched reader admission. Both
//! release through RAII guards whose default value is a safe no-op.
//!
//! 基于单许可信号量的互斥锁，以及写者 FIFO、读者批量准入的多读者/单写者锁。
//! 两者都通过 RAII guard 释放，其默认值是安全的空操作。
//!
//! ### [`barrier`]
//!
//! Cyclic rendezvous for a fixed number of participants; each completed phase
//! swaps in a fresh one.
//!
//! 固定参与者数量的循环汇合点；每个完成的阶段都会换入一个新阶段。
//!
//! ### [`throttle`]
//!
//! Single-slot task throttle: while one job runs, only the newest submission
//! stays queued; replaced submissions observe a caller-supplied skip value.
//!
//! 单槽位任务节流：一个任务运行期间只保留最新的提交；
//! 被替换的提交会得到调用者提供的跳过值。
//!
//! ### [`calc`]
//!
//! Recursive-descent arithmetic over `f64` with `+ - * / % ^` and parentheses.
//!
//! 基于递归下降的 `f64` 算术，支持 `+ - * / % ^` 与括号。
//!
//! ## Examples / 示例
//!
//! ### Bounded fan-out with a semaphore
//!
//! ```
//! use lite_coord::semaphore::Semaphore;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let semaphore = Arc::new(Semaphore::new(4));
//!
//! let mut handles = Vec::new();
//! for _ in 0..16 {
//!     let sem = semaphore.clone();
//!     handles.push(tokio::spawn(async move {
//!         sem.acquire().await;
//!         // ... at most four tasks in here at once ...
//!         sem.release();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.await.unwrap();
//! }
//! # });
//! ```
//!
//! ### Collapsing a burst of refreshes
//!
//! ```
//! use lite_coord::throttle::EventThrottler;
//!
//! # tokio_test::block_on(async {
//! let throttler = EventThrottler::<u32>::new();
//!
//! let first = throttler.run_async(async { 1 }, 0);
//! let second = throttler.run_async(async { 2 }, 0);
//! let third = throttler.run_async(async { 3 }, 0);
//!
//! // Only the in-flight job and the newest submission run.
//! assert_eq!(tokio::join!(first, second, third), (1, 0, 3));
//! # });
//! ```
//!
//! ### Phased work with a barrier
//!
//! ```
//! use lite_coord::barrier::Barrier;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let barrier = Arc::new(Barrier::new(2).unwrap());
//!
//! let partner = barrier.clone();
//! let task = tokio::spawn(async move {
//!     partner.wait().await; // phase 1
//!     partner.wait().await; // phase 2
//! });
//!
//! barrier.wait().await;
//! barrier.wait().await;
//! task.await.unwrap();
//! # });
//! ```
//!
//! ## Concurrency contract / 并发契约
//!
//! All primitives may be signaled and awaited from any thread or task. None of
//! them supports cancellation: dropping a future that already took a queue
//! position forfeits that position (see the per-module docs). The throttler's
//! fire-and-forget path and detached drain run on the ambient tokio runtime.
//!
//! 所有原语都可以从任意线程或任务发出信号和等待。它们都不支持取消：
//! 丢弃已占据队列位置的 future 会放弃该位置（见各模块文档）。
//! 节流器的即发即忘路径和后台排空任务运行在环境 tokio 运行时上。

pub mod barrier;
pub mod calc;
pub mod event;
pub mod lock;
pub mod rwlock;
pub mod semaphore;
pub mod signal;
pub mod throttle;

pub(crate) mod shim;
