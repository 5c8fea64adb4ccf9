//! Shim module to abstract over core and loom primitives.
//!
//! This module provides a unified interface for the synchronization building blocks
//! that transparently switches between the production implementation and the `loom`
//! implementation (for model-checked tests).
//!
//! 用于抽象 core 和 loom 原语的 shim 模块。
//!
//! 该模块为同步构建块提供统一接口，在生产实现和 `loom` 实现（用于模型检查测试）之间
//! 透明切换。

#[cfg(not(feature = "loom"))]
pub(crate) mod atomic {
    pub use core::sync::atomic::*;
}

#[cfg(feature = "loom")]
pub(crate) mod atomic {
    pub use loom::sync::atomic::*;
}

#[cfg(not(feature = "loom"))]
pub(crate) mod sync {
    /// Internal mutex guarding queue/counter state.
    ///
    /// `parking_lot` in production: no poisoning, so `lock()` returns the guard
    /// directly. The loom variant below adapts `loom::sync::Mutex` to the same
    /// signature.
    ///
    /// 保护队列/计数器状态的内部互斥锁。
    ///
    /// 生产环境使用 `parking_lot`：无中毒机制，因此 `lock()` 直接返回 guard。
    /// 下方的 loom 变体将 `loom::sync::Mutex` 适配为相同的签名。
    pub use parking_lot::Mutex;
}

#[cfg(feature = "loom")]
pub(crate) mod sync {
    pub use loom::sync::MutexGuard;

    #[derive(Debug)]
    pub struct Mutex<T>(loom::sync::Mutex<T>);

    impl<T> Mutex<T> {
        pub fn new(data: T) -> Mutex<T> {
            Mutex(loom::sync::Mutex::new(data))
        }

        pub fn lock(&self) -> MutexGuard<'_, T> {
            self.0.lock().unwrap()
        }
    }
}
