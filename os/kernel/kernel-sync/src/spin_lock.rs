//! # Spin Lock

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// A tiny spinlock for short critical sections.
///
/// This lock is suitable for **uniprocessor** or early boot stages where:
/// - Preemption is either disabled or non-existent.
/// - Critical sections are very short (no I/O, no blocking).
///
/// # Guarantees
/// - Provides mutual exclusion for access to the protected value.
/// - `Sync` is implemented when `T: Send`, allowing shared references across
///   threads (the lock enforces interior mutability).
///
/// # Caveats
/// - Does **not** disable interrupts.
/// - Busy-waits with `spin_loop`, so keep critical sections small.
pub struct SpinLock<T> {
    /// Lock state (`false` = unlocked, `true` = locked).
    locked: AtomicBool,
    /// The protected value.
    inner: UnsafeCell<T>,
}

// Safety: SpinLock provides mutual exclusion; it can be shared across threads as long as T is Send.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create a new spinlock wrapping `inner`.
    pub const fn new(inner: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
        }
    }

    /// Execute `f` with exclusive access to the inner value.
    ///
    /// Spins until the lock is acquired, then releases it after `f` returns.
    ///
    /// # Panics
    /// Never panics by itself; panics in `f` will unwind through the critical section.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // Spin until we acquire the lock.
        while self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }

        // SAFETY: We have exclusive access while the lock is held.
        let res = {
            let inner = unsafe { &mut *self.inner.get() };
            f(inner)
        };
        self.locked.store(false, Ordering::Release);
        res
    }

    /// Acquires the lock and returns a guard that releases it on drop.
    ///
    /// Spins until the lock is acquired.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        SpinLockGuard { lock: self }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// Returns `None` if the lock is currently held.
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        let acquired = self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok();
        acquired.then(|| SpinLockGuard { lock: self })
    }

    /// Returns a mutable reference to the inner value.
    ///
    /// Because this takes `&mut self`, no other references can exist, so
    /// locking is unnecessary.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

/// A guard that releases a [`SpinLock`] when dropped.
///
/// Created by [`SpinLock::lock`] and [`SpinLock::try_lock`]. Implements
/// [`Deref`] and [`DerefMut`] to access the protected value.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock exclusively.
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock exclusively.
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
