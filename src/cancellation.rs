//! Кооперативная отмена асинхронных операций, привязанных к экрану.
//!
//! [`CancellationSource`] принадлежит экрану, [`CancellationToken`] передаётся
//! в задачу. Уход с экрана вызывает [`CancellationSource::cancel`], и задача,
//! ожидающая [`CancellationToken::cancelled`], просыпается.
//!
//! Удаление источника отмену не вызывает: её нужно запросить явно.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

#[derive(Debug)]
pub struct CancellationSource {
    inner: Arc<Inner>,
}

#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            // Notified создаётся до проверки флага, чтобы не потерять notify_waiters()
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Был ли токен выдан этим источником.
    pub fn is_from(&self, source: &CancellationSource) -> bool {
        Arc::ptr_eq(&self.inner, &source.inner)
    }
}
