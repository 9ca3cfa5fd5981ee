//! Panic capture for the request fault boundary
//!
//! A backtrace taken after `catch_unwind` returns only shows the catch site.
//! The process panic hook installed here records the backtrace at the panic
//! site instead, but only while a [`Guarded`] future is being polled on the
//! current thread; panics elsewhere go to the previous hook unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<CapturedPanic>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Diagnostics recorded at the panic site
#[derive(Debug, Clone)]
pub struct CapturedPanic {
    pub location: Option<String>,
    pub backtrace: String,
}

/// Install the capturing panic hook once per process
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(|depth| depth.get()) == 0 {
                previous(info);
                return;
            }
            let captured = CapturedPanic {
                location: info.location().map(|l| l.to_string()),
                backtrace: Backtrace::force_capture().to_string(),
            };
            CAPTURED.with(|slot| *slot.borrow_mut() = Some(captured));
        }));
    });
}

/// Diagnostics of the last guarded panic on this thread, or a catch-site
/// backtrace when none was recorded
pub fn take_captured() -> CapturedPanic {
    CAPTURED
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| CapturedPanic {
            location: None,
            backtrace: Backtrace::force_capture().to_string(),
        })
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Marks the current thread as inside the fault boundary while `F` is polled
pub struct Guarded<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Guarded<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Guarded<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let _depth = DepthGuard::enter();
        self.inner.as_mut().poll(cx)
    }
}
