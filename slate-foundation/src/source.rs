//! The contract through which source text enters the front-end.
//!
//! The core never touches the filesystem itself; the embedder registers one
//! or more providers and `using` imports are resolved by trying each of them
//! in order. I/O happens strictly before a parse begins - a parse operates on
//! a buffer that is already in memory.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::debug;

use crate::{errors::Diagnostic, span::SourceUri};

/// The outcome of asking a provider for a source file.
#[derive(Debug, Clone)]
pub enum SourceLoadResult {
    /// The provider found the file. `uri` is the canonical identity of what
    /// was loaded, which subsequent diagnostics and `current` arguments use.
    Loaded { source: Rc<str>, uri: SourceUri },
    /// The provider does not know the file; the next provider is tried.
    NotExists,
    /// The provider knows the file but could not load it.
    Error(Diagnostic),
}

/// Synchronous source resolution.
///
/// `requested` is the import text as written (`using "math.slt"` requests
/// `math.slt`); `current` is the file the import appears in, so relative
/// resolution has an anchor.
pub trait SourceProvider {
    fn try_load(&self, requested: &str, current: Option<&SourceUri>) -> SourceLoadResult;
}

/// Asynchronous source resolution.
///
/// The returned future is driven by the embedder; no runtime is assumed. The
/// token cancels only the load itself - parses already running are never
/// interrupted.
pub trait AsyncSourceProvider {
    fn try_load<'a>(
        &'a self,
        requested: &'a str,
        current: Option<&'a SourceUri>,
        cancellation: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = SourceLoadResult> + 'a>>;
}

/// Cooperative cancellation flag for [`AsyncSourceProvider`] loads.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Tries each provider in order; the first one that does not answer
/// [`SourceLoadResult::NotExists`] decides the outcome.
pub fn resolve_source(
    providers: &[&dyn SourceProvider],
    requested: &str,
    current: Option<&SourceUri>,
) -> SourceLoadResult {
    for provider in providers {
        match provider.try_load(requested, current) {
            SourceLoadResult::NotExists => continue,
            resolved => return resolved,
        }
    }
    debug!("no provider could resolve {requested:?}");
    SourceLoadResult::NotExists
}

/// An in-memory provider, mainly for tests and embedders that already hold
/// all sources.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    files: HashMap<String, Rc<str>>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: impl Into<String>, source: impl Into<Rc<str>>) -> Self {
        self.files.insert(uri.into(), source.into());
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, source: impl Into<Rc<str>>) {
        self.files.insert(uri.into(), source.into());
    }
}

impl SourceProvider for MemorySourceProvider {
    fn try_load(&self, requested: &str, _current: Option<&SourceUri>) -> SourceLoadResult {
        match self.files.get(requested) {
            Some(source) => SourceLoadResult::Loaded {
                source: Rc::clone(source),
                uri: SourceUri::from(requested),
            },
            None => SourceLoadResult::NotExists,
        }
    }
}

impl AsyncSourceProvider for MemorySourceProvider {
    fn try_load<'a>(
        &'a self,
        requested: &'a str,
        current: Option<&'a SourceUri>,
        cancellation: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = SourceLoadResult> + 'a>> {
        Box::pin(async move {
            if cancellation.is_cancelled() {
                return SourceLoadResult::NotExists;
            }
            SourceProvider::try_load(self, requested, current)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_are_tried_in_order() {
        let first = MemorySourceProvider::new().with("a.slt", "first a");
        let second = MemorySourceProvider::new()
            .with("a.slt", "second a")
            .with("b.slt", "second b");

        match resolve_source(&[&first, &second], "a.slt", None) {
            SourceLoadResult::Loaded { source, .. } => assert_eq!(&*source, "first a"),
            other => panic!("expected a load, got {other:?}"),
        }
        match resolve_source(&[&first, &second], "b.slt", None) {
            SourceLoadResult::Loaded { source, .. } => assert_eq!(&*source, "second b"),
            other => panic!("expected a load, got {other:?}"),
        }
        assert!(matches!(
            resolve_source(&[&first, &second], "c.slt", None),
            SourceLoadResult::NotExists
        ));
    }

    #[test]
    fn cancellation_token_round_trip() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.clone().is_cancelled());
    }
}
