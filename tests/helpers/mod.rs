// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for chaincache integration tests
//!
//! Provides a scripted upstream that stands in for a contract call, so cache
//! behavior can be tested without a blockchain connection.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chaincache::{BoxError, ReadCache, ReadKey};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Semaphore;

/// One scripted upstream response
#[derive(Debug, Clone)]
enum Scripted {
    Value(u64),
    Failure(String),
    Panic,
}

/// Mock upstream that replays scripted responses and counts invocations
///
/// Responses are consumed in order. Once the script is exhausted every call
/// fails. Optionally each call waits for a fixed delay, or for a permit from
/// a gate the test releases explicitly.
///
/// # Example
///
/// ```rust,ignore
/// let upstream = ScriptedUpstream::new().with_delay(Duration::from_secs(1));
/// upstream.push_value(100);
/// upstream.push_failure("rpc down");
///
/// let read = cache.get(&key, ttl, upstream.fetcher()).await?;
/// assert_eq!(upstream.calls(), 1);
/// ```
#[derive(Clone)]
pub struct ScriptedUpstream {
    inner: Arc<Inner>,
}

struct Inner {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Scripted>>,
    delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedUpstream {
    /// Create an upstream with an empty script and no delay
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                calls: AtomicUsize::new(0),
                script: Mutex::new(VecDeque::new()),
                delay: Mutex::new(None),
                gate: Mutex::new(None),
            }),
        }
    }

    /// Make every call sleep for `delay` before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(Some(delay));
        self
    }

    /// Change the delay applied to calls made from now on
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    /// Make every call wait for [`ScriptedUpstream::release`] before answering
    pub fn gated(self) -> Self {
        *self.inner.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` waiting (or future) calls proceed
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.inner.gate.lock().unwrap().as_ref() {
            gate.add_permits(n);
        }
    }

    pub fn push_value(&self, value: u64) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(Scripted::Value(value));
    }

    pub fn push_failure(&self, message: &str) {
        self.inner
            .script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.to_string()));
    }

    pub fn push_panic(&self) {
        self.inner.script.lock().unwrap().push_back(Scripted::Panic);
    }

    /// Number of upstream calls made so far
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// A fetcher for [`ReadCache::get`] that answers from the script
    pub fn fetcher(&self) -> impl FnOnce() -> BoxFuture<'static, Result<u64, BoxError>> {
        let inner = Arc::clone(&self.inner);
        move || {
            async move {
                inner.calls.fetch_add(1, Ordering::SeqCst);

                let delay = *inner.delay.lock().unwrap();
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                let gate = inner.gate.lock().unwrap().clone();
                if let Some(gate) = gate {
                    gate.acquire().await.expect("gate closed").forget();
                }

                let next = inner.script.lock().unwrap().pop_front();
                match next {
                    Some(Scripted::Value(v)) => Ok(v),
                    Some(Scripted::Failure(message)) => Err(message.into()),
                    Some(Scripted::Panic) => panic!("scripted upstream panic"),
                    None => Err("script exhausted".into()),
                }
            }
            .boxed()
        }
    }
}

impl Default for ScriptedUpstream {
    fn default() -> Self {
        Self::new()
    }
}

pub fn key(s: &str) -> ReadKey {
    ReadKey::new(s).unwrap()
}

/// Poll until `done` holds, yielding to other tasks between checks
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}

/// Waits until `n` reads of `cache` have reached upstream or joined a fetch
pub async fn wait_for_waiters(cache: &ReadCache<u64>, n: u64) {
    wait_until(|| {
        let stats = cache.stats();
        stats.misses + stats.coalesced >= n
    })
    .await;
}
