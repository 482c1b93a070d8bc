//! Bookkeeping of instances being created by different threads. A thread about to wait for an
//! instance created elsewhere first follows the chain of waiting threads - if it leads back to
//! itself, waiting would never end and the requests form a dependency cycle.

use crate::descriptor::DescriptorPtr;
use fxhash::FxHashMap;
use std::sync::Arc;
use std::thread::ThreadId;

#[inline]
fn key(descriptor: &DescriptorPtr) -> usize {
    Arc::as_ptr(descriptor) as usize
}

#[derive(Debug)]
struct Waiter {
    target: DescriptorPtr,
    // descriptors under construction by the waiting thread, outermost first
    chain: Vec<DescriptorPtr>,
}

/// Threads creating instances and threads waiting for them.
#[derive(Debug, Default)]
pub(crate) struct Constructions {
    builders: FxHashMap<usize, ThreadId>,
    waiting: FxHashMap<ThreadId, Waiter>,
}

impl Constructions {
    pub(crate) fn builder(&self, descriptor: &DescriptorPtr) -> Option<ThreadId> {
        self.builders.get(&key(descriptor)).copied()
    }

    pub(crate) fn start(&mut self, descriptor: &DescriptorPtr, thread: ThreadId) {
        self.builders.insert(key(descriptor), thread);
    }

    pub(crate) fn finish(&mut self, descriptor: &DescriptorPtr) {
        self.builders.remove(&key(descriptor));
    }

    pub(crate) fn wait_for(
        &mut self,
        thread: ThreadId,
        target: &DescriptorPtr,
        chain: Vec<DescriptorPtr>,
    ) {
        self.waiting.insert(
            thread,
            Waiter {
                target: target.clone(),
                chain,
            },
        );
    }

    pub(crate) fn stop_waiting(&mut self, thread: ThreadId) {
        self.waiting.remove(&thread);
    }

    /// Returns the dependency cycle which waiting for `requested` would close, given the chain of
    /// descriptors the current thread is creating.
    pub(crate) fn find_cycle(
        &self,
        current: ThreadId,
        requested: &DescriptorPtr,
        chain: &[DescriptorPtr],
    ) -> Option<Vec<DescriptorPtr>> {
        let mut path = vec![requested.clone()];
        let mut thread = self.builder(requested)?;

        // every step visits a different waiting thread
        for _ in 0..=self.waiting.len() {
            if thread == current {
                return Some(close_cycle(path, chain));
            }

            let waiter = self.waiting.get(&thread)?;
            let position = path.last().and_then(|owned| {
                waiter
                    .chain
                    .iter()
                    .position(|descriptor| Arc::ptr_eq(descriptor, owned))
            });

            if let Some(position) = position {
                path.extend(waiter.chain[position + 1..].iter().cloned());
            }

            path.push(waiter.target.clone());
            thread = self.builder(&waiter.target)?;
        }

        None
    }
}

// the last descriptor in the path is created by the current thread
fn close_cycle(path: Vec<DescriptorPtr>, chain: &[DescriptorPtr]) -> Vec<DescriptorPtr> {
    let last = path.last().cloned();
    let start = last.as_ref().and_then(|last| {
        chain
            .iter()
            .position(|descriptor| Arc::ptr_eq(descriptor, last))
    });

    match start {
        Some(start) => chain[start..].iter().cloned().chain(path).collect(),
        None => last.into_iter().chain(path).collect(),
    }
}
