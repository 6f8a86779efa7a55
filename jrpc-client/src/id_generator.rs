//! Id generation for outgoing calls
//!
//! The client asks its generator for an id whenever a call without one is
//! about to be sent. The default is [`SequenceIdGenerator`]: integers counting
//! up from 1, wrapping back to 1 once `i32::MAX` has been handed out so that
//! ids stay small on the wire. Ids from before the wrap are long settled by the
//! time the counter comes back around.

use jrpc_core::IdValue;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared id source used by a client
pub type IdGenerator = Arc<dyn Fn() -> IdValue + Send + Sync>;

const MAX_SEQUENCE_ID: i64 = i32::MAX as i64;

/// Mutex-guarded integer sequence
///
/// Concurrent callers never receive the same id.
///
/// ```rust
/// use jrpc_client::SequenceIdGenerator;
/// use jrpc_core::IdValue;
///
/// let ids = SequenceIdGenerator::new();
/// assert_eq!(ids.next_id(), IdValue::from_integer(1));
/// assert_eq!(ids.next_id(), IdValue::from_integer(2));
/// ```
#[derive(Debug, Default)]
pub struct SequenceIdGenerator {
    last: Mutex<i64>,
}

impl SequenceIdGenerator {
    /// Sequence whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence that continues after `last`
    ///
    /// Starting after `i32::MAX` (or beyond) makes the next id 1.
    pub fn starting_after(last: i64) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    /// Hand out the next id
    pub fn next_id(&self) -> IdValue {
        // The counter is a plain integer; a panic elsewhere cannot leave it torn.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last = if *last >= MAX_SEQUENCE_ID || *last < 0 {
            1
        } else {
            *last + 1
        };
        IdValue::Number(*last)
    }

    /// Turn the sequence into a client id source
    pub fn into_generator(self) -> IdGenerator {
        let sequence = Arc::new(self);
        Arc::new(move || sequence.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_sequential_ids() {
        let ids = SequenceIdGenerator::new();
        for expected in 1..=5 {
            assert_eq!(ids.next_id(), IdValue::from_integer(expected));
        }
    }

    #[test]
    fn test_wraps_after_i32_max() {
        let ids = SequenceIdGenerator::starting_after(MAX_SEQUENCE_ID - 1);
        assert_eq!(ids.next_id(), IdValue::from_integer(i32::MAX));
        assert_eq!(ids.next_id(), IdValue::from_integer(1));
        assert_eq!(ids.next_id(), IdValue::from_integer(2));
    }

    #[test]
    fn test_primed_at_max_wraps_to_one() {
        let ids = SequenceIdGenerator::starting_after(MAX_SEQUENCE_ID);
        assert_eq!(ids.next_id(), IdValue::from_integer(1));
    }

    #[test]
    fn test_concurrent_ids_are_distinct() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let generate = SequenceIdGenerator::new().into_generator();
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let generate = generate.clone();
                thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| generate().correlation_key())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(seen.insert(key.unwrap()), "duplicate id handed out");
            }
        }
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }
}
