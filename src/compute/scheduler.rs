//! Work distribution for batch evaluation: claim/complete coordination.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Cursor sentinel: the queue is stopped (poisoned or not yet armed).
const STOPPED: usize = 0;

#[derive(Debug)]
struct QueueState {
    /// Forward-scan cursor: 0 = stopped, 1..=len = scanning position,
    /// > len = scan exhausted (draining phase).
    cursor: usize,
    /// Per-candidate flag: still needs evaluation. Candidates whose fitness
    /// slot was filled before the batch started are skipped by the scan.
    needs_eval: Vec<bool>,
    /// Busy flag per worker slot.
    busy: Vec<bool>,
    /// FIFO backlog of candidate indices to hand out before declaring
    /// the batch drained.
    retry: VecDeque<usize>,
}

impl QueueState {
    fn any_busy(&self) -> bool {
        self.busy.iter().any(|&b| b)
    }
}

/// Shared scheduler state for one evaluation batch.
///
/// Each worker task calls [`claim`] to atomically obtain the next candidate
/// index and [`finished`] once the result is handed over. The forward scan
/// hands out unevaluated candidates in order; once it is exhausted the retry
/// backlog drains first, and a worker that finds both empty blocks while any
/// other worker is busy — that worker may still push a backlog entry. Every
/// completion wakes all waiters, and a woken worker rechecks the backlog
/// before concluding there is no work left.
///
/// [`abort`] poisons the queue: no further forward-scan indices are issued
/// (the backlog may still drain) until the next [`reset`].
///
/// [`claim`]: EvaluationQueue::claim
/// [`finished`]: EvaluationQueue::finished
/// [`abort`]: EvaluationQueue::abort
/// [`reset`]: EvaluationQueue::reset
#[derive(Debug)]
pub struct EvaluationQueue {
    state: Mutex<QueueState>,
    wake: Condvar,
}

impl EvaluationQueue {
    /// Create a queue for a fixed number of worker slots.
    ///
    /// The queue starts stopped; [`reset`] arms it for a batch.
    ///
    /// [`reset`]: EvaluationQueue::reset
    pub fn new(num_workers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                cursor: STOPPED,
                needs_eval: Vec::new(),
                busy: vec![false; num_workers],
                retry: VecDeque::new(),
            }),
            wake: Condvar::new(),
        }
    }

    /// Number of worker slots the queue coordinates.
    pub fn num_workers(&self) -> usize {
        self.state.lock().unwrap().busy.len()
    }

    /// Arm the queue for a new batch.
    ///
    /// `needs_eval` holds one flag per candidate; filled slots are skipped by
    /// the forward scan. Must only be called when no worker task from a
    /// previous batch is still running.
    pub fn reset(&self, needs_eval: Vec<bool>) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(!state.any_busy(), "reset with a worker still busy");
        state.cursor = 1;
        state.needs_eval = needs_eval;
        state.busy.iter_mut().for_each(|b| *b = false);
        state.retry.clear();
    }

    /// Poison the queue: no new forward-scan indices until the next reset.
    ///
    /// One-directional; wakes every blocked worker so it can re-decide.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap();
        state.cursor = STOPPED;
        self.wake.notify_all();
    }

    /// True once the queue has been poisoned (or not yet armed).
    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap().cursor == STOPPED
    }

    /// Enqueue a candidate index for another worker to pick up.
    ///
    /// Backlog entries are handed out FIFO, ahead of the no-work decision and
    /// even after the queue was poisoned.
    pub fn push_retry(&self, index: usize) {
        let mut state = self.state.lock().unwrap();
        state.retry.push_back(index);
        self.wake.notify_all();
    }

    /// Claim the next candidate index for `worker`, or `None` when the batch
    /// is drained.
    ///
    /// A successful claim marks the worker busy. With the scan exhausted and
    /// the backlog empty this blocks while any other worker is busy; `None`
    /// is returned only when the backlog is empty and no worker is busy, or
    /// the queue is poisoned.
    pub fn claim(&self, worker: usize) -> Option<usize> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.cursor != STOPPED {
                while state.cursor <= state.needs_eval.len() {
                    let index = state.cursor - 1;
                    state.cursor += 1;
                    if state.needs_eval[index] {
                        state.busy[worker] = true;
                        return Some(index);
                    }
                }
            }
            if let Some(index) = state.retry.pop_front() {
                state.busy[worker] = true;
                return Some(index);
            }
            if state.cursor == STOPPED || !state.any_busy() {
                return None;
            }
            state = self.wake.wait(state).unwrap();
        }
    }

    /// Mark `worker` idle again and wake every waiter.
    ///
    /// Broadcast rather than single wake-up: any waiter might now be
    /// unblocked by a backlog entry or by global termination.
    pub fn finished(&self, worker: usize) {
        let mut state = self.state.lock().unwrap();
        state.busy[worker] = false;
        self.wake.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn armed(len: usize, workers: usize) -> EvaluationQueue {
        let queue = EvaluationQueue::new(workers);
        queue.reset(vec![true; len]);
        queue
    }

    #[test]
    fn test_claims_in_order_then_drained() {
        let queue = armed(4, 2);
        for expected in 0..4 {
            let index = queue.claim(0).unwrap();
            assert_eq!(index, expected);
            queue.finished(0);
        }
        assert_eq!(queue.claim(0), None);
    }

    #[test]
    fn test_exactly_k_claims_across_workers() {
        let queue = armed(5, 2);
        let mut claims = Vec::new();
        loop {
            let worker = claims.len() % 2;
            match queue.claim(worker) {
                Some(index) => {
                    claims.push(index);
                    queue.finished(worker);
                }
                None => break,
            }
        }
        assert_eq!(claims, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.claim(0), None);
        assert_eq!(queue.claim(1), None);
    }

    #[test]
    fn test_prefilled_candidates_are_skipped() {
        let queue = EvaluationQueue::new(1);
        queue.reset(vec![true, false, true, false]);
        assert_eq!(queue.claim(0), Some(0));
        queue.finished(0);
        assert_eq!(queue.claim(0), Some(2));
        queue.finished(0);
        assert_eq!(queue.claim(0), None);
    }

    #[test]
    fn test_retry_backlog_drains_first_in_fifo_order() {
        let queue = armed(2, 1);
        assert_eq!(queue.claim(0), Some(0));
        queue.finished(0);
        assert_eq!(queue.claim(0), Some(1));
        queue.push_retry(1);
        queue.push_retry(0);
        queue.finished(0);
        // Scan exhausted: the backlog is handed out FIFO before "no work".
        assert_eq!(queue.claim(0), Some(1));
        queue.finished(0);
        assert_eq!(queue.claim(0), Some(0));
        queue.finished(0);
        assert_eq!(queue.claim(0), None);
    }

    #[test]
    fn test_abort_stops_forward_scan_but_drains_backlog() {
        let queue = armed(4, 2);
        assert_eq!(queue.claim(0), Some(0));
        queue.push_retry(0);
        queue.abort();
        assert!(queue.is_stopped());
        queue.finished(0);
        // No new forward-scan index; the in-flight retry entry still surfaces.
        assert_eq!(queue.claim(1), Some(0));
        queue.finished(1);
        assert_eq!(queue.claim(0), None);
        assert_eq!(queue.claim(1), None);
    }

    #[test]
    fn test_poisoned_queue_returns_no_work_even_while_busy() {
        let queue = armed(2, 2);
        assert_eq!(queue.claim(0), Some(0));
        // Worker 0 is still busy, but poisoning must not leave worker 1
        // blocked waiting on it.
        queue.abort();
        assert_eq!(queue.claim(1), None);
        queue.finished(0);
    }

    #[test]
    fn test_reset_rearms_after_abort() {
        let queue = armed(1, 1);
        queue.abort();
        assert_eq!(queue.claim(0), None);
        queue.reset(vec![true, true]);
        assert_eq!(queue.claim(0), Some(0));
        queue.finished(0);
        assert_eq!(queue.claim(0), Some(1));
        queue.finished(0);
        assert_eq!(queue.claim(0), None);
    }

    #[test]
    fn test_draining_blocks_while_sibling_is_busy() {
        let queue = armed(1, 2);
        assert_eq!(queue.claim(0), Some(0));

        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            scope.spawn(|| {
                // Scan exhausted and backlog empty, but worker 0 is busy:
                // this claim must block until worker 0 finishes.
                let claim = queue.claim(1);
                tx.send(claim).unwrap();
            });

            assert!(
                rx.recv_timeout(Duration::from_millis(50)).is_err(),
                "claim returned while a sibling was still busy"
            );
            queue.finished(0);
            let claim = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("claim did not wake after completion");
            assert_eq!(claim, None);
        });
    }

    #[test]
    fn test_waiter_picks_up_retry_pushed_by_busy_sibling() {
        let queue = armed(1, 2);
        assert_eq!(queue.claim(0), Some(0));

        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            scope.spawn(|| {
                let claim = queue.claim(1);
                tx.send(claim).unwrap();
            });

            assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
            // The busy worker re-queues its candidate before finishing; the
            // waiter must pick it up instead of seeing "no work".
            queue.push_retry(0);
            queue.finished(0);
            let claim = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("claim did not wake after completion");
            assert_eq!(claim, Some(0));
            queue.finished(1);
        });
        assert_eq!(queue.claim(0), None);
    }
}
