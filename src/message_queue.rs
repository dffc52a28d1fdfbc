use std::{collections::VecDeque, time::{Duration, Instant}};

use parking_lot::{Condvar, Mutex};


/// A FIFO shared between threads. Producers never block; consumers choose
/// between polling and waiting.
#[derive(Debug)]
pub struct MessageQueue<T> {
    queue: Mutex<VecDeque<T>>,
    condvar: Condvar,
}

impl<T> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MessageQueue<T> {
    pub fn new() -> Self {
        Self { queue: Mutex::new(VecDeque::new()), condvar: Condvar::new() }
    }

    pub fn push(&self, value: T) {
        self.queue.lock().push_back(value);
        self.condvar.notify_one();
    }

    pub fn try_pop(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }

    /// Block until a value is available
    pub fn wait_pop(&self) -> T {
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return value;
            }
            self.condvar.wait(&mut queue);
        }
    }

    /// Block until a value is available or `timeout` has passed
    pub fn wait_pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return Some(value);
            }
            // Spurious wakeups loop back around until the deadline
            if self.condvar.wait_until(&mut queue, deadline).timed_out() {
                return queue.pop_front();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
