//! Event bus between the session store and the UI.
//!
//! Single-threaded (WASM constraint): the queue lives in an `Rc<RefCell<_>>`
//! shared by every clone. The store emits, the UI drains once per frame.
//! Browsers stop painting hidden tabs, so the queue is bounded and the oldest
//! events are discarded once it is full.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use chat_types::event::ChatEvent;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<ChatEvent>>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn emit(&self, event: ChatEvent) {
        let mut queue = self.queue.borrow_mut();
        if queue.len() == self.capacity {
            if let Some(dropped) = queue.pop_front() {
                log::debug!("event queue full, dropping {:?}", dropped);
            }
        }
        queue.push_back(event);
    }

    /// Take every pending event in emission order.
    pub fn drain(&self) -> Vec<ChatEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
