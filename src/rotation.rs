//! Circular rotation of prompts and status icons

use std::collections::VecDeque;

/// Items handed out front to back, wrapping around forever
#[derive(Debug, Clone)]
pub struct Rotation<T> {
    items: VecDeque<T>,
}

impl<T> Rotation<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Move the front item to the back and return it
    pub fn advance(&mut self) -> Option<&T> {
        let item = self.items.pop_front()?;
        self.items.push_back(item);
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
