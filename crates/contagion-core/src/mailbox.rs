//! Double-buffered per-vertex mailboxes.
//!
//! Each vertex position owns two buffers: the inbox being read during the
//! current superstep and the pending buffer filling up for the next one.
//! [`Mailboxes::deliver`] swaps them at the barrier, so a message posted in
//! superstep `t` becomes readable in superstep `t + 1` and is gone after it.

use contagion_types::Message;

/// Inbox/pending buffers for every vertex, indexed by position in id order.
#[derive(Debug, Clone)]
pub struct Mailboxes<P> {
    /// Messages readable in the current superstep.
    inboxes: Vec<Vec<Message<P>>>,
    /// Messages posted during the current superstep.
    pending: Vec<Vec<Message<P>>>,
}

impl<P> Mailboxes<P> {
    /// Create empty mailboxes for `len` vertices.
    pub fn new(len: usize) -> Self {
        Self {
            inboxes: std::iter::repeat_with(Vec::new).take(len).collect(),
            pending: std::iter::repeat_with(Vec::new).take(len).collect(),
        }
    }

    /// Messages readable by the vertex at `position` this superstep.
    pub fn inbox(&self, position: usize) -> &[Message<P>] {
        self.inboxes
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Queue a message for delivery to `position` at the next barrier.
    ///
    /// Returns `false` if the position is out of range.
    pub fn post(&mut self, position: usize, message: Message<P>) -> bool {
        match self.pending.get_mut(position) {
            Some(buffer) => {
                buffer.push(message);
                true
            }
            None => false,
        }
    }

    /// Number of messages queued for the next superstep.
    pub fn pending_len(&self) -> usize {
        self.pending.iter().map(Vec::len).sum()
    }

    /// Barrier: pending messages become the new inboxes and the previous
    /// inboxes are emptied. Returns the number of messages now readable.
    pub fn deliver(&mut self) -> usize {
        std::mem::swap(&mut self.inboxes, &mut self.pending);
        for buffer in &mut self.pending {
            buffer.clear();
        }
        self.inboxes.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use contagion_types::VertexId;

    use super::*;

    fn message(source: u64, payload: &'static str) -> Message<&'static str> {
        Message {
            source: VertexId(source),
            weight: 1.0,
            payload,
        }
    }

    #[test]
    fn posted_messages_are_invisible_until_delivery() {
        let mut boxes = Mailboxes::new(2);
        assert!(boxes.post(1, message(0, "hello")));
        assert!(boxes.inbox(1).is_empty());
        assert_eq!(boxes.pending_len(), 1);

        assert_eq!(boxes.deliver(), 1);
        assert_eq!(boxes.inbox(1).len(), 1);
        assert_eq!(boxes.inbox(1).first().map(|m| m.payload), Some("hello"));
        assert_eq!(boxes.pending_len(), 0);
    }

    #[test]
    fn delivered_messages_last_exactly_one_superstep() {
        let mut boxes = Mailboxes::new(1);
        boxes.post(0, message(0, "once"));
        boxes.deliver();
        assert_eq!(boxes.inbox(0).len(), 1);
        assert_eq!(boxes.deliver(), 0);
        assert!(boxes.inbox(0).is_empty());
    }

    #[test]
    fn out_of_range_positions_are_harmless() {
        let mut boxes: Mailboxes<&str> = Mailboxes::new(1);
        assert!(!boxes.post(3, message(0, "lost")));
        assert!(boxes.inbox(3).is_empty());
    }
}
