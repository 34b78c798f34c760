//! The per-account JSON-RPC request id sequence.

/// Hands out JSON-RPC request ids: 1, 2, 3, …
///
/// One sequence per account. Every outbound hub call takes the next id
/// before it is sent, so a call that fails still consumes its id and
/// ids never repeat or go backwards.
///
/// Renewing a session does not reset the sequence.
#[derive(Debug, Clone)]
pub struct RequestIds {
    next: u64,
}

impl RequestIds {
    /// A fresh sequence starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Consumes and returns the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// How many ids have been handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}
