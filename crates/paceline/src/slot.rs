/// Sequence counter for one logical fetch target (the history range, or
/// the selected activity). Starting a request supersedes everything before
/// it; completions carrying an older sequence number are dropped so a slow
/// response can never overwrite newer state.
#[derive(Debug, Default)]
pub struct FetchSlot {
    seq: u64,
}

impl FetchSlot {
    /// Starts a new request and returns the sequence number its
    /// completions must carry.
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Whether a completion tagged `seq` belongs to the latest request.
    pub fn accepts(&self, seq: u64) -> bool {
        seq == self.seq
    }

    pub fn current(&self) -> u64 {
        self.seq
    }
}
