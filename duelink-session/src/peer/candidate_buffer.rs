use duelink_core::IceCandidateInit;

/// Holds remotely received ICE candidates that arrive before the remote
/// session description exists. Candidates are unordered relative to
/// descriptions on the relay, so early arrivals are parked here and applied
/// in receipt order the moment the description lands; after that the buffer
/// is bypassed for good.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    pending: Vec<IceCandidateInit>,
    drained: bool,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a candidate, or report that the caller should apply it directly
    /// because the remote description is already in place.
    pub fn push(&mut self, candidate: IceCandidateInit) -> Option<IceCandidateInit> {
        if self.drained {
            return Some(candidate);
        }
        self.pending.push(candidate);
        None
    }

    /// FIFO drain, called exactly when the remote description is applied.
    pub fn drain(&mut self) -> Vec<IceCandidateInit> {
        self.drained = true;
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
