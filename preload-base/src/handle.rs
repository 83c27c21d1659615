/// Identifies one request of a batch to the IO layer. The value is the request's index in the
/// batch, so completions can be mapped back to a request without a lookup table.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Ord, PartialOrd)]
pub struct LoadHandle(pub u64);

impl LoadHandle {
    pub fn from_index(index: usize) -> Self {
        LoadHandle(index as u64)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Where a single request is in its lifetime. There is no failed state, a request that fails
/// simply never leaves `Requested`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoadState {
    // Dispatched to the IO layer, no result yet
    Requested,
    // A result has been stored for this request
    Loaded,
}
