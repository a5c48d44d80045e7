//! Partitioning of a total record count into load batches.

/// One bounded slice of the workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpec {
    /// Number of records in this batch
    pub size: u64,
    /// Zero-based position of the batch in the run
    pub index: u64,
}

/// Partition `total` records into batches of `batch_size`.
///
/// Yields `total / batch_size` full batches followed by one batch holding the
/// remainder, if any. A `total` of zero yields nothing, and so does a
/// `batch_size` of zero (callers validate it beforehand).
pub fn generate_batches(total: u64, batch_size: u64) -> Batches {
    Batches {
        total,
        batch_size,
        emitted: 0,
        index: 0,
    }
}

/// Iterator returned by [`generate_batches`].
#[derive(Debug, Clone)]
pub struct Batches {
    total: u64,
    batch_size: u64,
    emitted: u64,
    index: u64,
}

impl Iterator for Batches {
    type Item = BatchSpec;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_size == 0 || self.emitted >= self.total {
            return None;
        }

        let size = self.batch_size.min(self.total - self.emitted);
        let batch = BatchSpec {
            size,
            index: self.index,
        };
        self.emitted += size;
        self.index += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.batch_size == 0 {
            return (0, Some(0));
        }
        let remaining = (self.total - self.emitted).div_ceil(self.batch_size) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches {}
