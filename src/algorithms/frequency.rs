use crate::compressor::HuffmanError;

if_tracing! {
    use tracing::debug;
}

/// Occurrence count of every byte value in an input buffer.
///
/// Symbols with a zero count are not part of the active alphabet and are skipped by
/// [`iter`](FrequencyTable::iter).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Table with no symbols.
    pub const fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Counts every byte of `data`.
    pub fn count(data: &[u8]) -> Self {
        let mut table = Self::new();
        for &byte in data {
            table.counts[byte as usize] += 1;
        }

        if_tracing! {
            debug!(target: "frequency", input_len = data.len(), alphabet_len = table.alphabet_len(), "frequencies counted");
        }

        table
    }

    /// Builds a table from explicit `(symbol, count)` pairs. Later pairs for the same
    /// symbol add to earlier ones.
    ///
    /// # Errors
    ///
    /// [`HuffmanError::FrequencyOverflow`] if the counts of one symbol, or of all symbols
    /// together, do not fit in a `u64`.
    pub fn from_counts<I>(counts: I) -> Result<Self, HuffmanError>
    where
        I: IntoIterator<Item = (u8, u64)>,
    {
        let mut table = Self::new();
        let mut total: u64 = 0;
        for (symbol, count) in counts {
            let slot = &mut table.counts[symbol as usize];
            *slot = slot
                .checked_add(count)
                .ok_or(HuffmanError::FrequencyOverflow { symbol })?;
            total = total
                .checked_add(count)
                .ok_or(HuffmanError::FrequencyOverflow { symbol })?;
        }
        Ok(table)
    }

    pub const fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Non-zero entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Number of distinct symbols with a non-zero count.
    pub fn alphabet_len(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Sum of all counts, which equals the length of the counted input.
    pub fn total(&self) -> u64 {
        // every constructor keeps the sum within u64
        self.counts.iter().fold(0, |total, &count| total.saturating_add(count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
