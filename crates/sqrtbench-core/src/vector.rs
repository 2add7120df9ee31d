//! The fixed test vector and its validation.

use serde::Serialize;

/// Number of samples in the test vector.
pub const SAMPLE_COUNT: usize = 200;

/// One input and the root computed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sample {
    /// Value handed to the engine.
    pub input: u32,
    /// Root the engine returned.
    pub root: u32,
}

/// A root that differs from the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Position in the vector, which is also the expected root.
    pub index: usize,
    /// Root the engine should have returned.
    pub expected: u32,
    /// Root the engine returned.
    pub actual: u32,
}

/// Ordered, fixed-capacity sequence of samples whose inputs are `0², 1², …, 199²`.
///
/// Position carries meaning: sample `j` must end up with root `j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    samples: [Sample; SAMPLE_COUNT],
}

impl Default for TestVector {
    fn default() -> Self {
        Self {
            samples: [Sample::default(); SAMPLE_COUNT],
        }
    }
}

/// Expected root at position `index`.
#[inline]
fn expected_root(index: usize) -> u32 {
    // SAMPLE_COUNT is far below u32::MAX.
    index as u32
}

impl TestVector {
    /// Vector with inputs filled in and roots cleared.
    #[must_use]
    pub fn perfect_squares() -> Self {
        let mut vector = Self::default();
        vector.fill_perfect_squares();
        vector
    }

    /// Overwrite every input with `j * j` and clear the roots.
    pub fn fill_perfect_squares(&mut self) {
        for (j, sample) in self.samples.iter_mut().enumerate() {
            let j = expected_root(j);
            *sample = Sample {
                input: j * j,
                root: 0,
            };
        }
    }

    /// All samples in order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Mutable access for the measurement loop.
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Inputs in order.
    pub fn inputs(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().map(|s| s.input)
    }

    /// Positions whose root differs from the position itself.
    #[must_use]
    pub fn validate(&self) -> Vec<Mismatch> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(index, sample)| {
                let expected = expected_root(index);
                (sample.root != expected).then_some(Mismatch {
                    index,
                    expected,
                    actual: sample.root,
                })
            })
            .collect()
    }

    /// Sum of all computed roots.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        self.samples.iter().map(|s| u64::from(s.root)).sum()
    }
}
