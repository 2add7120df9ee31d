//! Square-root engines.
//!
//! Both engines compute the floor square root of a 32-bit input. The benchmark
//! driver is generic over [`SquareRootEngine`] so either can be timed.

mod hardware;
mod software;

pub use hardware::HardwareSqrt;
pub use software::{integer_sqrt, SoftwareSqrt};

use std::sync::{Arc, Mutex, PoisonError};

/// A floor square root implementation.
pub trait SquareRootEngine {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Largest `r` with `r * r <= value`.
    fn compute(&mut self, value: u32) -> u32;
}

impl<E: SquareRootEngine + ?Sized> SquareRootEngine for &mut E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute(&mut self, value: u32) -> u32 {
        (**self).compute(value)
    }
}

impl<E: SquareRootEngine + ?Sized> SquareRootEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute(&mut self, value: u32) -> u32 {
        (**self).compute(value)
    }
}

/// An engine shared between threads, one call at a time.
///
/// Engines take `&mut self`, so a single owner can never overlap two calls. When a
/// caller needs the engine from several threads, this wrapper keeps that guarantee
/// at runtime: each `compute` holds the lock for the whole request, so a second
/// caller waits instead of interleaving with an outstanding coprocessor request.
#[derive(Debug)]
pub struct SharedEngine<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for SharedEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: SquareRootEngine> SharedEngine<E> {
    /// Wrap `engine` for shared use.
    pub fn new(engine: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }
}

impl<E: SquareRootEngine> SquareRootEngine for SharedEngine<E> {
    fn name(&self) -> &'static str {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .name()
    }

    fn compute(&mut self, value: u32) -> u32 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .compute(value)
    }
}

/// Inputs on which two engines disagree, as `(input, reference, candidate)`.
pub fn cross_check<R, C>(
    reference: &mut R,
    candidate: &mut C,
    inputs: impl IntoIterator<Item = u32>,
) -> Vec<(u32, u32, u32)>
where
    R: SquareRootEngine + ?Sized,
    C: SquareRootEngine + ?Sized,
{
    inputs
        .into_iter()
        .filter_map(|input| {
            let expected = reference.compute(input);
            let actual = candidate.compute(input);
            (expected != actual).then_some((input, expected, actual))
        })
        .collect()
}
