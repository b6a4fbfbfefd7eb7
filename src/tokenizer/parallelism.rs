// src/tokenizer/parallelism.rs

use rayon::prelude::*;
use rayon_cond::CondIterator;

/// Iterates a slice on the rayon pool when `parallel` is set and serially
/// otherwise, behind one iterator type.
pub trait MaybeParallelSlice<T: Sync> {
    fn maybe_par_iter(
        &self,
        parallel: bool,
    ) -> CondIterator<rayon::slice::Iter<'_, T>, std::slice::Iter<'_, T>>;
}

impl<T: Sync> MaybeParallelSlice<T> for [T] {
    fn maybe_par_iter(
        &self,
        parallel: bool,
    ) -> CondIterator<rayon::slice::Iter<'_, T>, std::slice::Iter<'_, T>> {
        if parallel {
            CondIterator::from_parallel(self.par_iter())
        } else {
            CondIterator::from_serial(self.iter())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_modes_agree() {
        let items: Vec<u64> = (1..=100).collect();
        let serial = items
            .maybe_par_iter(false)
            .map(|x| x * 2)
            .reduce(|| 0, |a, b| a + b);
        let parallel = items
            .maybe_par_iter(true)
            .map(|x| x * 2)
            .reduce(|| 0, |a, b| a + b);
        assert_eq!(serial, parallel);
        assert_eq!(serial, 10_100);
    }
}
