#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many items the rayon pool is not worth spinning up.
#[cfg_attr(any(not(feature = "parallel"), target_arch = "wasm32"), allow(dead_code))]
const PARALLEL_THRESHOLD: usize = 1000;

// Helper for mutable iteration, parallel when the feature is on and the
// slice is large enough.
#[inline]
pub fn iterate_mut<T, F>(collection: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if collection.len() > PARALLEL_THRESHOLD {
            collection.par_iter_mut().for_each(f);
        } else {
            collection.iter_mut().for_each(f);
        }
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        collection.iter_mut().for_each(f);
    }
}

/// Maps every item to a result, preserving order.
#[inline]
pub fn map_collect<T, R, F>(collection: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        collection.par_iter().map(f).collect()
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        collection.iter().map(f).collect()
    }
}
