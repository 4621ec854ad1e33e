#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

pub fn map_collect<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if items.len() >= PARALLEL_THRESHOLD {
            return items.par_iter().map(&f).collect();
        }
    }

    items.iter().map(f).collect()
}
