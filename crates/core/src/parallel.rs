#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

/// Below this many items the rayon fan-out costs more than it saves.
#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

/// Overwrites every slot with `f(index)`.
///
/// Each call writes only its own slot, so the closure may freely read shared
/// state as long as that state is not mutated for the duration of the call.
pub fn fill_indexed<T, F>(slice: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if slice.len() >= PARALLEL_THRESHOLD {
            slice
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, value)| *value = f(idx));
            return;
        }
    }

    for (idx, value) in slice.iter_mut().enumerate() {
        *value = f(idx);
    }
}
