//! Row-parallel helpers. With the `parallel` feature rows are distributed
//! over the rayon pool; without it they run in order. Results are identical
//! either way because every row is written independently.
use super::ImageF32;

/// Fill every row of `img` with `f(y, row)`.
pub fn for_each_row_mut<F>(img: &mut ImageF32, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    if img.is_empty() {
        return;
    }
    let w = img.w;
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        img.data
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        img.data
            .chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

/// Map `0..n` through `f`, in parallel when enabled, preserving order.
pub fn map_indices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}
