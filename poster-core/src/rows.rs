//! Row-wise raster fill, Rayon-parallel when the `parallel` feature is on.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `f(y, row)` for every `row_len`-byte row of `buf`.
///
/// Rows are independent; output is identical with or without `parallel`.
pub(crate) fn for_each_row<F>(buf: &mut [u8], row_len: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Send + Sync,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    buf.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}
