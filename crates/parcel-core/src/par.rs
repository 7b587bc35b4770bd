//! Region-level parallelism switch.
//!
//! The driver calls `into_par_iter()` on its region list either way. With
//! `threading` that is rayon; without it every region runs on the calling
//! thread in ascending id order.

#[cfg(feature = "threading")]
pub(crate) use rayon::prelude::*;

#[cfg(not(feature = "threading"))]
pub(crate) use serial::IntoParallelIterator;

#[cfg(not(feature = "threading"))]
mod serial {
    /// Single-threaded `into_par_iter`: hands back the plain iterator, so
    /// `map`/`collect` in the driver resolve to `Iterator`.
    pub trait IntoParallelIterator: IntoIterator + Sized {
        fn into_par_iter(self) -> Self::IntoIter {
            self.into_iter()
        }
    }

    impl<I: IntoIterator> IntoParallelIterator for I {}
}
