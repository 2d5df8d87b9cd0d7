//! Momenta batch work helpers.
//!
//! [`execute_with_progress`] and [`starmap_with_progress`] apply a function
//! to every input, drawing a progress bar on a terminal. They run on the
//! calling thread unless given a [`rayon::ThreadPool`], whose lifecycle stays
//! with the caller.
//!
//! ```rust
//! use momenta_work::{build_pool, starmap_with_progress};
//!
//! let pool = build_pool(2).unwrap();
//! let mut sums = starmap_with_progress(|a: i32, b: i32| a + b, vec![(1, 2), (3, 4)], Some(&pool));
//! sums.sort_unstable();
//! assert_eq!(sums, vec![3, 7]);
//! ```

pub mod error;
pub mod progress;

pub use error::{WorkError, WorkResult};
pub use progress::{build_pool, execute_with_progress, starmap_with_progress};
