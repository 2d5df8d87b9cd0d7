//! Built-in passes.

pub mod insertion_sort;

pub use insertion_sort::{InsertionSort, SortStats};
