//! Automatic choice of an evaluation strategy.
//!
//! The heuristic looks only at the shape of `(n, k)`:
//!
//! ```text
//! n = 0, k = 0 or k >= n   closed-form base case (no strategy)
//! k = 1 (unshifted)        SingleList
//! n > 100 or k > 50        BottomUp     (no deep memo chains)
//! n - k < 5 and n < 30     Symmetric    (few factors per term)
//! k < 3 or n < 20          Triangular   (memo pays off)
//! otherwise                BottomUp
//! ```
//!
//! An explicit method passed to [`Engine::compute_with`] always wins over
//! the heuristic.
//!
//! [`Engine::compute_with`]: crate::engine::Engine::compute_with

use crate::types::{Method, Params};

/// Whether `(n, k)` is answered by a closed form without any strategy.
pub fn is_base_case(n: u64, k: u64) -> bool {
    n == 0 || k == 0 || k >= n
}

/// Picks a strategy for a non-base `(n, k)`.
pub fn select_method(n: u64, k: u64, params: &Params) -> Method {
    if k == 1 && params.is_unshifted() {
        Method::SingleList
    } else if n > 100 || k > 50 {
        Method::BottomUp
    } else if n.saturating_sub(k) < 5 && n < 30 {
        Method::Symmetric
    } else if k < 3 || n < 20 {
        Method::Triangular
    } else {
        Method::BottomUp
    }
}
