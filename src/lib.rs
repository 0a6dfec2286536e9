//! # stirling-rs: Generalized Stirling numbers in Rust
//!
//! **`stirling-rs`** computes the generalized Stirling numbers `S(n,k;α,β)`
//! and their shifted three-parameter form `S(n,k;α,β,r)`, defined by
//!
//! ```text
//! S(n, k) = S(n-1, k-1) + (α(n-1) + βk + r) S(n-1, k),    S(0, 0) = 1
//! ```
//!
//! with `S(n, k) = 0` for `k > n` and `S(n, 0) = r (r + α) ... (r + (n-1)α)`.
//! One family covers the classical ones: `(α, β) = (1, 0)` gives the unsigned
//! Stirling numbers of the first kind, `(0, 1)` the second kind and `(1, 1)`
//! the Lah numbers.
//!
//! ## Key Features
//!
//! - **Engine-Centric Architecture**: every request goes through an
//!   [`Engine`][crate::engine::Engine] that owns the parameters and the caches.
//! - **Several Strategies**: triangular, bottom-up, explicit, horizontal,
//!   vertical and near-diagonal (symmetric) evaluation, plus a closed form for
//!   `k = 1`, chosen automatically or on request.
//! - **Beyond `f64`**: results that overflow are recomputed in log space and
//!   returned as a [`Value::Log`][crate::numeric::Value::Log].
//! - **Two-Tier Cache**: an in-memory memo per engine and an optional on-disk
//!   cache shared between engines and processes.
//! - **Triangles and Fitting**: sequential and parallel generation of whole
//!   triangles, and least-squares estimation of `(α, β)` from observed
//!   Stirling measures.
//!
//! ## Basic Usage
//!
//! ```rust
//! use stirling_rs::config::EngineConfig;
//! use stirling_rs::engine::Engine;
//! use stirling_rs::types::{Method, Params};
//!
//! // 1. Create an engine for the Stirling numbers of the second kind
//! let engine = Engine::new(Params::second_kind(), EngineConfig::default());
//!
//! // 2. Compute single entries
//! assert_eq!(engine.compute(5, 3).unwrap(), 25.0);
//! assert_eq!(engine.compute(5, 0).unwrap(), 0.0);
//!
//! // 3. Force a strategy
//! let value = engine.compute_with(10, 4, Method::Vertical).unwrap();
//! assert_eq!(value, 34105.0);
//!
//! // 4. Generate a triangle
//! let table = engine.generate_triangle(6, false).unwrap();
//! assert_eq!(table.get(6, 2), Some(31.0));
//! ```
//!
//! ## Core Components
//!
//! - **[`engine`]**: the [`Engine`][crate::engine::Engine] and its cache flow.
//! - **[`recurrence`]**: the evaluation strategies.
//! - **[`selector`]**: automatic strategy choice.
//! - **[`cache`]**: memory and disk tiers.
//! - **[`triangle`]**: whole-triangle generation.
//! - **[`estimate`]**: parameter estimation.
//! - **[`bell`]** and **[`basis`]**: Bell polynomials and polynomial basis
//!   changes built on the triangle.

pub mod basis;
pub mod bell;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod exact;
pub mod numeric;
pub mod recurrence;
pub mod selector;
pub mod special;
pub mod triangle;
pub mod types;
