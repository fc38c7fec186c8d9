//! # spmd-lanes
//!
//! SPMD-style control flow on one SIMD register.
//!
//! Code is written as if for a single lane, with ordinary-looking `if`,
//! `if/else` and `for`, and runs on every lane of a vector at once. Lanes that
//! would have taken a different branch are not skipped; they are frozen by the
//! execution mask, which every write consults.
//!
//! ## Layers
//!
//! - [`backend`]: the SIMD primitives, one backend chosen at compile time.
//! - [`mask`]: [`LaneMask`], the execution mask.
//! - [`context`]: the per-thread current mask and [`MaskScope`].
//! - [`vector`]: [`VFloat`], [`VBool`], [`VInt`] and [`Varying`].
//! - [`memref`]: masked scatter/gather through per-lane offsets.
//! - [`control`]: [`spmd_if`], [`spmd_if_else`], [`spmd_foreach`].
//!
//! ## Example
//!
//! ```
//! use spmd_lanes::{spmd_foreach, spmd_if, VFloat};
//!
//! let input = [-1.0f32, 4.0, -9.0, 16.0, 25.0];
//! let mut output = [0.0f32; 5];
//! spmd_foreach(0, 5, |i| {
//!     let mut x = i.load_from(&input);
//!     spmd_if(x.lt(0.0), || x.assign(-x));
//!     i.at(&mut output).store(x.sqrt());
//! });
//! assert_eq!(output, [1.0, 2.0, 3.0, 4.0, 5.0]);
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod control;
pub mod kernels;
pub mod mask;
pub mod memref;
pub mod vector;

pub use context::{current_lanes, current_mask, MaskScope};
pub use control::{spmd_foreach, spmd_if, spmd_if_else};
pub use mask::{LaneBits, LaneMask, LANES};
pub use memref::{gather, scatter, MaskedRef};
pub use vector::{program_index, sqrt, MaskedAssign, VBool, VFloat, VInt, Varying, PROGRAM_COUNT};
