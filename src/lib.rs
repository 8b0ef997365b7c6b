//! Shape-polymorphic SIMD lane vectors.
//!
//! A [`Vector`] holds a fixed number of lanes of one primitive type, chosen
//! by its [`Species`] (lane type plus [`VectorShape`]). Lanewise operators,
//! comparisons, reductions, shuffles, conversions, loads and stores are all
//! defined by a portable scalar engine; hardware [`backend`]s may take over
//! individual operations and must produce the same lanes.
//!
//! ```
//! use lanewise::{operators::Binary, Species};
//!
//! let species = Species::<i32>::S_128;
//! let a = species.from_values(&[1, 2, 3, 4]).unwrap();
//! let b = species.broadcast(10);
//! let sum = a.lanewise(Binary::Add, &b).unwrap();
//! assert_eq!(sum.to_array(), vec![11, 12, 13, 14]);
//! ```

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod lane;
pub mod mask;
pub mod memory;
pub mod operators;
pub mod shape;
pub mod shuffle;
pub mod slice;
pub mod species;
pub mod vector;

pub use error::{LanewiseError, Result};
pub use lane::{Lane, LaneType};
pub use mask::Mask;
pub use memory::{ByteBuffer, ByteOrder};
pub use shape::VectorShape;
pub use shuffle::Shuffle;
pub use species::Species;
pub use vector::Vector;

/// Elements handed to one rayon task by the `par_*` slice helpers.
pub const PARALLEL_CHUNK_SIZE: usize = 16 * 1024;

/// Slices up to this length are processed on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;
