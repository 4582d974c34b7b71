//! Groth (2009) style zero-knowledge arguments for committed Hadamard
//! products.
//!
//! The layers stack bottom-up:
//!
//! - [`sec51`]: one row, `z = <x, y ∘ t>` for public `t`, in a linear
//!   ([`Sec51b`]) and a logarithmic ([`Sec51c`]) flavour;
//! - [`sec53`]: `m` rows batched into one by pairwise folding, finishing
//!   with a Sec51 argument;
//! - [`sec43`]: the full matrix relation `Z = X ∘ Y`, reduced to one Sec53
//!   and one Hyrax instance.
//!
//! A [`Policy`] picks the flavour of every sub-argument at compile time.

pub mod policy;
pub mod sec43;
pub mod sec51;
pub mod sec51b;
pub mod sec51c;
pub mod sec53;

pub use policy::{Ordinary, Policy, Sec43Proof, Succinct};
pub use sec51::Sec51Argument;
pub use sec51b::Sec51b;
pub use sec51c::Sec51c;
