//! Logarithmic inner-product arguments
//!
//! - [`p2`]: knowledge of `a, b` with `P = <a, g> + <b, h> + <a, b>·u`.
//! - [`p1`]: same with the inner product `c` made public.
//! - [`p31`]: zero-knowledge wrapper over hidden `P` and `Q = c·u + β·H`.
//!
//! Each round halves the witness, so a proof for length `n` carries
//! `ceil(log2 n)` pairs `(L, R)` plus two scalars.

pub mod p1;
pub mod p2;
pub mod p31;
