//! Vector and group helpers shared by the protocols.

#![forbid(unsafe_code)]

use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, UniformRand, Zero};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{parallel, transcript::RoundX, G1Affine, F, G1};

/// Below this many terms an MSM runs as a single task.
const MSM_SPLIT: usize = 1 << 10;

/// Smallest power of two `>= n` (`1` for `n == 0`).
#[inline]
pub fn pow2_ub(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// `ceil(log2(n))`, i.e. the number of halving rounds for `n` items.
#[inline]
pub fn log2_ub(n: usize) -> usize {
    pow2_ub(n).trailing_zeros() as usize
}

/// `<a, b>`.
pub fn inner_product(a: &[F], b: &[F]) -> F {
    assert_eq!(a.len(), b.len(), "inner product of unequal lengths");
    a.iter().zip(b).fold(F::zero(), |acc, (x, y)| acc + *x * y)
}

/// Component-wise product `a ∘ b`.
pub fn hadamard(a: &[F], b: &[F]) -> Vec<F> {
    assert_eq!(a.len(), b.len(), "hadamard product of unequal lengths");
    a.iter().zip(b).map(|(x, y)| *x * y).collect()
}

/// `a·k + b·l`, element-wise.
pub fn combine(a: &[F], k: F, b: &[F], l: F) -> Vec<F> {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| *x * k + *y * l).collect()
}

/// `v·k`, element-wise.
pub fn scale(v: &[F], k: F) -> Vec<F> {
    v.iter().map(|x| *x * k).collect()
}

/// `n` uniformly random scalars.
pub fn random_vec<R: Rng>(rng: &mut R, n: usize) -> Vec<F> {
    (0..n).map(|_| F::rand(rng)).collect()
}

/// Independent RNG for a task that runs on another worker.
pub fn child_rng<R: Rng>(rng: &mut R) -> StdRng {
    StdRng::from_seed(rng.gen())
}

/// Multi-scalar multiplication `Σ scalars[i]·bases[i]`.
///
/// Long inputs are cut into one chunk per worker and the partial sums added.
pub fn msm(bases: &[G1Affine], scalars: &[F]) -> G1 {
    assert_eq!(bases.len(), scalars.len(), "msm length mismatch");
    let n = bases.len();
    if n == 0 {
        return G1::zero();
    }
    if n < MSM_SPLIT || parallel::in_worker() {
        return G1::msm_unchecked(bases, scalars);
    }
    let chunk = n.div_ceil(parallel::thread_count().max(1)).max(MSM_SPLIT / 2);
    let parts = n.div_ceil(chunk);
    parallel::map(parts, 1, |i| {
        let lo = i * chunk;
        let hi = (lo + chunk).min(n);
        G1::msm_unchecked(&bases[lo..hi], &scalars[lo..hi])
    })
    .into_iter()
    .sum()
}

/// MSM over projective bases (normalized first).
pub fn msm_proj(bases: &[G1], scalars: &[F]) -> G1 {
    msm(&G1::normalize_batch(bases), scalars)
}

/// Fold a generator vector in half: `out[i] = v[i]·lo + v[half + i]·hi`.
pub fn fold_bases(v: &[G1Affine], lo: F, hi: F) -> Vec<G1Affine> {
    let half = v.len() / 2;
    let folded = parallel::map(half, parallel::GROUP_GRAIN, |i| v[i] * lo + v[half + i] * hi);
    G1::normalize_batch(&folded)
}

/// Fold a scalar vector in half: `out[i] = v[i]·lo + v[half + i]·hi`.
pub fn fold_scalars(v: &[F], lo: F, hi: F) -> Vec<F> {
    let half = v.len() / 2;
    combine(&v[..half], lo, &v[half..], hi)
}

/// Per-index products of the round challenges used to collapse a folded
/// vector in one shot.
///
/// `s[i] = Π_j (bit(rounds - 1 - j) of i ? x_j : x_j⁻¹)`, so round 0 picks the
/// top bit. Returns `(s, s⁻¹)` truncated to `n` entries.
pub fn challenge_products(rounds: &[RoundX], n: usize) -> (Vec<F>, Vec<F>) {
    let k = rounds.len();
    assert!(n <= 1usize << k, "more entries than the rounds can address");
    let mut s = Vec::with_capacity(n);
    let mut s_inv = Vec::with_capacity(n);
    if n == 0 {
        return (s, s_inv);
    }
    s.push(rounds.iter().fold(F::ONE, |acc, r| acc * r.inv));
    s_inv.push(rounds.iter().fold(F::ONE, |acc, r| acc * r.x));
    for i in 1..n {
        let top = (usize::BITS - 1 - i.leading_zeros()) as usize;
        let round = &rounds[k - 1 - top];
        let rest = i ^ (1 << top);
        s.push(s[rest] * round.square);
        s_inv.push(s_inv[rest] * round.square_inv);
    }
    (s, s_inv)
}

/// Pad a scalar vector with zeros up to `len`.
pub fn pad_scalars(v: &mut Vec<F>, len: usize) {
    if v.len() < len {
        v.resize(len, F::zero());
    }
}

/// Pad a generator vector with the identity up to `len`.
pub fn pad_bases(v: &mut Vec<G1Affine>, len: usize) {
    if v.len() < len {
        v.resize(len, G1Affine::zero());
    }
}

/// `(x, x⁻¹, x², x⁻²)` for a known non-zero scalar.
pub fn round_of(x: F) -> Option<RoundX> {
    let inv = x.inverse()?;
    Some(RoundX {
        x,
        inv,
        square: x.square(),
        square_inv: inv.square(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::Group;

    #[test]
    fn log2_ub_rounds_up() {
        assert_eq!(log2_ub(1), 0);
        assert_eq!(log2_ub(2), 1);
        assert_eq!(log2_ub(5), 3);
        assert_eq!(log2_ub(8), 3);
        assert_eq!(pow2_ub(0), 1);
        assert_eq!(pow2_ub(9), 16);
    }

    #[test]
    fn inner_and_hadamard_products() {
        let a: Vec<F> = (1..=4u64).map(F::from).collect();
        let b: Vec<F> = (5..=8u64).map(F::from).collect();
        assert_eq!(inner_product(&a, &b), F::from(70u64));
        assert_eq!(hadamard(&a, &b)[3], F::from(32u64));
    }

    #[test]
    fn chunked_msm_matches_single_msm() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 3 * MSM_SPLIT + 5;
        let g = G1::generator();
        let bases: Vec<G1Affine> =
            G1::normalize_batch(&(0..n).map(|_| g * F::rand(&mut rng)).collect::<Vec<_>>());
        let scalars = random_vec(&mut rng, n);
        assert_eq!(msm(&bases, &scalars), G1::msm_unchecked(&bases, &scalars));
    }

    #[test]
    fn challenge_products_match_direct_definition() {
        let mut rng = StdRng::seed_from_u64(11);
        let rounds: Vec<RoundX> = (0..3)
            .map(|_| round_of(F::rand(&mut rng)).unwrap())
            .collect();
        let (s, s_inv) = challenge_products(&rounds, 8);
        for i in 0..8usize {
            let mut direct = F::ONE;
            for (j, r) in rounds.iter().enumerate() {
                let bit = (i >> (rounds.len() - 1 - j)) & 1 == 1;
                direct *= if bit { r.x } else { r.inv };
            }
            assert_eq!(s[i], direct);
            assert_eq!(s[i] * s_inv[i], F::ONE);
        }
    }

    #[test]
    fn folding_twice_equals_challenge_products() {
        // Folding a vector round by round lands on <v, s>.
        let mut rng = StdRng::seed_from_u64(3);
        let v = random_vec(&mut rng, 8);
        let rounds: Vec<RoundX> = (0..3)
            .map(|_| round_of(F::rand(&mut rng)).unwrap())
            .collect();
        let mut folded = v.clone();
        for r in &rounds {
            folded = fold_scalars(&folded, r.inv, r.x);
        }
        let (s, _) = challenge_products(&rounds, 8);
        assert_eq!(folded[0], inner_product(&v, &s));
    }
}
