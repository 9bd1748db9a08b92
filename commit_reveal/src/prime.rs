use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::thread_rng;

use crate::CodecError;

/// Number of bits in the `random` nonce bound into every commit hash
/// (spec §4.5). Matches the original's `crypto/rand.Prime(rand.Reader, 130)`.
const PRIME_BITS: u64 = 130;

/// Miller-Rabin rounds. 40 gives a false-positive probability below 2^-80,
/// comfortably beyond what matters for a nonce (as opposed to a
/// cryptographic key).
const MILLER_RABIN_ROUNDS: u32 = 40;

/// Upper bound on generation attempts before giving up. The original
/// retries unboundedly via tail recursion (`getRandom`); spec §9's
/// "Recursive retry loops" note asks for a bounded iterative loop instead.
const MAX_ATTEMPTS: u32 = 10_000;

/// Generate a cryptographically random, exactly-130-bit prime.
///
/// Retries candidate generation until one passes a probabilistic
/// primality test, up to `MAX_ATTEMPTS` times.
pub fn random_prime_130() -> Result<BigUint, CodecError> {
    let mut rng = thread_rng();
    for _ in 0..MAX_ATTEMPTS {
        let mut candidate = rng.gen_biguint(PRIME_BITS);
        // Force the top bit so the value is exactly PRIME_BITS bits wide,
        // and the low bit so it is odd.
        candidate.set_bit(PRIME_BITS - 1, true);
        candidate.set_bit(0, true);
        if is_probably_prime(&candidate) {
            return Ok(candidate);
        }
    }
    Err(CodecError::PrimeGenerationFailed)
}

fn is_probably_prime(n: &BigUint) -> bool {
    let zero = BigUint::zero();
    let one = BigUint::one();
    let two = &one + &one;

    let three = &two + &one;
    if n < &two {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if (n % &two) == zero {
        return false;
    }

    // n - 1 = 2^r * d, d odd
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut r: u64 = 0;
    while (&d % &two) == zero {
        d /= &two;
        r += 1;
    }

    let mut rng = thread_rng();
    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_biguint_range(&two, &(n - &two));
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_prime_is_exactly_130_bits() {
        let p = random_prime_130().expect("generation should succeed");
        assert_eq!(p.bits(), 130);
    }

    #[test]
    fn generated_prime_is_odd() {
        let p = random_prime_130().expect("generation should succeed");
        assert!(&p % 2u32 == BigUint::one());
    }

    #[test]
    fn small_known_primes_pass() {
        for p in [2u32, 3, 5, 7, 11, 101, 7919] {
            assert!(is_probably_prime(&BigUint::from(p)), "{p} should be prime");
        }
    }

    #[test]
    fn small_known_composites_fail() {
        for c in [1u32, 4, 6, 9, 15, 100, 7921] {
            assert!(!is_probably_prime(&BigUint::from(c)), "{c} should be composite");
        }
    }
}
