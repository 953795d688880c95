//! Seed-deterministic random streams with side-effect-free forking.
//!
//! Every stream seed is derived from the user seed and a domain tag, so a
//! fork never draws from the parent stream. Forks of the same domain are
//! numbered, which keeps repeated forks distinct while two sources built
//! from the same seed still hand out identical fork sequences.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;

/// Stream type handed to story events and carried by queued commands.
pub type ForkedRng = CountingRng<ChaCha20Rng>;

/// Host-wide random source: one parent stream plus numbered forks per domain.
#[derive(Debug)]
pub struct RngSource {
    seed: u64,
    parent: RefCell<ForkedRng>,
    forks: RefCell<BTreeMap<String, u64>>,
}

impl RngSource {
    /// Construct the source from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            parent: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"parent"))),
            forks: RefCell::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Access the parent stream used by the host for its own draws.
    #[must_use]
    pub fn parent(&self) -> RefMut<'_, ForkedRng> {
        self.parent.borrow_mut()
    }

    /// Derive an independent stream for `domain` without touching the parent.
    #[must_use]
    pub fn fork(&self, domain: &str) -> ForkedRng {
        let index = {
            let mut forks = self.forks.borrow_mut();
            let counter = forks.entry(domain.to_string()).or_insert(0);
            let index = *counter;
            *counter = counter.saturating_add(1);
            index
        };
        let tag = format!("fork/{domain}/{index}");
        CountingRng::new(derive_stream_seed(self.seed, tag.as_bytes()))
    }

    /// Number of forks already handed out for `domain`.
    #[must_use]
    pub fn forks_taken(&self, domain: &str) -> u64 {
        self.forks.borrow().get(domain).copied().unwrap_or(0)
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        // HMAC accepts keys of any length.
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
