use rand::Rng;
use std::{collections::HashSet, hash::Hash, time::Duration};

pub(crate) trait Rand: Sized {
    fn rand<R: Rng>(r: &mut R) -> Self;
}

impl Rand for i64 {
    fn rand<R: Rng>(r: &mut R) -> Self {
        r.gen()
    }
}

pub(crate) fn random<T: Rand>() -> T {
    let mut rng = rand::thread_rng();
    T::rand(&mut rng)
}

// len distinct random values
pub(crate) fn randvec<T>(len: usize) -> Vec<T>
where
    T: Eq + Hash + Clone + Rand,
{
    let mut seen: HashSet<T> = HashSet::with_capacity(len);
    let mut v = Vec::with_capacity(len);
    while v.len() < len {
        let x: T = random();
        if seen.insert(x.clone()) {
            v.push(x)
        }
    }
    v
}

pub(crate) fn to_ns(t: Duration) -> u64 {
    t.as_secs() * 1000000000 + (t.subsec_nanos() as u64)
}

pub(crate) fn to_ns_per(t: Duration, n: usize) -> f64 {
    (to_ns(t) as f64) / (n as f64)
}
