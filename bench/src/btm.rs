use crate::utils;
use std::{
    cmp::max,
    collections::BTreeSet,
    time::{Duration, Instant},
};

fn bench_insert(d: &[i64]) -> (BTreeSet<i64>, Duration) {
    let mut m = BTreeSet::new();
    let begin = Instant::now();
    for k in d {
        m.insert(*k);
    }
    (m, begin.elapsed())
}

fn bench_search(m: &BTreeSet<i64>, d: &[i64]) -> Duration {
    let begin = Instant::now();
    for k in d {
        m.get(k).unwrap();
    }
    begin.elapsed()
}

fn bench_delete(m: &mut BTreeSet<i64>, d: &[i64]) -> Duration {
    let begin = Instant::now();
    for k in d {
        assert!(m.remove(k));
    }
    begin.elapsed()
}

pub(crate) fn run(size: usize) {
    let d = utils::randvec::<i64>(max(1, size));
    let (mut m, insert) = bench_insert(&d);
    let search = bench_search(&m, &d);
    let delete = bench_delete(&mut m, &d);
    println!(
        "size,insert,search,delete\n{},{:.0},{:.0},{:.0}",
        d.len(),
        utils::to_ns_per(insert, d.len()),
        utils::to_ns_per(search, d.len()),
        utils::to_ns_per(delete, d.len())
    );
}
