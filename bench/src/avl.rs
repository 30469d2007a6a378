use crate::utils;
use rwavl::tree::AvlTree;
use std::{
    cmp::{max, min},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

const MIN_ITER: usize = 1000000;

fn bench_insert(data: &[i64]) -> (Arc<AvlTree<i64>>, Duration) {
    let t = AvlTree::new();
    let begin = Instant::now();
    for k in data {
        t.insert(*k);
    }
    (Arc::new(t), begin.elapsed())
}

fn bench_search_seq(t: &AvlTree<i64>, d: &[i64]) -> Duration {
    let begin = Instant::now();
    let mut i = 0;
    while i < MIN_ITER {
        for k in d {
            i += 1;
            t.search(k).unwrap();
        }
    }
    begin.elapsed()
}

fn bench_search_par(t: Arc<AvlTree<i64>>, d: Arc<Vec<i64>>, n: usize) -> Duration {
    let chunk = max(1, d.len() / n);
    let begin = Instant::now();
    let threads: Vec<_> = (0..n)
        .map(|i| {
            let (t, d) = (t.clone(), d.clone());
            thread::spawn(move || {
                let mut r = 0;
                let p = min(i * chunk, d.len() - 1);
                while r < MIN_ITER {
                    for k in &d[p..min(d.len(), p + chunk)] {
                        r += 1;
                        t.search(k).unwrap();
                    }
                }
            })
        })
        .collect();
    for th in threads {
        th.join().unwrap();
    }
    begin.elapsed()
}

fn bench_index(t: &AvlTree<i64>) -> Duration {
    let len = t.len();
    let begin = Instant::now();
    for i in 0..len {
        t.index(i).unwrap();
    }
    begin.elapsed()
}

fn bench_delete(t: &AvlTree<i64>, d: &[i64]) -> Duration {
    let begin = Instant::now();
    for k in d {
        assert!(t.delete(k));
    }
    begin.elapsed()
}

pub(crate) fn run(size: usize) {
    let d = Arc::new(utils::randvec::<i64>(max(1, size)));
    let size = d.len();
    let n = num_cpus::get();
    let (t, insert) = bench_insert(&d);
    let search = bench_search_seq(&t, &d);
    let search_par = bench_search_par(t.clone(), d.clone(), n);
    let index = bench_index(&t);
    let delete = bench_delete(&t, &d);
    let iter = max(MIN_ITER, size);
    let iterp = max(MIN_ITER * n, size);
    println!(
        "size,insert,search,search_par,index,delete\n{},{:.0},{:.0},{:.2},{:.0},{:.0}",
        size,
        utils::to_ns_per(insert, size),
        utils::to_ns_per(search, iter),
        utils::to_ns_per(search_par, iterp),
        utils::to_ns_per(index, size),
        utils::to_ns_per(delete, size)
    );
}
