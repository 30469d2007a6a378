use std::env;
mod avl;
mod btm;
mod utils;

fn usage() {
    println!("usage: <avl|btm> <size>")
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        return usage();
    }
    let size = match args[2].parse::<usize>() {
        Ok(size) => size,
        Err(_) => return usage(),
    };
    match args[1].as_ref() {
        "avl" => avl::run(size),
        "btm" => btm::run(size),
        _ => usage(),
    }
}
