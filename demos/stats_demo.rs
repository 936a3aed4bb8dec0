use clap::Parser;
use linear_hash::LinearMap;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Percentage of entries removed again after filling the map.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u8,

    /// Number of parts to split the filled map into.
    #[arg(short = 's', long = "split", default_value_t = 0)]
    split: usize,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating LinearMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: LinearMap<u64, u64> = match LinearMap::try_with_capacity(args.target_capacity) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!("Actual capacity: {}", map.capacity());
    println!("Filling map with u64 keys...");

    let num_values = map.capacity() as u64;
    for key in 0..num_values {
        map.put(key, key * 2);
    }

    println!("Inserted {} entries into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    if args.remove_percent > 0 {
        let step = (100 / u64::from(args.remove_percent.min(100))).max(1);
        for key in (0..num_values).step_by(step as usize) {
            map.remove(&key);
        }
        println!(
            "Removed every {step}th key, {} entries remain",
            map.len()
        );
    }

    map.probe_histogram().print();
    map.debug_stats().print();

    if args.split > 0 {
        let parts = map.split(args.split);
        println!("Split into {} parts:", parts.len());
        for (i, part) in parts.iter().enumerate() {
            let stats = part.debug_stats();
            println!(
                "  part {i}: {} entries, max probe distance {}",
                stats.populated, stats.max_probe_distance
            );
        }
    }
}
