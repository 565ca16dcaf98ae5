use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use freqrank::FreqRank;

fn random_ip(rng: &mut SmallRng) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8),
        rng.random_range(0..=255u8)
    )
}

fn main() {
    let mut tracker: FreqRank<String> = FreqRank::new();

    // Skewed workload over one /24: host .i is recorded i times, so the
    // ranking should come back as .255, .254, ...
    for host in 0..=255u32 {
        for _ in 0..host {
            tracker.record(format!("203.0.113.{}", host));
        }
    }
    println!("skewed /24 workload, top 10:");
    for entry in tracker.top_entries(10) {
        println!("  {} {}", entry.key, entry.count);
    }
    let expected: Vec<String> = (246..=255).rev().map(|h| format!("203.0.113.{}", h)).collect();
    assert_eq!(tracker.top(10), expected);

    tracker.clear();

    // Uniform random IPs, timed.
    let total = 1_000_000;
    let mut rng = SmallRng::seed_from_u64(0xF00D);
    let ips: Vec<String> = (0..total).map(|_| random_ip(&mut rng)).collect();

    let start = Instant::now();
    for ip in ips {
        tracker.record(ip);
    }
    let duration = start.elapsed();

    let num_of_seconds = duration.as_secs_f64();
    let throughput = (total as f64 / 1_000_000.0) / num_of_seconds;
    println!("\nrecorded {} random IPs in {:.3} s", total, num_of_seconds);
    println!(
        "throughput: {:.2} Mops/s, each record uses {:.0} ns",
        throughput,
        1_000.0 / throughput
    );
    println!("{} distinct IPs tracked", tracker.len());

    let start = Instant::now();
    let top = tracker.top_entries(10);
    println!("top 10 query took {:?}:", start.elapsed());
    for entry in top {
        println!("  {} {}", entry.key, entry.count);
    }
}
