use freqrank::FreqRank;

fn main() {
    let mut tracker: FreqRank<String> = FreqRank::new();

    // Record some example items with different frequencies
    tracker.record_by("frequent item".to_string(), 5);
    tracker.record_by("less frequent item".to_string(), 3);
    tracker.record("rare item".to_string());

    // Print the items and their counts in order of frequency
    println!("Top items and their frequencies:");
    for entry in tracker.top_entries(10) {
        println!("{}: {}", entry.key, entry.count);
    }

    // Demonstrate the count() method
    let item = "frequent item";
    println!("\nCount for '{}': {}", item, tracker.count(item));

    // Demonstrate the contains() method
    println!(
        "Is '{}' tracked? {}",
        item,
        if tracker.contains(item) { "yes" } else { "no" }
    );
}
