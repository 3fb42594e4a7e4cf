use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};
use tracing::info;

use brutyf_core::benchmark::{benchmark_all, fastest, slowest};

use crate::Benchmark;

pub fn benchmark(bench: Benchmark) {
    info!("Hashing {} passwords per algorithm", bench.iterations);
    let results = benchmark_all(bench.iterations);

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Type", "Hashes", "Time", "Speed"]);

    for result in &results {
        display_table.add_row(vec![
            Cell::new(result.hash_type),
            Cell::new(result.iterations),
            Cell::new(format!("{:.4}s", result.elapsed.as_secs_f64())),
            Cell::new(format!("{:.2} H/s", result.speed())).fg(Color::Green),
        ]);
    }

    println!("{display_table}");

    if let (Some(fast), Some(slow)) = (fastest(&results), slowest(&results)) {
        println!("Fastest: {fast}");
        println!("Slowest: {slow}");
    }
}
