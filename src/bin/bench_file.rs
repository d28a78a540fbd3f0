use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use bumpalo::Bump;
use pprof::protos::Message;
use puppet_parser::parser::parse_str;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: {} <file>", args[0]);
    }

    let path = &args[1];
    let code = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    println!("Benchmarking: {}", path);
    println!("File size: {:.2} KB", code.len() as f64 / 1024.0);

    println!("Warming up...");
    for _ in 0..50 {
        let bump = Bump::new();
        let _ = parse_str(&code, &bump);
    }

    let iterations = 200;
    println!("Running {} iterations...", iterations);

    let guard = pprof::ProfilerGuardBuilder::default()
        .frequency(1000)
        .blocklist(&["libc", "libgcc", "pthread", "vdso"])
        .build()
        .context("failed to start profiler")?;

    let start = Instant::now();
    let mut nodes = 0;
    for _ in 0..iterations {
        let bump = Bump::new();
        nodes = parse_str(&code, &bump).tree.len();
    }
    let duration = start.elapsed();

    if let Ok(report) = guard.report().build() {
        let profile = report.pprof().context("failed to encode profile")?;
        let mut content = Vec::new();
        profile.write_to_vec(&mut content).context("failed to encode profile")?;
        File::create("profile.pb")?.write_all(&content)?;
        println!("Profile written to profile.pb");

        report.flamegraph(File::create("flamegraph.svg")?)?;
        println!("Flamegraph written to flamegraph.svg");
    }

    let avg_time = duration / iterations as u32;
    let throughput = (code.len() as f64 * iterations as f64) / duration.as_secs_f64() / 1_024.0 / 1_024.0;

    println!("Nodes: {}", nodes);
    println!("Total time: {:?}", duration);
    println!("Average time: {:?}", avg_time);
    println!("Throughput: {:.2} MB/s", throughput);
    Ok(())
}
