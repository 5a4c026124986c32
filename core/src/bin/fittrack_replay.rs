// fittrack-replay <track.json> [config.json]
//
// Spiller av et lagret spor gjennom GPS-filteret og skriver en rapport.

use anyhow::{bail, Context, Result};

use fittrack_core::api::{filter_track, TrackIn, TrackOut};
use fittrack_core::storage::load_filter_config;

fn print_route_report(out: &TrackOut) {
    let s = &out.summary;
    println!("--- Route Report ---");
    println!("Start: {}", s.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Points: {}", s.points);
    println!("Distance: {:.2} km", s.distance_m / 1000.0);
    println!("Duration: {:.0} s", s.duration_s);
    println!("Avg speed: {:.1} km/h", s.avg_speed_kmh);
    match s.pace_min_per_km {
        Some(p) => {
            let secs = (p * 60.0).round() as u64;
            println!("Pace: {}:{:02} min/km", secs / 60, secs % 60);
        }
        None => println!("Pace: -"),
    }
    println!();
    println!("--- Outcomes ---");
    for (label, n) in &out.counts {
        println!("{label:<26} {n}");
    }
    println!();
    println!("{}", out.report);
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        bail!("usage: fittrack-replay <track.json> [config.json]");
    }

    let raw = std::fs::read_to_string(&args[0])
        .with_context(|| format!("kunne ikke lese spor {}", args[0]))?;
    let mut input: TrackIn = serde_json::from_str(&raw)
        .with_context(|| format!("ugyldig spor-JSON i {}", args[0]))?;

    if let Some(cfg_path) = args.get(1) {
        input.config = Some(load_filter_config(cfg_path).context("kunne ikke laste filterkonfig")?);
    }

    let out = filter_track(input)?;
    print_route_report(&out);
    Ok(())
}
