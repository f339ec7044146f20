//! Writes a synthetic `Electric_Vehicle_Population_Data.csv` with the same
//! header as the Washington State EV population export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const HEADER: [&str; 12] = [
    "VIN (1-10)",
    "County",
    "City",
    "State",
    "Postal Code",
    "Model Year",
    "Make",
    "Model",
    "Electric Vehicle Type",
    "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
    "Electric Range",
    "Base MSRP",
];

const BEV: &str = "Battery Electric Vehicle (BEV)";
const PHEV: &str = "Plug-in Hybrid Electric Vehicle (PHEV)";

/// (make, model, type, base range in miles, base MSRP)
const MODELS: [(&str, &str, &str, f64, f64); 8] = [
    ("TESLA", "MODEL 3", BEV, 220.0, 39990.0),
    ("TESLA", "MODEL S", BEV, 270.0, 69900.0),
    ("NISSAN", "LEAF", BEV, 84.0, 29990.0),
    ("CHEVROLET", "BOLT EV", BEV, 238.0, 36620.0),
    ("KIA", "NIRO", BEV, 239.0, 39090.0),
    ("CHEVROLET", "VOLT", PHEV, 38.0, 33220.0),
    ("TOYOTA", "PRIUS PRIME", PHEV, 25.0, 27600.0),
    ("BMW", "X5", PHEV, 30.0, 59600.0),
];

const PLACES: [(&str, &str, &str); 4] = [
    ("King", "Seattle", "98101"),
    ("Snohomish", "Bothell", "98012"),
    ("Thurston", "Olympia", "98501"),
    ("Kitsap", "Bremerton", "98310"),
];

#[derive(Parser, Debug)]
#[command(about = "Generate a synthetic EV population CSV")]
struct Args {
    /// Number of vehicles
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path
    #[arg(
        short,
        long,
        default_value = "sample_data/Electric_Vehicle_Population_Data.csv"
    )]
    output: PathBuf,
}

fn vin(rng: &mut StdRng) -> String {
    const CHARS: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ0123456789";
    (0..10)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

/// One CSV row. A few cells are left empty or malformed on purpose so the
/// cleaner has something to do.
fn vehicle(rng: &mut StdRng) -> Vec<String> {
    let &(make, model, kind, base_range, base_msrp) =
        MODELS.choose(rng).unwrap_or(&MODELS[0]);
    let &(county, city, postal) = PLACES.choose(rng).unwrap_or(&PLACES[0]);
    let year: i64 = rng.gen_range(2011..=2024);

    // newer cars go further
    let range = (base_range * (1.0 + 0.03 * (year - 2011) as f64)
        + rng.gen_range(-15.0..15.0))
    .max(0.0)
    .round();
    let msrp = (base_msrp * rng.gen_range(0.9..1.15) / 10.0).round() * 10.0;

    let range_cell = match rng.gen_range(0..100) {
        0 => String::new(),
        1 => "N/A".to_string(),
        _ => format!("{range}"),
    };
    let msrp_cell = if rng.gen_bool(0.03) {
        String::new()
    } else {
        format!("{msrp}")
    };
    let eligibility = if kind == BEV || range >= 30.0 {
        "Clean Alternative Fuel Vehicle Eligible"
    } else {
        "Not eligible due to low battery range"
    };

    vec![
        vin(rng),
        county.to_string(),
        city.to_string(),
        "WA".to_string(),
        postal.to_string(),
        year.to_string(),
        make.to_string(),
        model.to_string(),
        kind.to_string(),
        eligibility.to_string(),
        range_cell,
        msrp_cell,
    ]
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    writer.write_record(HEADER)?;
    for _ in 0..args.rows {
        writer.write_record(vehicle(&mut rng))?;
    }
    writer.flush()?;

    println!("Wrote {} vehicles to {}", args.rows, args.output.display());
    Ok(())
}
