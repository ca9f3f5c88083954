use clap::Parser;
use lib::{
    DatasetCache, DayType, Facets, PipelineError, SimpleLogger, Summary, write_csv, write_json,
    write_parquet,
};
use log::{debug, error};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input CSV of hourly rentals (e.g. train.csv)
    #[arg(short, long)]
    input_file: PathBuf,

    /// Output base name (will create dir containing .csv, .json, .parquet and summary files)
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Years to keep (e.g., 2011,2012). If not specified, keeps every year in the data.
    #[arg(short, long, value_delimiter = ',')]
    years: Vec<i32>,

    /// Season labels to keep (e.g., Spring,Fall). If not specified, keeps every season in the data.
    #[arg(short, long, value_delimiter = ',')]
    seasons: Vec<String>,

    /// Day type to keep
    #[arg(long, value_enum, default_value_t = DayType::All)]
    day_type: DayType,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() {
    if let Err(e) = log::set_logger(&LOGGER) {
        eprintln!("Cannot install logger: {}", e);
        std::process::exit(1);
    }
    log::set_max_level(log::LevelFilter::Info);

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), PipelineError> {
    let total_start = Instant::now();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    println!("Rentals! Bike Rental Enrichment Pipeline");
    debug!(
        "Input file: {} | Years: {:?} | Seasons: {:?} | Day type: {:?}",
        args.input_file.display(),
        args.years,
        args.seasons,
        args.day_type
    );

    // Enrich once; every filter below reads the same table
    let mut cache = DatasetCache::new();
    let load_start = Instant::now();
    let dataset = cache.load(&args.input_file).inspect_err(|_| {
        error!("Data quality failure in {}, no output written", args.input_file.display())
    })?;
    println!(
        "Enriched {} records in {:.2?}",
        dataset.len(),
        load_start.elapsed()
    );

    let all = Facets::all(&dataset);
    println!(
        "Available years: {:?} | Available seasons: {:?}",
        all.years, all.seasons
    );

    let facets = Facets {
        years: if args.years.is_empty() {
            all.years
        } else {
            args.years.into_iter().collect()
        },
        seasons: if args.seasons.is_empty() {
            all.seasons
        } else {
            args.seasons.into_iter().collect()
        },
        day_type: args.day_type,
    };

    let view = dataset.filter(&facets);
    if view.is_empty() {
        println!("No data matches the selected filters");
    } else {
        println!("{} of {} records match the selected filters", view.len(), dataset.len());
    }
    let summary = Summary::from_view(&view);

    // Create output directory
    let output_dir = PathBuf::from(format!("./output/{}", args.output));
    fs::create_dir_all(&output_dir)?;
    println!(
        "Created output directory: {} | Writing output files...",
        output_dir.display()
    );
    let io_start = Instant::now();

    let output_name = args
        .output
        .split(['/', '\\'])
        .next_back()
        .unwrap_or(&args.output);
    let csv_path = output_dir.join(format!("{}.csv", output_name));
    let json_path = output_dir.join(format!("{}.json", output_name));
    let parquet_path = output_dir.join(format!("{}.parquet", output_name));
    let summary_path = output_dir.join(format!("{}_summary.json", output_name));

    write_csv(view.records(), &csv_path)?;
    write_json(view.records(), &json_path)?;
    write_parquet(view.records(), &parquet_path)?;
    write_json(&summary, &summary_path)?;
    println!("All files took {:.2?}", io_start.elapsed());
    debug!("  - {}", csv_path.display());
    debug!("  - {}", json_path.display());
    debug!("  - {}", parquet_path.display());
    debug!("  - {}", summary_path.display());

    for point in summary.hourly.iter().filter(|p| p.hour % 6 == 0) {
        debug!(
            "Hour {:>2}: mean={:.1} over {} rows",
            point.hour, point.mean_count, point.samples
        );
    }

    println!(
        "Pipeline completed successfully in {:.2?}",
        total_start.elapsed()
    );
    Ok(())
}
