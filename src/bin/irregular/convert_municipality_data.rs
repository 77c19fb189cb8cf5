use std::error::Error;

use clap::Parser;
use log::info;
use sigpac_tools::municipality::codegen::{convert, DEFAULT_INPUT, DEFAULT_OUTPUT};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with province code -> municipality code -> name
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: String,

    /// Where to write the generated loadMunicipalityNames function
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,
}

/// Generate the municipality lookup function for CascadeSearchPanel.qml
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let summary = convert(&args.input, &args.output)?;
    info!(
        "{} provinces, {} municipalities",
        summary.provinces, summary.municipalities
    );
    println!(
        "Conversion complete! Check {} for the result.",
        args.output
    );
    Ok(())
}
