use clap::Parser;
use stac_geoparquet_items_cli::GeoparquetItems;

fn main() {
    let args = GeoparquetItems::parse();
    if let Err(error) = args.run(true) {
        eprintln!("ERROR: {error}");
        std::process::exit(1);
    }
}
