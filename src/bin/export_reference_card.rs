//! Simple utility to export a hormone reference card PDF without an MCP session.
//! Usage: cargo run --bin export_reference_card -- <hormone> <output.pdf>

use huc::conversion::HormoneCatalog;
use huc::tools::reports::export_reference_card;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let catalog = HormoneCatalog::builtin();

    let (hormone, output_path) = match (args.get(1), args.get(2)) {
        (Some(h), Some(o)) => (h.as_str(), o.as_str()),
        _ => {
            eprintln!("Usage: export_reference_card <hormone> <output.pdf>");
            eprintln!("\nAvailable hormones:");
            for h in catalog.hormones() {
                eprintln!("  {} - {}", h.id, h.name);
            }
            std::process::exit(2);
        }
    };

    let response = export_reference_card(&catalog, hormone, output_path)?;
    println!("{}", response.message);
    println!("Written to: {}", response.file_path);

    Ok(())
}
