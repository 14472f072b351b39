//! Trim a PDF to its first N pages.
//!
//! Usage: trim-pdf <input.pdf> <output.pdf> [pages]

use std::env;
use std::process;

const DEFAULT_PAGES: usize = 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input.pdf> <output.pdf> [pages]", args[0]);
        process::exit(2);
    }

    let input = &args[1];
    let output = &args[2];
    let pages: usize = match args.get(3) {
        Some(raw) => raw.parse().map_err(|_| format!("invalid page count: {}", raw))?,
        None => DEFAULT_PAGES,
    };

    let mut doc = lopdf::Document::load(input)?;

    let total = doc.get_pages().len();
    let keep = total.min(pages);

    println!(
        "Original PDF has {} pages. Extracting first {} pages.",
        total, keep
    );

    if keep < total {
        let to_delete: Vec<u32> = ((keep as u32 + 1)..=(total as u32)).collect();
        doc.delete_pages(&to_delete);
        doc.prune_objects();
    }

    doc.save(output)?;

    println!("Output saved to {}", output);

    Ok(())
}
