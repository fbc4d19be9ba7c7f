//! CLI tool that stamps Producer/Creator metadata onto a folder of PDFs.
//!
//! Runs without arguments: the `input/`, `output/` and `config/` folders are
//! created next to the binary (or under `$PDFMETAUPDATE_ROOT`), the metadata
//! values are confirmed interactively, and every `input/*.pdf` is rewritten
//! into `output/`.

use env_logger::Env;
use pdfmetaupdate::{BatchProcessor, MetadataResolver, Result, UpdaterConfig, Workspace};
use std::{io, process};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => println!("\n✅ Metadata update completed successfully!"),
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let config = UpdaterConfig::from_env()?;
    let workspace = Workspace::new(&config.root).ensure()?;

    println!("📄 PDF Metadata Updater");
    println!("📁 Input folder : {}", workspace.input_dir().display());
    println!("📁 Output folder: {}", workspace.output_dir().display());
    println!("{}", "─".repeat(60));

    let config_path = workspace.config_file(&config);
    let stdin = io::stdin();
    let mut resolver = MetadataResolver::new(stdin.lock(), io::stdout());
    let values = resolver.resolve(&config_path)?;

    println!("{}", "─".repeat(60));
    println!("🏷️  Producer: {}", values.producer);
    println!("🏷️  Creator : {}", values.creator);

    let report = BatchProcessor::new(&workspace, &config).run(&values)?;

    if report.is_empty() {
        println!("\nℹ️  No PDF files found in {}", workspace.input_dir().display());
        return Ok(());
    }

    println!("\n🚀 Rewritten files:");
    for (i, file) in report.files.iter().enumerate() {
        println!(
            "   {}. {} ({} page{})",
            i + 1,
            file.file_name,
            file.page_count,
            if file.page_count == 1 { "" } else { "s" }
        );
    }

    println!("\n{}", "─".repeat(60));
    println!("📊 Summary:");
    println!("   • {} file(s) written", report.files.len());
    println!("   • {} page(s) in total", report.total_pages());
    println!("   • Output directory: {}", workspace.output_dir().display());

    Ok(())
}
