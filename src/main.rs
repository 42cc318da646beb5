use anyhow::Context;
use clap::Parser;
use console::style;
use imgshrink::{BatchProcessor, Cli, ConvertConfig, ExtensionSet, PathClassifier, RunReporter};
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let config = cli.convert_config()?;
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Cannot open root folder {}", cli.root.display()))?;

    print_init(&cli, &config, &root);

    if !cli.yes {
        wait_keypress("continue or CTRL+C to abort")?;
    }

    println!("\nProcessing images");

    let mut reporter = RunReporter::start();
    if let Ok(exe) = std::env::current_exe() {
        reporter = reporter.with_self_path(exe);
    }

    let classifier = PathClassifier::new(ExtensionSet::standard());
    BatchProcessor::new(config, classifier)
        .with_progress(!cli.no_progress)
        .process_directory(&root, &mut reporter)?;

    let summary = reporter.finish();
    println!();
    print!("{}", summary);

    if cli.alert() {
        print!("\x07");
        io::stdout().flush()?;
    }
    if cli.wait() {
        wait_keypress("exit")?;
    }

    Ok(())
}

fn print_init(cli: &Cli, config: &ConvertConfig, root: &Path) {
    println!("\nRoot folder: {}\n", style(root.display()).blue());
    println!("Dpi value: {}", style(config.dpi).blue());
    println!("Max pixel long side: {}", style(config.max_dimension).blue());
    println!("Downscaling filter: {}", style(config.filter).blue());

    print!("Output image quality: {}", style(config.quality).blue());
    if config.quality > 95 {
        print!(
            " -> {}",
            style("WARNING: values above 95 might not decrease file size with hardly any gain in image quality!")
                .yellow()
        );
    }
    println!();

    print!("Color space conversion: {}", style(config.normalize_color_space).blue());
    if config.normalize_color_space {
        print!(
            " -> {}",
            style("WARNING: colorspace conversion from CMYK to RGB may not be accurate!").yellow()
        );
    }
    println!();

    println!("PNG optimization: {}", style(config.optimize).blue());
    println!("Alert when finished: {}", style(cli.alert()).blue());

    print!("Wait after end of conversion: {}", style(cli.wait()).blue());
    if cli.wait() {
        print!(" -> {}", style("Press enter to confirm exit when finished.").green());
    }
    println!();
}

/// Blocks until a line (possibly empty) is read from stdin.
fn wait_keypress(action: &str) -> io::Result<()> {
    print!(
        "\n{} {} to {}",
        style("Press").yellow(),
        style("Enter").bold(),
        style(action).yellow()
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
