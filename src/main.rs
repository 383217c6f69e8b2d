use std::env;
use std::path::Path;
use std::process;

use less_theme_gen::config::ThemeConfig;
use less_theme_gen::logging;
use less_theme_gen::theme::ThemeGenerator;
use log::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        // Use eprintln for usage info since logger isn't initialized yet
        eprintln!("Usage: {} <config_file>", args[0]);
        eprintln!("  <config_file>: YAML or JSON theme configuration");
        eprintln!("Example: {} theme.yaml", args[0]);
        eprintln!("Note: without output_file_path the stylesheet is printed to stdout.");
        process::exit(1);
    }

    let config = match ThemeConfig::from_file(Path::new(&args[1])) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = logging::init_logger(config.log_file.as_deref()) {
        eprintln!("Failed to initialize logger: {}", e);
        process::exit(1);
    }

    info!("LESS theme generator starting");
    info!("Command line arguments: {:?}", args);

    let options = match config.validate() {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let generator = ThemeGenerator::new(config.compiler());
    match generator.generate(&options).await {
        Ok(css) => match &options.output_file_path {
            Some(path) => println!("Theme generated successfully. OutputFile: {}", path.display()),
            None => print!("{}", css),
        },
        Err(e) => {
            error!("Theme generation failed: {}", e);
            process::exit(1);
        }
    }
}
