//! Writes the browser `config.js` from build-time environment variables.

use std::path::PathBuf;
use std::process::ExitCode;

use campusflow_backend::config_generator::{
    preview, render_config, write_config, GeneratorInput, DEFAULT_OUTPUT,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "generate-config",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate the front-end config.js from environment variables",
    long_about = None
)]
struct Cli {
    /// Destination of the generated file
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let secrets = match GeneratorInput::from_env().resolve() {
        Ok(secrets) => secrets,
        Err(missing) => {
            eprintln!("❌ Missing required environment variables:");
            for name in &missing.names {
                eprintln!("   - {}", name);
            }
            eprintln!("\nPlease set these in your deployment environment settings.");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_config(&cli.output, &render_config(&secrets)) {
        eprintln!("Error: failed to write {}: {}", cli.output.display(), e);
        return ExitCode::FAILURE;
    }

    println!("✅ Successfully generated config.js");
    println!("   SUPABASE_URL: {}...", preview(&secrets.supabase_url, 30));
    println!("   SUPABASE_ANON_KEY: {}...", preview(&secrets.supabase_anon_key, 20));
    ExitCode::SUCCESS
}
