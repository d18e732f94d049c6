//! Formation CLI
//!
//! Tracking JSON -> formation prototype report
//! Default pipeline configuration export

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "formation_cli")]
#[command(about = "Discover team formation prototypes from tracking data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Cluster a match's formations
    Cluster {
        /// Input tracking JSON file path
        #[arg(long)]
        tracking: PathBuf,

        /// Output report JSON file path
        #[arg(long)]
        out: PathBuf,

        /// Pipeline config YAML (defaults, or FORMATION_SEARCH_PROFILE)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Print or write the default pipeline configuration
    Config {
        /// Output YAML file path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster {
            tracking,
            out,
            config,
            pretty,
        } => {
            println!("🔨 Clustering formations...");
            println!("   Tracking: {}", tracking.display());
            println!("   Output:   {}", out.display());
            if let Some(config) = &config {
                println!("   Config:   {}", config.display());
            }

            let table = formation_cli::load_tracking(&tracking)?;
            let pipeline_config = formation_cli::load_config(config.as_deref())?;
            let report = formation_cli::run(&table, pipeline_config)?;
            formation_cli::write_report(&out, &report, pretty)?;

            print_summary(&formation_cli::RunSummary::from_report(&report));
        }

        Commands::Config { out } => {
            let yaml = formation_cli::export_default_config(out.as_deref())?;
            match out {
                Some(path) => println!("📄 Default config saved to: {}", path.display()),
                None => print!("{}", yaml),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(summary: &formation_cli::RunSummary) {
    println!("\n✅ Report written");
    println!("   Frames:      {}", summary.frames);
    println!("   Windows:     {}", summary.windows);
    match summary.preferred_k {
        Some(k) => println!("   Preferred k: {}", k),
        None => println!("   Preferred k: -"),
    }
    for group in &summary.groups {
        match group.k {
            Some(k) => println!(
                "   {:<18} {:>3} formations, k = {}, sizes {:?}",
                group.group, group.formations, k, group.cluster_sizes
            ),
            None => println!(
                "   {:<18} {:>3} formations, not clustered",
                group.group, group.formations
            ),
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("formation_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
