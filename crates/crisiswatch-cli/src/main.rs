use clap::{Parser, Subcommand};

mod benchmark;
mod cycle;
mod seed;

#[derive(Debug, Parser)]
#[command(name = "crisiswatch-cli")]
#[command(about = "Crisiswatch command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one evaluation cycle over the configured brands now.
    Cycle {
        /// Restrict the cycle to a single brand.
        #[arg(long)]
        brand: Option<String>,
    },
    /// Compute the competitive benchmark for one brand pair.
    Benchmark {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        competitor: String,
        /// Period length in days, ending now.
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Seed synthetic mentions and sentiment for the configured brands.
    Seed {
        /// How far back to spread the mentions.
        #[arg(long, default_value_t = 48)]
        hours: i64,
        /// Approximate mentions generated per brand per hour.
        #[arg(long, default_value_t = 5)]
        mentions_per_hour: i64,
        /// Brand to hit with a negativity spike in the most recent hour.
        #[arg(long)]
        crisis: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Cycle { brand } => cycle::run(brand.as_deref()).await,
        Commands::Benchmark {
            brand,
            competitor,
            days,
        } => benchmark::run(&brand, &competitor, days).await,
        Commands::Seed {
            hours,
            mentions_per_hour,
            crisis,
        } => seed::run(hours, mentions_per_hour, crisis.as_deref()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_parses_with_optional_brand() {
        let cli = Cli::try_parse_from(["crisiswatch-cli", "cycle", "--brand", "Apple"])
            .expect("parse");
        assert!(matches!(cli.command, Commands::Cycle { brand: Some(ref b) } if b == "Apple"));
    }

    #[test]
    fn benchmark_requires_brand_and_competitor() {
        assert!(Cli::try_parse_from(["crisiswatch-cli", "benchmark", "--brand", "Apple"]).is_err());

        let cli = Cli::try_parse_from([
            "crisiswatch-cli",
            "benchmark",
            "--brand",
            "Apple",
            "--competitor",
            "Samsung",
        ])
        .expect("parse");
        assert!(
            matches!(cli.command, Commands::Benchmark { ref competitor, days: 7, .. } if competitor == "Samsung")
        );
    }

    #[test]
    fn seed_defaults_apply() {
        let cli = Cli::try_parse_from(["crisiswatch-cli", "seed"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Seed {
                hours: 48,
                mentions_per_hour: 5,
                crisis: None
            }
        ));
    }
}
