use clap::{Parser, Subcommand};

mod generate;
mod import;

#[derive(Debug, Parser)]
#[command(name = "catalog-app", about = "Product catalog CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import a product file into the catalog.
    Import(import::ImportArgs),

    /// Write a synthetic product file for load testing imports.
    Generate(generate::GenerateArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Import(args) => import::run(args).await,
            Commands::Generate(args) => generate::run(&args),
        }
    }
}
