use std::path::Path;
use std::time::Duration;

use clap::Parser;

mod cli;
mod config;
mod engine;
mod movies;
#[cfg(test)]
mod tests;
mod web;
mod wizard;

use config::Config;
use engine::{ArtifactStore, FastembedEncoder, RecommendService, TextEncoder, UserQuery};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = cli::Args::parse();
    let config = Config::load();

    match args.command {
        cli::Command::Build { dataset } => {
            let encoder = new_encoder(&config)?;
            let store = ArtifactStore::new(config.data_dir());

            let summary = engine::build_artifact(Path::new(&dataset), encoder.as_ref(), &store)?;
            println!(
                "Built artifact: {} movies ({} rows skipped), {}-dim vectors",
                summary.movies, summary.skipped, summary.dimensions
            );
            Ok(())
        }

        cli::Command::Recommend {
            genre,
            mood,
            content,
            element,
            json,
        } => {
            let service = open_service(&config)?;
            let query = UserQuery {
                genre: genre.unwrap_or_default(),
                mood: mood.unwrap_or_default(),
                content: content.unwrap_or_default(),
                element: element.unwrap_or_default(),
            };

            let results = service.recommend(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
                return Ok(());
            }

            if results.is_empty() {
                println!("No matches found.");
                return Ok(());
            }

            for (position, movie) in results.iter().enumerate() {
                println!(
                    "{}. {} ({}) [score {:.2}]",
                    position + 1,
                    movie.title,
                    movie.year,
                    movie.score,
                );
            }
            Ok(())
        }

        cli::Command::Wizard {} => {
            let service = open_service(&config)?;
            wizard::run(&service)
        }

        cli::Command::Daemon { listen } => {
            let service = open_service(&config)?;
            let listen_addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            web::start_daemon(service, &listen_addr);
            Ok(())
        }

        cli::Command::Options { json } => {
            let options = engine::Options {
                genres: config.genres.clone(),
                moods: engine::mood_keys().iter().map(|key| key.to_string()).collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                println!("Genres: {}", options.genres.join(", "));
                println!("Moods:  {}", options.moods.join(", "));
            }
            Ok(())
        }
    }
}

fn new_encoder(config: &Config) -> anyhow::Result<Box<dyn TextEncoder>> {
    let timeout = Duration::from_secs(config.download_timeout_secs);
    let encoder = FastembedEncoder::new(&config.model, config.data_dir(), Some(timeout))?;
    Ok(Box::new(encoder))
}

fn open_service(config: &Config) -> anyhow::Result<RecommendService> {
    let encoder = new_encoder(config)?;
    Ok(RecommendService::open(config, encoder)?)
}
