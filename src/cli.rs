use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the recommendation artifact from a raw movie dataset.
    Build {
        /// Path to the dataset csv (TMDB-style export)
        #[clap(short, long)]
        dataset: String,
    },

    /// One-shot recommendation query.
    Recommend {
        /// Preferred genre, e.g. "Comedy"
        #[clap(short, long)]
        genre: Option<String>,

        /// Mood key, e.g. "Dark" (see `reel options`)
        #[clap(short, long)]
        mood: Option<String>,

        /// What the movie should be about
        #[clap(short, long)]
        content: Option<String>,

        /// Something that must appear, e.g. "robot"
        #[clap(short, long)]
        element: Option<String>,

        /// Print results as JSON instead of a table
        #[clap(short, long, default_value = "false")]
        json: bool,
    },

    /// Interactive question flow.
    Wizard {},

    /// Start the HTTP API daemon.
    Daemon {
        /// Listen address, overrides the configured one
        #[clap(short, long)]
        listen: Option<String>,
    },

    /// Print the available genre and mood choices.
    Options {
        /// Print as JSON
        #[clap(short, long, default_value = "false")]
        json: bool,
    },
}
