//! Interactive question flow over the recommendation engine.
//!
//! Pure terminal I/O: every answer feeds the same `UserQuery` the HTTP API
//! accepts, so the wizard and the daemon rank identically.

use inquire::{Select, Text};

use crate::engine::{RecommendService, UserQuery};

pub fn run(service: &RecommendService) -> anyhow::Result<()> {
    let options = service.options();

    let genre = Select::new("Which genre?", options.genres.clone()).prompt()?;

    let mood = Select::new("What mood are you in?", options.moods.clone()).prompt()?;

    let content = Text::new("What should it be about?")
        .with_help_message("free text, leave empty to skip")
        .prompt()?;

    let element = Text::new("Anything that must appear?")
        .with_help_message("e.g. robot, high school, zombie")
        .prompt()?;

    let query = UserQuery {
        genre,
        mood,
        content,
        element,
    };

    let results = service.recommend(&query)?;

    if results.is_empty() {
        println!("No matches found.");
        return Ok(());
    }

    println!();
    for (position, movie) in results.iter().enumerate() {
        println!(
            "{}. {} ({}) [score {:.2}]",
            position + 1,
            movie.title,
            movie.year,
            movie.score,
        );
        if !movie.genres.is_empty() {
            println!("   {}", movie.genres.join(", "));
        }
        if !movie.overview.is_empty() {
            println!("   {}", movie.overview);
        }
    }

    Ok(())
}
