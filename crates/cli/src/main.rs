use anyhow::{Context, Result};
use catalog::UserId;
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::Recommender;
use std::path::PathBuf;
use std::time::Instant;

/// ShelfRecs - Book Recommendation Engine
#[derive(Parser)]
#[command(name = "shelf-recs")]
#[command(about = "Book recommendation engine over the goodbooks-10k dataset", long_about = None)]
struct Cli {
    /// Path to the goodbooks-10k dataset directory
    #[arg(short, long, default_value = "data/goodbooks-10k")]
    data_dir: PathBuf,

    /// Emit results as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most popular books by weighted rating
    Popular {
        /// Number of books to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Find books similar to an exact title
    Similar {
        /// Exact title of the query book
        #[arg(long)]
        title: String,

        /// Number of books to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Personalized recommendations for a user
    ForUser {
        /// User ID to recommend for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Run the diagnostic 5-fold validation before fitting
        #[arg(long)]
        validate: bool,
    },

    /// Search for books by title (case-insensitive substring match)
    Search {
        /// Title fragment to search for
        #[arg(long)]
        title: String,
    },

    /// Show dataset overview statistics
    Stats,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the catalog (this may take a moment)
    println!("Loading goodbooks-10k dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let recommender = Recommender::load_from_dir(&cli.data_dir)
        .context("Failed to load the goodbooks-10k dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Popular { limit } => handle_popular(&recommender, limit, cli.json)?,
        Commands::Similar { title, limit } => handle_similar(&recommender, &title, limit, cli.json)?,
        Commands::ForUser {
            user_id,
            limit,
            validate,
        } => handle_for_user(&recommender, user_id, limit, validate, cli.json)?,
        Commands::Search { title } => handle_search(&recommender, &title)?,
        Commands::Stats => handle_stats(&recommender, cli.json)?,
    }

    Ok(())
}

/// Handle the 'popular' command
fn handle_popular(recommender: &Recommender, limit: usize, json: bool) -> Result<()> {
    let popular = recommender.recommend_popular(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&popular)?);
        return Ok(());
    }

    println!("{}", "Most popular books:".bold().blue());
    for (rank, row) in popular.iter().enumerate() {
        println!(
            "{}. {} by {} — {} ({})",
            (rank + 1).to_string().green(),
            row.title.bold(),
            row.author,
            format!("{:.2}", row.rating).yellow(),
            row.year.map_or("year unknown".to_string(), |y| y.to_string()),
        );
        println!("   {}", row.external_link.dimmed());
    }
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(recommender: &Recommender, title: &str, limit: usize, json: bool) -> Result<()> {
    let similar = recommender.recommend_similar(title, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&similar)?);
        return Ok(());
    }

    println!("{}", format!("Books similar to '{}':", title).bold().blue());
    for (rank, row) in similar.iter().enumerate() {
        println!(
            "{}. {} by {} — similarity {}",
            (rank + 1).to_string().green(),
            row.title.bold(),
            row.author,
            format!("{:.3}", row.similarity).yellow(),
        );
    }
    Ok(())
}

/// Handle the 'for-user' command
fn handle_for_user(
    recommender: &Recommender,
    user_id: UserId,
    limit: usize,
    validate: bool,
    json: bool,
) -> Result<()> {
    if validate {
        println!("{}", "Running 5-fold validation...".bold());
        let metrics = recommender.validate_model(5)?;
        for (fold, m) in metrics.iter().enumerate() {
            println!(
                "  fold {}: RMSE {} MAE {}",
                fold + 1,
                format!("{:.4}", m.rmse).yellow(),
                format!("{:.4}", m.mae).yellow(),
            );
        }
    }

    let report = recommender.recommend_for_user(user_id, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("User {} has rated:", user_id).bold().blue());
    if report.rated.is_empty() {
        println!("  (no ratings within the filtered universe)");
    }
    for row in &report.rated {
        println!("  {} — rated {}", row.title, row.rating.to_string().yellow());
    }

    println!("{}", "Recommended:".bold().blue());
    for (rank, row) in report.recommended.iter().enumerate() {
        println!(
            "{}. {} — estimated {}",
            (rank + 1).to_string().green(),
            row.title.bold(),
            format!("{:.2}", row.score).yellow(),
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(recommender: &Recommender, title: &str) -> Result<()> {
    let needle = title.to_lowercase();
    let mut matches: Vec<_> = recommender
        .store()
        .books()
        .iter()
        .filter_map(|book| {
            let haystack = book.title.to_lowercase();
            if haystack == needle {
                Some((0u8, book)) // Exact match ranks first
            } else if haystack.contains(&needle) {
                Some((1u8, book))
            } else {
                None
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| {
            b.1.average_rating
                .partial_cmp(&a.1.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for (_, book) in matches.iter().take(20) {
        println!(
            "{}: {} by {} — avg {:.2} ({} ratings)",
            book.id,
            book.title.bold(),
            book.authors,
            book.average_rating,
            book.ratings_count
        );
    }
    if matches.is_empty() {
        println!("  (no matches)");
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(recommender: &Recommender, json: bool) -> Result<()> {
    let overview = recommender.overview();

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("{}", "Dataset overview:".bold().blue());
    println!("{}Books: {}", "• ".green(), overview.books);
    println!("{}Tags: {}", "• ".green(), overview.tags);
    println!("{}Ratings: {}", "• ".cyan(), overview.ratings);
    println!("{}Rating users: {}", "• ".cyan(), overview.rating_users);
    println!("{}Rated books: {}", "• ".cyan(), overview.rated_books);

    let filtered_users = recommender.user_ids().len();
    println!(
        "{}Users in the filtered universe: {}",
        "• ".cyan(),
        filtered_users
    );
    Ok(())
}
