use catalog::CatalogStore;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/goodbooks-10k");

    println!("Loading goodbooks-10k dataset...\n");

    let start = Instant::now();
    let store = CatalogStore::load_from_dir(data_dir)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (books, tags, links, ratings) = store.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Books: {}", books);
    println!("Tags: {}", tags);
    println!("Book-tag links: {}", links);
    println!("Ratings: {}", ratings);
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / elapsed.as_secs_f64());
}
