//! Benchmarks for the similarity index build
//!
//! Run with: cargo bench --package rankers
//!
//! Uses a synthetic tag-bag corpus so the benchmark runs without the
//! goodbooks-10k files on disk.

use catalog::{Book, BookTagLink, CatalogStore, Tag};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use features::FeatureBuilder;
use rankers::SimilarityIndex;
use std::sync::Arc;

/// A corpus of `n` books, each tagged with a handful of overlapping genres
fn synthetic_bags(n: u32) -> features::TagBags {
    let genres = [
        "fantasy", "science-fiction", "mystery", "romance", "history",
        "biography", "horror", "poetry", "young-adult", "classics",
    ];

    let mut store = CatalogStore::new();
    for (id, name) in genres.iter().enumerate() {
        store.insert_tag(Tag {
            id: id as u32,
            name: name.to_string(),
        });
    }
    for id in 1..=n {
        store.insert_book(Book {
            id,
            goodreads_id: id,
            title: format!("Book {id}"),
            authors: "Author".to_string(),
            original_publication_year: Some(2010),
            average_rating: 4.0,
            ratings_count: 100,
            work_text_reviews_count: 10,
            image_url: String::new(),
        });
        // Deterministic tag spread: each book carries three genres
        for offset in 0..3u32 {
            store.insert_link(BookTagLink {
                goodreads_id: id,
                tag_id: (id + offset * 3) % genres.len() as u32,
            });
        }
    }

    FeatureBuilder::new(Arc::new(store)).tag_bags()
}

fn bench_build_index(c: &mut Criterion) {
    let bags = synthetic_bags(1000);

    c.bench_function("similarity_index_build_1k", |b| {
        b.iter(|| {
            let index = SimilarityIndex::build(black_box(&bags)).unwrap();
            black_box(index)
        })
    });
}

fn bench_most_similar(c: &mut Criterion) {
    let bags = synthetic_bags(1000);
    let index = SimilarityIndex::build(&bags).unwrap();

    c.bench_function("most_similar_top10", |b| {
        b.iter(|| {
            let neighbors = index.most_similar(black_box(0), black_box(10));
            black_box(neighbors)
        })
    });
}

criterion_group!(benches, bench_build_index, bench_most_similar);
criterion_main!(benches);
