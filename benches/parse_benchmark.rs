use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use wildfire_tracker::models::ImageResult;
use wildfire_tracker::services::detail::parse_activation_feed;
use wildfire_tracker::services::feed::parse_feed;
use wildfire_tracker::services::image::rank_images;
use wildfire_tracker::services::listing::parse_listing;

fn benchmark_parsers(c: &mut Criterion) {
    let listing = fs::read_to_string("tests/fixtures/listing.html").expect("Failed to read listing");
    let feed = fs::read_to_string("tests/fixtures/feed.xml").expect("Failed to read feed");
    let aemfeed =
        fs::read_to_string("tests/fixtures/aemfeed_EMSR999.xml").expect("Failed to read aemfeed");

    // Repeat the product items to get a feed of realistic length
    let item_start = aemfeed.find("<item>").expect("No item in fixture");
    let item_end = aemfeed.rfind("</item>").expect("No item in fixture") + "</item>".len();
    let items = aemfeed[item_start..item_end].repeat(50);
    let long_aemfeed = format!(
        "{}{}{}",
        &aemfeed[..item_start],
        items,
        &aemfeed[item_end..]
    );

    let mut group = c.benchmark_group("parsers");

    group.bench_function("listing", |b| {
        b.iter(|| parse_listing(black_box(&listing), |href| href.to_string()))
    });

    group.bench_function("global_feed", |b| b.iter(|| parse_feed(black_box(&feed))));

    group.bench_function("activation_feed_100_items", |b| {
        b.iter(|| parse_activation_feed(black_box(&long_aemfeed)))
    });

    group.finish();
}

fn benchmark_rank_images(c: &mut Criterion) {
    let sources = ["UnknownWire", "Reuters", "Blog", "AP", "DW", "Local News"];
    let results: Vec<ImageResult> = (0..100)
        .map(|i| ImageResult {
            title: format!("Image {}", i),
            source: sources[i % sources.len()].to_string(),
            original: format!("https://img.test/{}.jpg", i),
            thumbnail: None,
            link: None,
        })
        .collect();

    c.bench_function("rank_100_images", |b| {
        b.iter(|| rank_images(black_box(results.clone())))
    });
}

criterion_group!(benches, benchmark_parsers, benchmark_rank_images);
criterion_main!(benches);
