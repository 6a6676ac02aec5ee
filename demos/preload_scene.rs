//! Preload a directory of city assets and print cache statistics.
//!
//! Usage: `cargo run --example preload_scene -- <asset-root> <path>...`

use std::sync::Arc;

use skyline_asset::loader::AssetServer;
use skyline_asset::source::FileSource;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| "assets".to_string());
    let paths: Vec<String> = args.collect();

    if paths.is_empty() {
        eprintln!("usage: preload_scene <asset-root> <path>...");
        return;
    }

    let server = AssetServer::new(Arc::new(FileSource::new(&root)));
    server.add_progress_listener(|event| {
        if event.batch_complete {
            log::info!(
                "batch complete: {}/{} assets",
                event.loaded_bytes,
                event.total_bytes
            );
        } else if !event.path.is_empty() {
            log::info!("{} {:.0}%", event.path, event.percent);
        }
    });

    server.preload_assets(paths.iter().cloned()).await;

    for path in &paths {
        match server.load_model(path).await {
            Some(model) => log::info!(
                "'{}': {} meshes, {} triangles",
                path,
                model.meshes.len(),
                model.triangle_count()
            ),
            None => log::warn!("'{path}' did not load"),
        }
    }

    let stats = server.cache_stats();
    log::info!(
        "cache: {} hits, {} misses ({:.1}% hit rate)",
        stats.hits,
        stats.misses,
        stats.hit_rate()
    );
}
