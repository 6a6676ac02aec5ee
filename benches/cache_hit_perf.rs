//! Cache hit-path microbenchmark: repeated loads of an already-cached model.
//!
//! The hot path is a read-lock lookup plus a deep clone, so this measures
//! clone cost scaling with mesh size.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use skyline_asset::loader::AssetServer;
use skyline_asset::source::{AssetSource, FetchProgress};

struct MapSource {
    files: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl AssetSource for MapSource {
    async fn fetch(&self, path: &str, _progress: FetchProgress<'_>) -> std::io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

/// Generate an OBJ grid with `side * side` quads
fn grid_obj(side: usize) -> String {
    let mut obj = String::new();
    for z in 0..=side {
        for x in 0..=side {
            obj.push_str(&format!("v {} 0.0 {}\n", x as f32, z as f32));
        }
    }
    let stride = side + 1;
    for z in 0..side {
        for x in 0..side {
            let a = z * stride + x + 1;
            let b = a + 1;
            let c = a + stride + 1;
            let d = a + stride;
            obj.push_str(&format!("f {a} {b} {c}\nf {a} {c} {d}\n"));
        }
    }
    obj
}

fn bench_cached_model_load(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("cached_model_load");
    for side in [8usize, 32, 64] {
        let mut files = HashMap::new();
        files.insert("grid.obj".to_string(), grid_obj(side).into_bytes());
        let server = AssetServer::new(Arc::new(MapSource { files }));

        runtime.block_on(async {
            server
                .load_model("grid.obj")
                .await
                .expect("grid decodes");
        });

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                runtime.block_on(async {
                    server.load_model("grid.obj").await.expect("cache hit")
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cached_model_load);
criterion_main!(benches);
