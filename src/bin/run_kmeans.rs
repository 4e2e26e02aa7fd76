//! Cluster a dataset stored as a .npy file and save the centroids.
//!
//! The input is an `(n_samples, n_features)` f64 matrix. Centroids are
//! written as a `(k, n_features)` f64 matrix.
//!
//! Usage: `run-kmeans <input.npy> <output.npy> <k> <method> <seed> <max_iters> <tol>`
//!
//! `method` is one of `random`, `farthest` or `kmeans++`. Log verbosity is read
//! from `KMEANS_LOG` (for example `KMEANS_LOG=debug`).

use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use stepkmeans::{inertia, Dataset, InitMethod, KMeans, KMeansConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = env::var("KMEANS_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();

    if args.len() != 8 {
        eprintln!(
            "Usage: {} <input.npy> <output.npy> <k> <method> <seed> <max_iters> <tol>",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let k: usize = args[3].parse()?;
    let init: InitMethod = args[4].parse()?;
    let seed: u64 = args[5].parse()?;
    let max_iters: usize = args[6].parse()?;
    let tol: f64 = args[7].parse()?;

    if k == 0 {
        return Err("k must be greater than 0".into());
    }

    let reader = BufReader::new(File::open(input_path)?);
    let data: Array2<f64> = Array2::read_npy(reader)?;
    let dataset = Dataset::new(data)?;

    info!(
        n_samples = dataset.len(),
        n_features = dataset.dim(),
        "Loaded {}",
        input_path
    );
    info!(k, %init, seed, max_iters, tol, "Running k-means");

    let config = KMeansConfig::new(k)
        .with_init(init)
        .with_seed(seed)
        .with_max_iters(max_iters)
        .with_tol(tol);

    let mut kmeans = KMeans::with_config(config);
    kmeans.fit(&dataset)?;

    let centroids = kmeans.centroids().ok_or("No centroids after fitting")?;
    if let Some(clusters) = kmeans.clusters() {
        let wcss = inertia(&dataset, &centroids.view(), clusters)?;
        info!(
            iterations = kmeans.n_iterations().unwrap_or(0),
            termination = ?kmeans.termination(),
            sizes = ?clusters.sizes(),
            wcss,
            "Finished"
        );
    }

    let writer = BufWriter::new(File::create(output_path)?);
    centroids.write_npy(writer)?;

    info!("Saved centroids to {}", output_path);

    Ok(())
}
