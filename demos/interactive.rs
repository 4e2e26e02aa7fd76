//! Step through k-means one iteration at a time with each seeding strategy
//!
//! Run with: cargo run --example interactive

use ndarray::array;
use stepkmeans::{GeneratorConfig, InitMethod, SessionStore, Termination};

fn main() {
    println!("=== stepkmeans interactive example ===\n");

    let k = 3;
    let max_steps = 20;
    let mut store = SessionStore::new();
    let id = store.create_seeded(42);
    let session = store.get_mut(id).expect("session was just created");

    let dataset = session
        .generate_data(&GeneratorConfig::default())
        .expect("default generator config is valid")
        .clone();
    println!(
        "Session {}: generated {} points in [0, 100) x [0, 100)\n",
        id,
        dataset.len()
    );

    let manual = array![[25.0, 25.0], [50.0, 75.0], [75.0, 25.0]];

    for method in InitMethod::ALL {
        let manual_centroids = (method == InitMethod::Manual).then(|| manual.view());
        let centroids = session
            .initialize_session(dataset.clone(), k, method, manual_centroids)
            .expect("initialization failed");

        println!("--- {} ---", method);
        print_centroids("Initial", centroids);

        let mut termination = Termination::Capped;
        for _ in 0..max_steps {
            let previous = session.centroids().cloned();
            let step = session.advance().expect("session is initialized");

            let sizes = step.clusters.sizes();
            println!(
                "  Iteration {:>2}: cluster sizes {:?}{}",
                session.iteration(),
                sizes,
                if step.reseeded.is_empty() {
                    String::new()
                } else {
                    format!(", reseeded {:?}", step.reseeded)
                }
            );

            if previous.as_ref() == Some(&step.centroids) {
                termination = Termination::Converged;
                break;
            }
        }

        print_centroids("Final", session.centroids().expect("session is initialized"));
        println!("  Stopped: {:?} after {} steps\n", termination, session.iteration());
    }

    println!("=== Done! ===");
}

fn print_centroids(label: &str, centroids: &ndarray::Array2<f64>) {
    println!("  {} centroids:", label);
    for (i, c) in centroids.outer_iter().enumerate() {
        println!("    Centroid {}: ({:.4}, {:.4})", i, c[0], c[1]);
    }
}
