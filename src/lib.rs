//! # stepkmeans
//!
//! Interactive k-means clustering built on ndarray. Cluster a dataset in
//! one call, or advance it one iteration at a time to watch centroids move.
//!
//! ## Features
//!
//! - **Four seeding strategies**: `random`, `farthest`, `kmeans++` and `manual`
//!   (see [`InitMethod`])
//! - **Single-step iteration**: [`step`] returns the assignment it used and the
//!   centroids it produced, so each iteration can be rendered
//! - **Iterate to convergence**: [`run_to_convergence`] with an iteration cap
//!   and exact-equality or tolerance-based stopping
//! - **Explicit sessions**: [`SessionStore`] keeps per-caller state keyed by
//!   [`SessionId`], with the random generator owned by each [`Session`]
//! - **Reproducible**: every random choice comes from a caller-supplied
//!   generator, so a fixed seed gives fixed results
//!
//! ## Example
//!
//! ```rust
//! use stepkmeans::{initialize, run_to_convergence, Dataset, InitMethod};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let dataset = Dataset::from_points(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![10.0, 0.0],
//!     vec![10.0, 1.0],
//! ])
//! .unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let initial = initialize(&dataset, 2, InitMethod::Farthest, None, &mut rng).unwrap();
//! let result = run_to_convergence(&dataset, 2, &initial.view(), 100, 0.0, &mut rng).unwrap();
//!
//! assert!(result.converged());
//! assert_eq!(result.clusters.n_assigned(), 4);
//! ```
//!
//! ## Step by step
//!
//! ```rust
//! use stepkmeans::{GeneratorConfig, InitMethod, SessionStore};
//!
//! let mut store = SessionStore::new();
//! let id = store.create_seeded(7);
//! let session = store.get_mut(id).unwrap();
//!
//! let dataset = session.generate_data(&GeneratorConfig::default()).unwrap().clone();
//! session.initialize_session(dataset, 3, InitMethod::KMeansPlusPlus, None).unwrap();
//!
//! for _ in 0..5 {
//!     let step = session.advance().unwrap();
//!     assert_eq!(step.clusters.k(), 3);
//! }
//! assert_eq!(session.iteration(), 5);
//! ```

mod algorithm;
mod config;
mod dataset;
mod distance;
mod error;
mod init;
mod kmeans;
mod session;

pub use algorithm::{
    assign, inertia, run_to_convergence, step, ClusterAssignment, ClusteringOutput,
    ConvergenceResult, StepResult, Termination,
};
pub use config::{GeneratorConfig, KMeansConfig, DEFAULT_MAX_ITERS};
pub use dataset::{generate_random_dataset, Dataset};
pub use distance::{compute_centroid_shift, distance};
pub use error::{KMeansError, Result};
pub use init::{initialize, InitMethod};
pub use kmeans::KMeans;
pub use session::{Session, SessionId, SessionStore};
