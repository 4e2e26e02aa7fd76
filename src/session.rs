//! Per-caller clustering state for interactive, one-iteration-at-a-time use.
//!
//! A [`Session`] owns its dataset, current centroids and clusters, iteration
//! counter, and random generator. A [`SessionStore`] hands out sessions by
//! [`SessionId`]; every mutation goes through `&mut`, so a host that serves
//! callers concurrently must put the store (or each session) behind a lock.

use crate::algorithm::{run_to_convergence, step, ClusterAssignment, ConvergenceResult, StepResult};
use crate::config::GeneratorConfig;
use crate::dataset::{generate_random_dataset, Dataset};
use crate::error::{KMeansError, Result};
use crate::init::{initialize, InitMethod};
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque session key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Centroids and clusters of an initialized session
#[derive(Debug, Clone, PartialEq)]
struct ClusterState {
    k: usize,
    centroids: Array2<f64>,
    clusters: ClusterAssignment,
}

/// One interactive clustering session.
pub struct Session {
    id: SessionId,
    rng: ChaCha8Rng,
    dataset: Option<Dataset>,
    state: Option<ClusterState>,
    iteration: usize,
}

impl Session {
    /// New empty session drawing randomness from OS entropy
    pub fn new(id: SessionId) -> Self {
        Self::with_rng(id, ChaCha8Rng::from_entropy())
    }

    /// New empty session with a reproducible random stream
    pub fn seeded(id: SessionId, seed: u64) -> Self {
        Self::with_rng(id, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(id: SessionId, rng: ChaCha8Rng) -> Self {
        Self {
            id,
            rng,
            dataset: None,
            state: None,
            iteration: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Replace the dataset with a freshly generated random one and clear any
    /// clustering state.
    pub fn generate_data(&mut self, config: &GeneratorConfig) -> Result<&Dataset> {
        let dataset = generate_random_dataset(config, &mut self.rng)?;
        Ok(self.reset_with(dataset))
    }

    /// Replace the dataset and clear centroids, clusters and k.
    pub fn reset_with(&mut self, dataset: Dataset) -> &Dataset {
        tracing::debug!(session = %self.id, n_points = dataset.len(), "Session reset");
        self.state = None;
        self.iteration = 0;
        self.dataset.insert(dataset)
    }

    /// Seed `k` centroids over `dataset` and make it the session's data.
    ///
    /// The cluster assignment starts as `k` empty clusters and the iteration
    /// counter restarts at zero. On error the session is left unchanged.
    pub fn initialize_session(
        &mut self,
        dataset: Dataset,
        k: usize,
        method: InitMethod,
        manual_centroids: Option<ArrayView2<'_, f64>>,
    ) -> Result<&Array2<f64>> {
        let centroids = initialize(&dataset, k, method, manual_centroids, &mut self.rng)?;

        tracing::debug!(session = %self.id, k, %method, "Session initialized");
        self.dataset = Some(dataset);
        self.iteration = 0;
        let state = self.state.insert(ClusterState {
            k,
            centroids,
            clusters: ClusterAssignment::empty(k),
        });
        Ok(&state.centroids)
    }

    /// Run one iteration on the stored state.
    ///
    /// The returned clusters were computed against the centroids stored
    /// before this call; the returned centroids are the new stored ones.
    ///
    /// # Errors
    ///
    /// Returns [`KMeansError::UninitializedSession`] before
    /// [`initialize_session`](Self::initialize_session).
    pub fn advance(&mut self) -> Result<StepResult> {
        let (dataset, state) = match (&self.dataset, &mut self.state) {
            (Some(dataset), Some(state)) => (dataset, state),
            _ => return Err(KMeansError::UninitializedSession),
        };

        let result = step(dataset, &state.centroids.view(), &mut self.rng)?;
        state.centroids = result.centroids.clone();
        state.clusters = result.clusters.clone();
        self.iteration += 1;

        tracing::debug!(session = %self.id, iteration = self.iteration, "Session advanced");
        Ok(result)
    }

    /// Iterate the stored state to convergence (batch mode).
    ///
    /// Stored centroids and clusters are replaced by the final ones and the
    /// iteration counter grows by the number of steps taken.
    pub fn run_to_convergence(&mut self, max_iters: usize, tol: f64) -> Result<ConvergenceResult> {
        let (dataset, state) = match (&self.dataset, &mut self.state) {
            (Some(dataset), Some(state)) => (dataset, state),
            _ => return Err(KMeansError::UninitializedSession),
        };

        let result = run_to_convergence(
            dataset,
            state.k,
            &state.centroids.view(),
            max_iters,
            tol,
            &mut self.rng,
        )?;
        if result.n_iterations > 0 {
            state.centroids = result.centroids.clone();
            state.clusters = result.clusters.clone();
        }
        self.iteration += result.n_iterations;
        Ok(result)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.state.as_ref().map(|s| &s.centroids)
    }

    pub fn clusters(&self) -> Option<&ClusterAssignment> {
        self.state.as_ref().map(|s| &s.clusters)
    }

    /// Cluster count, or `None` before initialization
    pub fn k(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.k)
    }

    /// Steps taken since the last initialization or reset
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("n_points", &self.dataset.as_ref().map(Dataset::len))
            .field("k", &self.k())
            .field("iteration", &self.iteration)
            .finish()
    }
}

/// Sessions keyed by [`SessionId`]
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session with an entropy-seeded generator
    pub fn create(&mut self) -> SessionId {
        self.insert(Session::new(SessionId::new()))
    }

    /// Open a session whose random choices are reproducible from `seed`
    pub fn create_seeded(&mut self, seed: u64) -> SessionId {
        self.insert(Session::seeded(SessionId::new(), seed))
    }

    fn insert(&mut self, session: Session) -> SessionId {
        let id = session.id();
        tracing::debug!(session = %id, "Session created");
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Result<&Session> {
        self.sessions.get(&id).ok_or(KMeansError::UnknownSession(id))
    }

    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut Session> {
        self.sessions
            .get_mut(&id)
            .ok_or(KMeansError::UnknownSession(id))
    }

    /// Drop a session, returning it if it existed
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let removed = self.sessions.remove(&id);
        if removed.is_some() {
            tracing::debug!(session = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn four_points() -> Dataset {
        Dataset::new(array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_advance_before_initialize() {
        let mut session = Session::seeded(SessionId::new(), 0);
        assert!(matches!(
            session.advance(),
            Err(KMeansError::UninitializedSession)
        ));

        session.reset_with(four_points());
        assert!(matches!(
            session.advance(),
            Err(KMeansError::UninitializedSession)
        ));
    }

    #[test]
    fn test_initialize_sets_empty_clusters() {
        let mut session = Session::seeded(SessionId::new(), 0);
        session
            .initialize_session(four_points(), 3, InitMethod::Random, None)
            .unwrap();

        assert_eq!(session.k(), Some(3));
        assert_eq!(session.centroids().unwrap().nrows(), 3);
        assert_eq!(session.clusters(), Some(&ClusterAssignment::empty(3)));
        assert_eq!(session.iteration(), 0);
    }

    #[test]
    fn test_advance_updates_state() {
        let mut session = Session::seeded(SessionId::new(), 0);
        let manual = array![[0.0, 0.0], [10.0, 0.0]];
        session
            .initialize_session(four_points(), 2, InitMethod::Manual, Some(manual.view()))
            .unwrap();

        let first = session.advance().unwrap();
        assert_eq!(first.centroids, array![[0.0, 0.5], [10.0, 0.5]]);
        assert_eq!(session.centroids(), Some(&first.centroids));
        assert_eq!(session.clusters(), Some(&first.clusters));
        assert_eq!(session.iteration(), 1);

        let second = session.advance().unwrap();
        assert_eq!(second.centroids, first.centroids);
        assert_eq!(session.iteration(), 2);
    }

    #[test]
    fn test_failed_initialize_keeps_previous_state() {
        let mut session = Session::seeded(SessionId::new(), 0);
        session
            .initialize_session(four_points(), 2, InitMethod::Random, None)
            .unwrap();
        session.advance().unwrap();
        let before = session.centroids().cloned();

        let result = session.initialize_session(four_points(), 5, InitMethod::Random, None);
        assert!(matches!(result, Err(KMeansError::InsufficientData(_))));
        assert_eq!(session.centroids().cloned(), before);
        assert_eq!(session.iteration(), 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = Session::seeded(SessionId::new(), 0);
        session
            .initialize_session(four_points(), 2, InitMethod::Farthest, None)
            .unwrap();
        session.advance().unwrap();

        session.reset_with(four_points());
        assert!(!session.is_initialized());
        assert_eq!(session.k(), None);
        assert_eq!(session.iteration(), 0);
        assert_eq!(session.dataset().unwrap().len(), 4);
    }

    #[test]
    fn test_generate_data() {
        let mut session = Session::seeded(SessionId::new(), 8);
        let n = session.generate_data(&GeneratorConfig::default()).unwrap().len();
        assert_eq!(n, 50);
        assert!(!session.is_initialized());
    }

    #[test]
    fn test_session_run_to_convergence() {
        let mut session = Session::seeded(SessionId::new(), 0);
        let manual = array![[0.0, 0.0], [10.0, 0.0]];
        session
            .initialize_session(four_points(), 2, InitMethod::Manual, Some(manual.view()))
            .unwrap();

        let result = session.run_to_convergence(100, 0.0).unwrap();
        assert!(result.converged());
        assert_eq!(session.iteration(), result.n_iterations);
        assert_eq!(session.centroids(), Some(&array![[0.0, 0.5], [10.0, 0.5]]));
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());

        let a = store.create_seeded(1);
        let b = store.create();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        store
            .get_mut(a)
            .unwrap()
            .initialize_session(four_points(), 2, InitMethod::Random, None)
            .unwrap();
        assert!(store.get(a).unwrap().is_initialized());
        assert!(!store.get(b).unwrap().is_initialized());

        assert!(store.remove(a).is_some());
        assert!(matches!(store.get(a), Err(KMeansError::UnknownSession(id)) if id == a));
        assert!(store.remove(a).is_none());
    }
}
