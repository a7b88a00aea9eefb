use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    collision::{
        broadphase::{Broadphase, CollisionPair, SpatialGridBroadphase},
        manifold::Manifold,
        narrowphase::CollisionDetector,
    },
    config::{INTEGRATION_BATCH_SIZE, MAX_UPDATES_PER_FRAME},
    core::body::BodyHandle,
    dynamics::{
        constraint::Constraint,
        integrator::{integrate, IntegrationScheme, StepContext},
        solver::SequentialImpulseSolver,
    },
    utils::logging::{report_overload, warn_if_step_over_budget, StageSpan},
};

/// Host-scene boundary: yields the current set of entities carrying a
/// physics aspect, once per step. The core clones the handles into its
/// working set and never mutates host structure; additions and removals on
/// the host side take effect at the next step's snapshot.
pub trait BodySource {
    fn visit_bodies(&self, visit: &mut dyn FnMut(&BodyHandle));
}

impl BodySource for [BodyHandle] {
    fn visit_bodies(&self, visit: &mut dyn FnMut(&BodyHandle)) {
        for handle in self {
            visit(handle);
        }
    }
}

impl BodySource for Vec<BodyHandle> {
    fn visit_bodies(&self, visit: &mut dyn FnMut(&BodyHandle)) {
        self.as_slice().visit_bodies(visit);
    }
}

/// How a host-frame tick maps onto simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepMode {
    /// The elapsed wall time becomes the step size and exactly one step
    /// runs.
    SingleStep,
    /// Elapsed time feeds a persistent accumulator consumed in fixed-size
    /// steps, with bounded catch-up.
    #[default]
    Accumulated,
}

/// Per-step counters surfaced to the diagnostics/editor layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepMetrics {
    pub steps_executed: u64,
    pub body_count: usize,
    pub pair_count: usize,
    pub manifold_count: usize,
    pub contact_count: usize,
    /// Total simulated time discarded by overload handling.
    pub dropped_time: f32,
}

/// Central orchestrator: owns the fixed-timestep accumulator and sequences
/// broadphase → narrowphase → solver → parallel integration each step.
pub struct PhysicsWorld {
    context: StepContext,
    paused: bool,
    mode: StepMode,
    accumulator: f32,
    bodies: Vec<BodyHandle>,
    pairs: Vec<CollisionPair>,
    manifolds: Vec<Manifold>,
    constraints: Vec<Box<dyn Constraint>>,
    broadphase: Box<dyn Broadphase>,
    detector: CollisionDetector,
    solver: SequentialImpulseSolver,
    metrics: StepMetrics,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// A new world boots paused with the default fixed step, gravity,
    /// damping, and scheme.
    pub fn new() -> Self {
        Self {
            context: StepContext::default(),
            paused: true,
            mode: StepMode::default(),
            accumulator: 0.0,
            bodies: Vec::new(),
            pairs: Vec::new(),
            manifolds: Vec::new(),
            constraints: Vec::new(),
            broadphase: Box::new(SpatialGridBroadphase::default()),
            detector: CollisionDetector::new(),
            solver: SequentialImpulseSolver::default(),
            metrics: StepMetrics::default(),
        }
    }

    pub fn set_broadphase<B: Broadphase + 'static>(&mut self, broadphase: B) {
        self.broadphase = Box::new(broadphase);
    }

    pub fn set_solver_iterations(&mut self, iterations: u32) {
        self.solver = SequentialImpulseSolver::new(iterations);
    }

    pub fn step_mode(&self) -> StepMode {
        self.mode
    }

    pub fn set_step_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    pub fn time_step(&self) -> f32 {
        self.context.dt
    }

    pub fn set_time_step(&mut self, dt: f32) {
        if dt > 0.0 {
            self.context.dt = dt;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Idempotent: pausing while paused (or resuming while running) only
    /// touches the flag.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn gravity(&self) -> Vec3 {
        self.context.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.context.gravity = gravity;
    }

    pub fn damping(&self) -> f32 {
        self.context.damping
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.context.damping = damping;
    }

    pub fn scheme(&self) -> IntegrationScheme {
        self.context.scheme
    }

    pub fn set_scheme(&mut self, scheme: IntegrationScheme) {
        self.context.scheme = scheme;
    }

    pub fn metrics(&self) -> StepMetrics {
        self.metrics
    }

    pub fn body_count(&self) -> usize {
        self.metrics.body_count
    }

    pub fn pair_count(&self) -> usize {
        self.metrics.pair_count
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Leftover unsimulated time; stays within [0, dt) in steady state.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn add_constraint<C: Constraint + 'static>(&mut self, constraint: C) {
        self.constraints.push(Box::new(constraint));
    }

    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
    }

    /// First body in the current working set carrying `name`.
    pub fn find_body_by_name(&self, name: &str) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .find(|handle| {
                handle
                    .read()
                    .name
                    .as_deref()
                    .is_some_and(|candidate| candidate == name)
            })
            .cloned()
    }

    /// Host-frame tick. Does nothing while paused (beyond leaving every
    /// accessor usable); otherwise advances per the configured step mode.
    pub fn update(&mut self, elapsed: f32, scene: &dyn BodySource) {
        if self.paused || elapsed <= 0.0 {
            return;
        }

        match self.mode {
            StepMode::SingleStep => {
                let fixed = self.context.dt;
                self.context.dt = elapsed;
                self.step(scene);
                self.context.dt = fixed;
            }
            StepMode::Accumulated => {
                self.accumulator += elapsed;

                let mut updates = 0;
                while self.accumulator >= self.context.dt && updates < MAX_UPDATES_PER_FRAME {
                    self.accumulator -= self.context.dt;
                    self.step(scene);
                    updates += 1;
                }

                // Bounded catch-up exhausted: drop the surplus rather than
                // spiral, and keep simulating from a fresh accumulator.
                if self.accumulator >= self.context.dt {
                    report_overload(self.accumulator);
                    self.metrics.dropped_time += self.accumulator;
                    self.accumulator = 0.0;
                }
            }
        }
    }

    fn step(&mut self, scene: &dyn BodySource) {
        let step_start = Instant::now();

        self.bodies.clear();
        self.manifolds.clear();
        self.pairs.clear();

        {
            let bodies = &mut self.bodies;
            scene.visit_bodies(&mut |handle| bodies.push(handle.clone()));
        }

        {
            let _span = StageSpan::enter("broadphase");
            self.broadphase
                .find_potential_pairs(&self.bodies, &mut self.pairs);
        }

        {
            let _span = StageSpan::enter("narrowphase");
            self.narrow_phase();
        }

        {
            let _span = StageSpan::enter("solver");
            self.solver
                .solve(&mut self.manifolds, &mut self.constraints, self.context.dt);
        }

        {
            let _span = StageSpan::enter("integrate");
            self.integrate_bodies();
        }

        warn_if_step_over_budget(step_start.elapsed(), self.context.dt);

        self.metrics.steps_executed += 1;
        self.metrics.body_count = self.bodies.len();
        self.metrics.pair_count = self.pairs.len();
        self.metrics.manifold_count = self.manifolds.len();
        self.metrics.contact_count = self
            .manifolds
            .iter()
            .map(|manifold| manifold.contacts.len())
            .sum();
    }

    fn narrow_phase(&mut self) {
        for i in 0..self.pairs.len() {
            let pair = self.pairs[i];
            let handle_a = &self.bodies[pair.a];
            let handle_b = &self.bodies[pair.b];
            if Arc::ptr_eq(handle_a, handle_b) {
                continue;
            }

            let mut a = handle_a.write();
            let mut b = handle_b.write();

            // Missing shapes exclude the pair, silently.
            let Some(data) = self.detector.test_pair(&a, &b) else {
                continue;
            };

            // Both sides must agree to a physical response; a veto discards
            // the pair without invalidating the detection itself.
            let ok_a = a.fire_collision_event(&b);
            let ok_b = b.fire_collision_event(&a);
            if !(ok_a && ok_b) {
                continue;
            }

            // Contact with a moving body wakes a sleeping partner; static
            // bodies never wake anyone.
            let a_moving = a.is_awake() && !a.is_static;
            let b_moving = b.is_awake() && !b.is_static;
            if a_moving && !b.is_awake() {
                b.wake();
            }
            if b_moving && !a.is_awake() {
                a.wake();
            }

            if let Some(manifold) = self.detector.build_manifold(handle_a, handle_b, &a, &b, data)
            {
                self.manifolds.push(manifold);
            }
        }
    }

    /// Stage (5): per-body integration dispatched over fixed-size batches.
    /// The only parallel section in the core; safe because each work item
    /// writes a single body and reads only that body plus the step context.
    /// Returns after all batches complete.
    fn integrate_bodies(&mut self) {
        let ctx = self.context;

        #[cfg(feature = "parallel")]
        self.bodies
            .par_chunks(INTEGRATION_BATCH_SIZE)
            .for_each(|batch| {
                for handle in batch {
                    integrate(&mut handle.write(), &ctx);
                }
            });

        #[cfg(not(feature = "parallel"))]
        for batch in self.bodies.chunks(INTEGRATION_BATCH_SIZE) {
            for handle in batch {
                integrate(&mut handle.write(), &ctx);
            }
        }
    }
}
