//! Engine-wide default constants for the Kinetica core.

/// Default gravity vector applied to dynamic bodies (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Default fixed simulation timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Uniform velocity damping multiplier applied each step. Must stay below 1
/// to bound numerical energy growth.
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.999;

/// Number of impulse-application passes the solver runs per step.
pub const SOLVER_ITERATIONS: u32 = 50;

/// Bounded catch-up: at most this many fixed steps per host-frame tick.
/// Accumulated time beyond this is dropped and reported.
pub const MAX_UPDATES_PER_FRAME: u32 = 5;

/// Bodies per work item when the integration stage is dispatched to the
/// worker pool.
pub const INTEGRATION_BATCH_SIZE: usize = 16;

/// Default cell size for the uniform-grid broad phase.
pub const DEFAULT_BROADPHASE_CELL_SIZE: f32 = 5.0;

/// Baumgarte positional-correction factor used by contact resolution.
pub const BAUMGARTE_SCALAR: f32 = 0.2;

/// Penetration depth tolerated before positional correction kicks in.
pub const BAUMGARTE_SLOP: f32 = 0.01;

/// Smoothed velocity magnitude below which a body is considered at rest.
pub const REST_VELOCITY_THRESHOLD: f32 = 0.05;

/// Consecutive sub-threshold frames required before a body goes to sleep.
pub const REST_FRAME_COUNT: u32 = 30;
