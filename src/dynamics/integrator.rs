use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_DAMPING_FACTOR, DEFAULT_GRAVITY, DEFAULT_TIME_STEP},
    core::body::RigidBody,
    utils::math::angular_velocity_to_quat,
};

/// Numerical scheme used for the linear part of a body update. Angular
/// motion always uses the semi-implicit update layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationScheme {
    ExplicitEuler,
    #[default]
    SemiImplicitEuler,
    RungeKutta2,
    RungeKutta4,
}

impl IntegrationScheme {
    pub fn name(&self) -> &'static str {
        match self {
            IntegrationScheme::ExplicitEuler => "explicit euler",
            IntegrationScheme::SemiImplicitEuler => "semi-implicit euler",
            IntegrationScheme::RungeKutta2 => "runge-kutta 2",
            IntegrationScheme::RungeKutta4 => "runge-kutta 4",
        }
    }
}

/// Step-global simulation context threaded through every integration call.
/// There is deliberately no ambient global here: the orchestrator owns one
/// value and hands out references.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepContext {
    pub dt: f32,
    pub gravity: Vec3,
    pub damping: f32,
    pub scheme: IntegrationScheme,
}

impl Default for StepContext {
    fn default() -> Self {
        Self {
            dt: DEFAULT_TIME_STEP,
            gravity: Vec3::from_slice(&DEFAULT_GRAVITY),
            damping: DEFAULT_DAMPING_FACTOR,
            scheme: IntegrationScheme::default(),
        }
    }
}

/// Transient linear state consumed by one Runge-Kutta call; never stored.
#[derive(Debug, Clone, Copy)]
struct LinearState {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
}

#[derive(Debug, Clone, Copy, Default)]
struct Derivative {
    dpos: Vec3,
    dvel: Vec3,
}

fn evaluate(state: &LinearState, derivative: Derivative, dt: f32) -> Derivative {
    Derivative {
        dpos: state.velocity + derivative.dvel * dt,
        dvel: state.acceleration,
    }
}

fn rk2(state: &mut LinearState, dt: f32) {
    let k1 = evaluate(state, Derivative::default(), 0.0);
    let k2 = evaluate(state, k1, dt * 0.5);

    state.position += k2.dpos * dt;
    state.velocity += k2.dvel * dt;
}

fn rk4(state: &mut LinearState, dt: f32) {
    let k1 = evaluate(state, Derivative::default(), 0.0);
    let k2 = evaluate(state, k1, dt * 0.5);
    let k3 = evaluate(state, k2, dt * 0.5);
    let k4 = evaluate(state, k3, dt);

    let dpos = (k1.dpos + (k2.dpos + k3.dpos) * 2.0 + k4.dpos) / 6.0;
    let dvel = (k1.dvel + (k2.dvel + k3.dvel) * 2.0 + k4.dvel) / 6.0;

    state.position += dpos * dt;
    state.velocity += dvel * dt;
}

/// Advances one body by a fixed step. Pure function of the body's state,
/// its accumulated force/torque, and the step context; never touches other
/// bodies, which is what makes the parallel dispatch safe.
///
/// Static and sleeping bodies are excluded up front. Cached transform and
/// bounds are left stale for lazy recompute. Force and torque accumulators
/// are cleared on the way out.
pub fn integrate(body: &mut RigidBody, ctx: &StepContext) {
    if body.is_static || !body.is_awake() {
        return;
    }

    let dt = ctx.dt;
    let damping = ctx.damping;

    // Gravity enters as a velocity increment so immovable bodies stay put.
    if body.inverse_mass > 0.0 {
        body.linear_velocity += ctx.gravity * dt;
    }
    let acceleration = body.force * body.inverse_mass;

    match ctx.scheme {
        IntegrationScheme::ExplicitEuler => {
            // Position first, from the previous step's velocity.
            let position = body.position() + body.linear_velocity * dt;
            body.set_position(position);

            body.linear_velocity += acceleration * dt;
            body.linear_velocity *= damping;

            // Same explicit ordering for the angular half.
            let delta = angular_velocity_to_quat(body.angular_velocity, dt);
            body.set_orientation(delta * body.orientation());
            body.angular_velocity += body.inverse_inertia * body.torque * dt;
            body.angular_velocity *= damping;
        }
        IntegrationScheme::SemiImplicitEuler => {
            body.linear_velocity += acceleration * dt;
            body.linear_velocity *= damping;

            let position = body.position() + body.linear_velocity * dt;
            body.set_position(position);

            integrate_angular_semi_implicit(body, ctx);
        }
        IntegrationScheme::RungeKutta2 => {
            let mut state = LinearState {
                position: body.position(),
                velocity: body.linear_velocity,
                acceleration,
            };
            rk2(&mut state, dt);
            body.set_position(state.position);
            body.linear_velocity = state.velocity * damping;

            integrate_angular_semi_implicit(body, ctx);
        }
        IntegrationScheme::RungeKutta4 => {
            let mut state = LinearState {
                position: body.position(),
                velocity: body.linear_velocity,
                acceleration,
            };
            rk4(&mut state, dt);
            body.set_position(state.position);
            body.linear_velocity = state.velocity * damping;

            integrate_angular_semi_implicit(body, ctx);
        }
    }

    body.force = Vec3::ZERO;
    body.torque = Vec3::ZERO;

    body.rest_test();
}

fn integrate_angular_semi_implicit(body: &mut RigidBody, ctx: &StepContext) {
    body.angular_velocity += body.inverse_inertia * body.torque * ctx.dt;
    body.angular_velocity *= ctx.damping;

    let delta = angular_velocity_to_quat(body.angular_velocity, ctx.dt);
    body.set_orientation(delta * body.orientation());
}
