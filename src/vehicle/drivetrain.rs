use super::VehicleParams;
use crate::math::GRAVITY;

/// Speeds below this are treated as standing still, in m/s.
const STANDSTILL_SPEED: f64 = 1e-6;

/// The longitudinal force model of a vehicle with a rigid drivetrain.
///
/// The engine is locked to the wheels through a fixed gear ratio, so engine
/// speed follows directly from road speed.
#[derive(Clone, Debug)]
pub struct Drivetrain {
    mass: f64,
    gear_ratio: f64,
    effective_radius: f64,
    torque: [f64; 3],
    drag: f64,
    rolling: f64,
    max_force: f64,
    max_braking_force: f64,
}

impl Drivetrain {
    pub fn new(params: &VehicleParams) -> Self {
        Self {
            mass: params.mass,
            gear_ratio: params.gear_ratio,
            effective_radius: params.effective_radius,
            torque: params.torque_coefficients,
            drag: params.aerodynamic_coefficient,
            rolling: params.friction_coefficient,
            max_force: params.max_force,
            max_braking_force: params.max_braking_force,
        }
    }

    /// The engine angular velocity in rad/s at road speed `vel`.
    pub fn engine_speed(&self, vel: f64) -> f64 {
        vel / (self.gear_ratio * self.effective_radius)
    }

    /// The engine torque at `throttle` and engine speed `omega`. Never negative.
    pub fn engine_torque(&self, throttle: f64, omega: f64) -> f64 {
        let [a0, a1, a2] = self.torque;
        f64::max(throttle * (a0 + a1 * omega + a2 * omega * omega), 0.0)
    }

    /// The tractive force at the wheels in N.
    pub fn drive_force(&self, throttle: f64, vel: f64) -> f64 {
        let torque = self.engine_torque(throttle, self.engine_speed(vel));
        f64::min(torque / (self.gear_ratio * self.effective_radius), self.max_force)
    }

    /// The brake force in N. Brakes only act on a moving vehicle.
    pub fn brake_force(&self, braking: f64, vel: f64) -> f64 {
        if vel > STANDSTILL_SPEED {
            braking * self.max_braking_force
        } else {
            0.0
        }
    }

    /// The combined aerodynamic drag and rolling resistance in N.
    pub fn resistance(&self, vel: f64, driven: bool) -> f64 {
        if vel <= STANDSTILL_SPEED && !driven {
            return 0.0;
        }
        self.drag * vel * vel + self.rolling * self.mass * GRAVITY
    }

    /// The longitudinal acceleration in m/s^2.
    ///
    /// A stationary vehicle never accelerates backwards; resistance only
    /// cancels drive force up to its own magnitude.
    pub fn acceleration(&self, throttle: f64, braking: f64, vel: f64) -> f64 {
        let drive = self.drive_force(throttle, vel);
        let brake = self.brake_force(braking, vel);
        let resist = self.resistance(vel, drive > 0.0);
        let net = drive - brake - resist;
        if vel <= STANDSTILL_SPEED {
            f64::max(net, 0.0) / self.mass
        } else {
            net / self.mass
        }
    }
}
