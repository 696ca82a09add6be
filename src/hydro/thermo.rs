use super::constants::{C0, CP, CV, GAMMA, P0, RD};
use super::geometry::Direction;
use crate::state::{Variable, NUM_VARS};

/// Pressure from the equation of state, P = C0 * (rho * theta)^gamma.
///
pub fn pressure(density_theta: f64) -> f64 {
    C0 * density_theta.powf(GAMMA)
}

/**
 * Full physical fields at a point, reconstructed by adding the hydrostatic
 * background back onto the stored perturbation variables.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    density: f64,
    velocity_x: f64,
    velocity_z: f64,
    density_theta: f64,
}

impl Primitive {
    /// Reconstruct from perturbation values (indexed by `Variable`) and the
    /// background density and rho * theta at the same height.
    ///
    pub fn reconstruct(q: &[f64; NUM_VARS], hy_dens: f64, hy_dens_theta: f64) -> Self {
        let density = q[Variable::Density.index()] + hy_dens;
        let density_theta = q[Variable::DensityTheta.index()] + hy_dens_theta;
        Self {
            density,
            velocity_x: q[Variable::XMomentum.index()] / density,
            velocity_z: q[Variable::ZMomentum.index()] / density,
            density_theta,
        }
    }

    pub fn mass_density(&self) -> f64 {
        self.density
    }

    pub fn velocity_x(&self) -> f64 {
        self.velocity_x
    }

    pub fn velocity_z(&self) -> f64 {
        self.velocity_z
    }

    pub fn velocity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::X => self.velocity_x,
            Direction::Z => self.velocity_z,
        }
    }

    pub fn potential_temperature(&self) -> f64 {
        self.density_theta / self.density
    }

    pub fn gas_pressure(&self) -> f64 {
        pressure(self.density_theta)
    }

    /// Absolute temperature recovered from theta and the local pressure.
    ///
    pub fn temperature(&self) -> f64 {
        self.potential_temperature() / (P0 / self.gas_pressure()).powf(RD / CP)
    }

    pub fn kinetic_energy_density(&self) -> f64 {
        self.density * (self.velocity_x * self.velocity_x + self.velocity_z * self.velocity_z)
    }

    pub fn internal_energy_density(&self) -> f64 {
        self.density * CV * self.temperature()
    }

    /// Return a copy with the velocity normal to `direction` set to zero.
    ///
    pub fn without_normal_flow(&self, direction: Direction) -> Self {
        let mut p = *self;
        match direction {
            Direction::X => p.velocity_x = 0.0,
            Direction::Z => p.velocity_z = 0.0,
        }
        p
    }

    /// The advective flux through an interface normal to `direction`, with
    /// the pressure (less `reference_pressure`) acting on the normal
    /// momentum component.
    ///
    pub fn flux_vector(&self, direction: Direction, reference_pressure: f64) -> [f64; NUM_VARS] {
        let r = self.density;
        let vn = self.velocity(direction);
        let pg = self.gas_pressure() - reference_pressure;
        [
            r * vn,
            r * vn * self.velocity_x + pg * direction.along(Direction::X),
            r * vn * self.velocity_z + pg * direction.along(Direction::Z),
            r * vn * self.potential_temperature(),
        ]
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::{pressure, Primitive};
    use crate::hydro::constants::{C0, GAMMA, P0};
    use crate::hydro::geometry::Direction;

    #[test]
    fn reconstruction_adds_background_to_perturbation() {
        let p = Primitive::reconstruct(&[0.1, 2.2, -1.1, 30.0], 1.0, 300.0);
        assert!((p.mass_density() - 1.1).abs() < 1e-15);
        assert!((p.velocity_x() - 2.0).abs() < 1e-14);
        assert!((p.velocity_z() + 1.0).abs() < 1e-14);
        assert!((p.potential_temperature() - 300.0).abs() < 1e-12);
    }

    #[test]
    fn pressure_follows_equation_of_state() {
        let rt = 350.0;
        assert_eq!(pressure(rt), C0 * rt.powf(GAMMA));
        let p0_density_theta = (P0 / C0).powf(1.0 / GAMMA);
        assert!((pressure(p0_density_theta) - P0).abs() < 1e-6);
    }

    #[test]
    fn temperature_equals_theta_at_reference_pressure() {
        let rt = (P0 / C0).powf(1.0 / GAMMA);
        let p = Primitive::reconstruct(&[0.0; 4], rt / 300.0, rt);
        assert!((p.temperature() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn flux_vector_puts_pressure_on_the_normal_momentum() {
        let p = Primitive::reconstruct(&[0.0; 4], 1.0, 300.0);
        let fx = p.flux_vector(Direction::X, 0.0);
        let fz = p.flux_vector(Direction::Z, p.gas_pressure());
        assert_eq!(fx, [0.0, p.gas_pressure(), 0.0, 0.0]);
        assert_eq!(fz, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn removing_normal_flow_keeps_the_tangential_velocity() {
        let p = Primitive::reconstruct(&[0.0, 3.0, 4.0, 0.0], 1.0, 300.0);
        let q = p.without_normal_flow(Direction::Z);
        assert_eq!(q.velocity_z(), 0.0);
        assert_eq!(q.velocity_x(), 3.0);
        assert_eq!(q.flux_vector(Direction::Z, 0.0)[0], 0.0);
    }
}
