use crate::config::SimConfig;
use crate::core::domain::{wrap_periodic, Domain};
use crate::core::force::{compute_forces, force_norm};
use crate::core::integrator::{
    Confinement, ForwardEuler, Integrator, StepContext, LEGACY_OBSTACLE_DIAMETER,
};
use crate::core::neighbor::NeighborList;
use crate::core::particle::{Particle, DIM};
use crate::core::polydisperse::{polydisperse_diameters, DiameterStats};
use crate::core::potential::{measure, Measurement, SoftPotential};
use crate::core::random::{SeededUniform, UniformSource};
use crate::error::{Error, Result};

/// Receives the periodic output of a run.
pub trait Observer {
    /// A measurement taken at the start of a step.
    fn on_measurement(&mut self, time: f64, m: &Measurement) -> Result<()>;

    /// A configuration snapshot. Only called when trajectory output is enabled.
    fn on_frame(&mut self, time: f64, sim: &Simulation) -> Result<()>;
}

/// Driven soft-disk foam in a walled, x-periodic channel with a central obstacle.
///
/// Owns all mutable state of a run. Diameters and the box are fixed at
/// construction; positions change every step; the neighbor list changes only
/// when some particle has moved further than the Verlet skin allows.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    domain: Domain,
    particles: Vec<Particle>,
    neighbors: NeighborList,
    forces: Vec<[f64; DIM]>,
    potential: SoftPotential,
    confinement: Confinement,
    integrator: Box<dyn Integrator>,
    step: u64,
    rebuilds: u64,
}

impl Simulation {
    /// Build a run seeded from `config.seed`, or from the clock and
    /// `config.run` when no seed is set.
    pub fn from_config(config: SimConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => SeededUniform::from_seed(seed),
            None => SeededUniform::from_clock(config.run),
        };
        log::info!("seed={}", rng.seed());
        Self::new(config, &mut rng)
    }

    /// Draw diameters, size the box and scatter the particles uniformly in
    /// x and between the walls in y.
    ///
    /// All randomness comes from `rng`; `config.seed` is not consulted here.
    pub fn new<U>(config: SimConfig, rng: &mut U) -> Result<Self>
    where
        U: UniformSource + ?Sized,
    {
        config.validate()?;
        let diameters = polydisperse_diameters(config.n, config.delta, rng)?;
        let stats = DiameterStats::of(&diameters);
        let domain = Domain::from_packing(
            config.phi,
            config.gamma,
            config.w,
            config.sigm_obs,
            stats.sum_of_squares,
        )?;
        log::info!("L_x={:.10}, L_y={:.10}", domain.lx, domain.ly);

        let span = domain.ly - 2.0 * config.w;
        let particles = diameters
            .into_iter()
            .enumerate()
            .map(|(id, d)| {
                let x = rng.next_open01() * domain.lx;
                let y = config.w + rng.next_open01() * span;
                Particle::new(id as u32, [wrap_periodic(x, domain.lx), y], d)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_particles(config, domain, particles)
    }

    /// Simulation over an explicit box and particle set, e.g. a hand-built
    /// configuration. The particle count of `config` is ignored.
    pub fn from_particles(
        config: SimConfig,
        domain: Domain,
        particles: Vec<Particle>,
    ) -> Result<Self> {
        config.validate()?;
        if particles.is_empty() {
            return Err(Error::Config("particle set is empty".into()));
        }
        if config.sigm_obs != LEGACY_OBSTACLE_DIAMETER {
            log::warn!(
                "obstacle diameter {} is used for both box sizing and obstacle forces; \
                 legacy runs always used {} inside the step loop",
                config.sigm_obs,
                LEGACY_OBSTACLE_DIAMETER
            );
        }
        let potential = SoftPotential::new(config.alpha)?;
        let confinement = Confinement {
            wall_offset: config.w,
            stiffness: config.k,
            obstacle_diameter: config.sigm_obs,
        };
        let mut neighbors = NeighborList::new(config.r_neighbor, config.max_neighbors);
        neighbors.rebuild(&particles, &domain)?;
        Ok(Self {
            forces: vec![[0.0; DIM]; particles.len()],
            config,
            domain,
            particles,
            neighbors,
            potential,
            confinement,
            integrator: Box::new(ForwardEuler),
            step: 0,
            rebuilds: 0,
        })
    }

    /// Replace the time-stepping strategy.
    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn neighbors(&self) -> &NeighborList {
        &self.neighbors
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to positions and diameters; the particle count is fixed
    /// for the lifetime of the run.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.step as f64 * self.config.dt
    }

    /// Neighbor-list rebuilds since construction (the initial build excluded).
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    pub fn diameters(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.diameter).collect()
    }

    /// Pair forces used by the last step.
    pub fn forces(&self) -> &[[f64; DIM]] {
        &self.forces
    }

    /// Energy per particle, pressure and shear stress of the current configuration.
    pub fn measure(&self) -> Result<Measurement> {
        measure(&self.particles, &self.domain, &self.neighbors, &self.potential)
    }

    /// Norm of the pair forces of the current configuration.
    pub fn pair_force_norm(&self) -> Result<f64> {
        let mut forces = Vec::with_capacity(self.particles.len());
        compute_forces(
            &self.particles,
            &self.domain,
            &self.neighbors,
            &self.potential,
            &mut forces,
        )?;
        Ok(force_norm(&forces))
    }

    /// One step: refresh the neighbor list if the skin is exhausted, compute pair
    /// forces, then let the integrator move the particles.
    pub fn step(&mut self) -> Result<()> {
        self.refresh_neighbors()?;
        compute_forces(
            &self.particles,
            &self.domain,
            &self.neighbors,
            &self.potential,
            &mut self.forces,
        )?;
        let ctx = StepContext {
            domain: &self.domain,
            confinement: &self.confinement,
            fx_ext: self.config.fx_ext,
            dt: self.config.dt,
        };
        self.integrator.advance(&mut self.particles, &self.forces, &ctx)?;
        self.step += 1;
        Ok(())
    }

    /// Take `steps` steps without any output.
    pub fn advance(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run `total_step` steps, measuring at the start of every `output_step`-th
    /// step and, with trajectory output on, emitting the initial frame plus a
    /// frame after each measured step (labeled with the measurement time).
    pub fn run<O: Observer + ?Sized>(&mut self, observer: &mut O) -> Result<()> {
        let trajectory = self.config.trajectory;
        let output_step = self.config.output_step;
        log::info!(
            "running {} steps of {} with {} particles",
            self.config.total_step,
            self.integrator.name(),
            self.particles.len()
        );
        if trajectory {
            observer.on_frame(self.time(), self)?;
        }
        for _ in 0..self.config.total_step {
            let emit = self.step % output_step == 0;
            let t = self.time();
            if emit {
                let m = self.measure()?;
                log::info!(
                    "t={:.6} energy={:.10e} pressure={:.10e} shear={:.10e}",
                    t,
                    m.energy,
                    m.pressure,
                    m.shear_stress
                );
                observer.on_measurement(t, &m)?;
            }
            self.step()?;
            if emit && trajectory {
                observer.on_frame(t, self)?;
            }
        }
        log::info!(
            "finished at t={:.6} after {} neighbor rebuilds",
            self.time(),
            self.rebuilds
        );
        Ok(())
    }

    fn refresh_neighbors(&mut self) -> Result<()> {
        if self.neighbors.needs_rebuild(&self.particles, &self.domain)? {
            log::debug!(
                "rebuilding neighbor list at step {}: skin {:.6} exhausted",
                self.step,
                self.neighbors.skin_threshold()
            );
            self.neighbors.rebuild(&self.particles, &self.domain)?;
            self.rebuilds += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            n: 40,
            phi: 0.9,
            delta: 0.1,
            gamma: 2.0,
            w: 0.5,
            sigm_obs: 2.0,
            k: 10.0,
            fx_ext: 0.01,
            dt: 0.05,
            output_step: 5,
            total_step: 20,
            ..SimConfig::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        measurements: Vec<f64>,
        frames: Vec<f64>,
    }

    impl Observer for Recorder {
        fn on_measurement(&mut self, time: f64, _m: &Measurement) -> Result<()> {
            self.measurements.push(time);
            Ok(())
        }

        fn on_frame(&mut self, time: f64, sim: &Simulation) -> Result<()> {
            assert_eq!(sim.num_particles(), 40);
            self.frames.push(time);
            Ok(())
        }
    }

    #[test]
    fn initial_positions_inside_channel() -> Result<()> {
        let cfg = small_config();
        let mut rng = SeededUniform::from_seed(11);
        let sim = Simulation::new(cfg.clone(), &mut rng)?;
        let d = *sim.domain();
        assert_eq!(sim.num_particles(), cfg.n);
        for p in sim.particles() {
            assert!((0.0..d.lx).contains(&p.r[0]));
            assert!(p.r[1] >= cfg.w && p.r[1] <= d.ly - cfg.w);
        }
        Ok(())
    }

    #[test]
    fn same_seed_same_trajectory() -> Result<()> {
        let mut a = Simulation::new(small_config(), &mut SeededUniform::from_seed(8))?;
        let mut b = Simulation::new(small_config(), &mut SeededUniform::from_seed(8))?;
        a.advance(10)?;
        b.advance(10)?;
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.step_count(), 10);
        Ok(())
    }

    #[test]
    fn run_respects_output_cadence() -> Result<()> {
        let cfg = SimConfig {
            trajectory: true,
            ..small_config()
        };
        let mut sim = Simulation::new(cfg, &mut SeededUniform::from_seed(3))?;
        let mut rec = Recorder::default();
        sim.run(&mut rec)?;
        let dt = 0.05;
        let expected: Vec<f64> = [0u64, 5, 10, 15].iter().map(|&s| s as f64 * dt).collect();
        assert_eq!(rec.measurements, expected);
        // Initial frame plus one per measured step.
        assert_eq!(rec.frames.len(), 5);
        assert_eq!(rec.frames[0], 0.0);
        assert_eq!(&rec.frames[1..], &expected[..]);
        assert_eq!(sim.step_count(), 20);
        Ok(())
    }

    #[test]
    fn frames_skipped_without_trajectory() -> Result<()> {
        let mut sim = Simulation::new(small_config(), &mut SeededUniform::from_seed(3))?;
        let mut rec = Recorder::default();
        sim.run(&mut rec)?;
        assert!(rec.frames.is_empty());
        assert_eq!(rec.measurements.len(), 4);
        Ok(())
    }

    #[derive(Debug)]
    struct Frozen;

    impl Integrator for Frozen {
        fn name(&self) -> &'static str {
            "frozen"
        }

        fn advance(
            &self,
            _particles: &mut [Particle],
            _forces: &[[f64; DIM]],
            _ctx: &StepContext<'_>,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn installed_integrator_drives_the_steps() -> Result<()> {
        let mut sim = Simulation::new(small_config(), &mut SeededUniform::from_seed(4))?
            .with_integrator(Box::new(Frozen));
        let before = sim.positions();
        sim.advance(5)?;
        assert_eq!(sim.positions(), before);
        assert_eq!(sim.step_count(), 5);
        Ok(())
    }

    #[test]
    fn seeded_config_reproduces_explicit_generator() -> Result<()> {
        let cfg = SimConfig {
            seed: Some(8),
            ..small_config()
        };
        let a = Simulation::from_config(cfg.clone())?;
        let b = Simulation::new(cfg, &mut SeededUniform::from_seed(8))?;
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.diameters(), b.diameters());
        Ok(())
    }

    /// A particle moved by hand far beyond the skin forces a rebuild before the
    /// next force evaluation, so its new contacts act immediately.
    #[test]
    fn moved_particle_triggers_rebuild() -> Result<()> {
        let cfg = SimConfig {
            alpha: 2.0,
            w: 0.0,
            sigm_obs: 0.0,
            k: 0.0,
            fx_ext: 0.0,
            dt: 0.1,
            r_neighbor: 1.5,
            ..SimConfig::default()
        };
        let domain = Domain::new(20.0, 20.0)?;
        let particles = vec![
            Particle::new(0, [5.0, 5.0], 1.0)?,
            Particle::new(1, [5.8, 5.0], 1.0)?,
            Particle::new(2, [15.0, 15.0], 1.0)?,
        ];
        let mut sim = Simulation::from_particles(cfg, domain, particles)?;
        assert!(sim.neighbors().neighbors(2).is_empty());

        sim.particles_mut()[2].set_position([5.4, 5.6])?;
        sim.step()?;
        assert_eq!(sim.rebuild_count(), 1);
        assert_eq!(sim.neighbors().neighbors(2), &[0, 1]);
        // Pushed straight up by two symmetric contacts.
        let r = sim.particles()[2].r;
        assert!((r[0] - 5.4).abs() < 1e-12);
        assert!(r[1] > 5.6);
        Ok(())
    }

    #[test]
    fn invalid_config_rejected_before_start() {
        let cfg = SimConfig {
            phi: 0.0,
            ..small_config()
        };
        assert!(matches!(
            Simulation::new(cfg, &mut SeededUniform::from_seed(1)),
            Err(Error::Config(_))
        ));
    }
}
