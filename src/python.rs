use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::SimConfig;
use crate::core::particle::DIM;
use crate::core::Simulation;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing wrapper around the Rust Simulation core.
///
/// - __new__(n, phi, delta, gamma, w, sigm_obs, k, fx_ext, dt, alpha=2.5, r_neighbor=3.0, seed=None)
/// - advance(steps)
/// - measure() -> (energy, pressure, shear_stress)
/// - get_positions() -> np.ndarray, shape (N, 2)
/// - get_diameters() -> np.ndarray, shape (N,)
#[pyclass]
pub struct FoamSim {
    sim: Simulation,
}

#[pymethods]
impl FoamSim {
    /// Initialize a driven foam in a walled channel with a central obstacle.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (n, phi, delta, gamma, w, sigm_obs, k, fx_ext, dt, alpha=2.5, r_neighbor=3.0, seed=None))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        n: usize,
        phi: f64,
        delta: f64,
        gamma: f64,
        w: f64,
        sigm_obs: f64,
        k: f64,
        fx_ext: f64,
        dt: f64,
        alpha: f64,
        r_neighbor: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let config = SimConfig {
            n,
            alpha,
            phi,
            delta,
            gamma,
            w,
            sigm_obs,
            k,
            fx_ext,
            dt,
            r_neighbor,
            seed,
            ..SimConfig::default()
        };
        let sim = Simulation::from_config(config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Take `steps` integration steps (releases the GIL during computation).
    fn advance(&mut self, py: Python<'_>, steps: u64) -> PyResult<()> {
        py.detach(|| self.sim.advance(steps)).map_err(py_err)
    }

    /// Energy per particle, pressure and shear stress of the current configuration.
    fn measure(&self) -> PyResult<(f64, f64, f64)> {
        let m = self.sim.measure().map_err(py_err)?;
        Ok((m.energy, m.pressure, m.shear_stress))
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.particles().iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.r[k];
            }
        }
        arr.into_pyarray(py)
    }

    /// Return diameters as a NumPy array of shape (N,).
    fn get_diameters<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.sim.diameters().into_pyarray(py)
    }

    /// Box edges (L_x, L_y).
    #[getter]
    fn box_size(&self) -> (f64, f64) {
        let d = self.sim.domain();
        (d.lx, d.ly)
    }

    /// Current simulation time.
    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }
}

/// The foamflow Python module entry point.
#[pymodule]
fn foamflow(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<FoamSim>()?;
    Ok(())
}
