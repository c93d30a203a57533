//! Run manager: builds an [`ExplicitSystem`] from a configuration, advances
//! it to the end time and writes restartable state dumps.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::{estimate_stable_timestep, ExplicitSystem};
use crate::config::{resolve, ColumnSource, Config};
use crate::error::{FEAError, FEAResult};
use crate::math::{ValueCompare, Vec as FEVec};
use crate::mesh::Mesh;
use crate::results::RunSummary;

/// Output and progress settings of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Log construction and progress messages
    pub verbose: bool,
    /// Dump every `save_frequency` iterations, 0 for initial and final only
    pub save_frequency: usize,
    /// Prefix of state JSON dumps
    pub state_filename: String,
    /// Prefix of displacement dumps
    pub nodal_displacements_filename: String,
    /// Prefix of velocity dumps
    pub nodal_velocities_filename: String,
    /// Prefix of nodal force dumps
    pub nodal_forces_filename: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            save_frequency: 0,
            state_filename: "state".to_string(),
            nodal_displacements_filename: "nodal_displacements".to_string(),
            nodal_velocities_filename: "nodal_velocities".to_string(),
            nodal_forces_filename: "nodal_forces".to_string(),
        }
    }
}

/// Drives an explicit analysis from a [`Config`]
pub struct SimulationManager {
    config: Config,
    base_dir: PathBuf,
    options: ManagerOptions,
    system: ExplicitSystem,
    start_time: f64,
    end_time: f64,
    dt: f64,
    iteration_number: usize,
    dumps_written: usize,
}

impl SimulationManager {
    /// Load a configuration file; relative paths resolve against its directory
    pub fn from_config_file(path: impl AsRef<Path>) -> FEAResult<Self> {
        let path = path.as_ref();
        let config = Config::from_file(path)?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let base_dir = fs::canonicalize(parent)?;

        Self::from_config(config, base_dir)
    }

    /// Build the mesh and integrator described by `config`
    pub fn from_config(config: Config, base_dir: impl AsRef<Path>) -> FEAResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config.resolved(&base_dir);
        let options = config.options.manager.clone();
        let start = Instant::now();

        if options.verbose {
            info!("Beginning construction of system");
        }
        let nodes = config.load_nodes(&base_dir)?;
        let elements = config.load_elements(&base_dir)?;
        let bcs = config.load_boundary_conditions(&base_dir)?;

        if options.verbose {
            info!("Creating mesh");
        }
        let mesh = Mesh::new(&nodes, &elements, bcs)?;

        let forces = config.load_forces(&base_dir)?;
        let displacements = config.load_initial_displacements(&base_dir, mesh.num_dofs())?;
        let velocities = config.load_initial_velocities(&base_dir, mesh.num_dofs())?;

        let dt = match config.options.time_step {
            Some(dt) => dt,
            None => estimate_stable_timestep(&nodes, &elements).ok_or_else(|| {
                FEAError::Config("cannot estimate a stable time step without elements".to_string())
            })?,
        };

        let system = ExplicitSystem::new(
            mesh,
            forces,
            displacements,
            velocities,
            config.start_time,
            config.options.explicit,
        )?;

        if options.verbose {
            info!(
                "Constructed system of {} elements and {} nodes in {:.3} seconds",
                elements.len(),
                nodes.len(),
                start.elapsed().as_secs_f64()
            );
            info!("Time step is {:e} seconds", dt);
        }

        Ok(Self {
            start_time: config.start_time,
            end_time: config.end_time,
            iteration_number: config.iteration_number,
            config,
            base_dir,
            options,
            system,
            dt,
            dumps_written: 0,
        })
    }

    /// Advance to the end time, dumping state along the way
    pub fn run(&mut self) -> FEAResult<RunSummary> {
        let start = Instant::now();
        let compare = ValueCompare::<f64>::new();
        let period = self.end_time - self.start_time;
        let mut old_percent = 0;

        if self.options.verbose {
            info!("Starting analysis: saving initial system state");
        }
        self.dump_system()?;

        while compare.less_than(self.system.time(), self.end_time) {
            self.system.update(self.dt)?;
            self.iteration_number += 1;

            let save_frequency = self.options.save_frequency;
            if save_frequency > 0 && self.iteration_number % save_frequency == 0 {
                self.dump_system()?;
            }

            if self.options.verbose && period > 0.0 {
                let new_percent =
                    ((self.system.time() - self.start_time) / period * 100.0 + 0.1) as i64;
                if new_percent > old_percent {
                    info!("{}% completed", new_percent);
                    old_percent = new_percent;
                }
            }
        }

        if self.options.verbose {
            info!("Saving final system state");
        }
        self.dump_system()?;

        if self.options.verbose {
            info!(
                "Explicit time integration completed in {:.3} seconds",
                start.elapsed().as_secs_f64()
            );
        }

        Ok(RunSummary {
            iterations: self.iteration_number,
            final_time: self.system.time(),
            time_step: self.dt,
            dumps_written: self.dumps_written,
            ..RunSummary::default()
        }
        .with_max_displacement(self.system.displacements())
        .with_max_force(&self.system.forces()))
    }

    /// Index used in dump file names for the current iteration
    pub fn dump_index(&self) -> usize {
        self.iteration_number / self.options.save_frequency.max(1)
    }

    fn output_path(&self, prefix: &str, tail: &str, extension: &str) -> PathBuf {
        resolve(&self.base_dir, Path::new(&format!("{}{}.{}", prefix, tail, extension)))
    }

    /// Write displacements, velocities, forces and a restartable state file
    pub fn dump_system(&mut self) -> FEAResult<()> {
        let tail = format!("_{:05}", self.dump_index());

        let displacements_path =
            self.output_path(&self.options.nodal_displacements_filename, &tail, "txt");
        let velocities_path = self.output_path(&self.options.nodal_velocities_filename, &tail, "txt");
        let forces_path = self.output_path(&self.options.nodal_forces_filename, &tail, "txt");
        let state_path = self.output_path(&self.options.state_filename, &tail, "json");

        save_column_vector(self.system.displacements(), &displacements_path)?;
        save_column_vector(self.system.velocities(), &velocities_path)?;
        save_column_vector(&self.system.forces(), &forces_path)?;

        self.config.nodal_displacements = Some(ColumnSource::File(displacements_path));
        self.config.nodal_velocities = Some(ColumnSource::File(velocities_path));
        self.config.start_time = self.system.time();
        self.config.iteration_number = self.iteration_number;

        fs::write(&state_path, self.config.to_json_pretty()?)?;
        self.dumps_written += 1;

        Ok(())
    }

    pub fn system(&self) -> &ExplicitSystem {
        &self.system
    }

    /// Configuration as it would be written by the next dump
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn time_step(&self) -> f64 {
        self.dt
    }

    pub fn iteration_number(&self) -> usize {
        self.iteration_number
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Write one value per line
fn save_column_vector(vector: &FEVec, path: &Path) -> FEAResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for value in vector.iter() {
        writeln!(out, "{}", value)?;
    }
    out.flush()?;
    Ok(())
}
