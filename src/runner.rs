use anyhow::{Context, Result};

use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::Instant;

use crate::args::Args;
use crate::config::{Parameters, Settings, SweepSettings, settings_path_for};
use crate::core::{Network, RandomSource};
use crate::readwrite::{CsvResultWriter, NetworkIO, ResultWriter, RunRecord, TextResultWriter};
use crate::simulation::SirSimulation;
use crate::stats::DegreeStatistics;

/// A single run of the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Task {
    pub parameters: Parameters,
    pub replicate: usize,
    pub seed: u64,
}

impl Task {
    /// Simulate one epidemic on its own random stream.
    pub fn execute(&self, network: &Network) -> crate::errors::Result<RunRecord> {
        let mut simulation = SirSimulation::new(network, RandomSource::from_seed(self.seed));
        let outcome = simulation.run(self.parameters)?;
        Ok(RunRecord::new(&outcome, self.replicate, self.seed))
    }
}

/// Lay out all runs of a sweep, drawing one seed per run from the master source.
///
/// Seeds are assigned in grid order, so results do not depend on how tasks are scheduled.
pub fn plan_tasks(settings: &Settings, master: &mut RandomSource) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(settings.parameters().len() * settings.replicates);
    for parameters in settings.parameters() {
        for replicate in 0..settings.replicates {
            tasks.push(Task {
                parameters,
                replicate,
                seed: master.fork().seed(),
            });
        }
    }
    tasks
}

/// Execute all tasks and return their records in task order.
#[cfg(feature = "parallel")]
pub fn sweep(
    network: &Network,
    tasks: &[Task],
    bar: Option<&ProgressBar>,
) -> crate::errors::Result<Vec<RunRecord>> {
    tasks
        .par_iter()
        .map(|task| {
            let record = task.execute(network);
            if let Some(bar) = bar {
                bar.inc(1);
            }
            record
        })
        .collect()
}

/// Execute all tasks and return their records in task order.
#[cfg(not(feature = "parallel"))]
pub fn sweep(
    network: &Network,
    tasks: &[Task],
    bar: Option<&ProgressBar>,
) -> crate::errors::Result<Vec<RunRecord>> {
    tasks
        .iter()
        .map(|task| {
            let record = task.execute(network);
            if let Some(bar) = bar {
                bar.inc(1);
            }
            record
        })
        .collect()
}

pub struct Runner {
    args: Args,
    settings: Settings,
    network: Network,
    master: RandomSource,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args)?;
        #[cfg(feature = "parallel")]
        Self::setup_rayon(&args)?;
        #[cfg(not(feature = "parallel"))]
        if args.threads.is_some() {
            log::warn!("Ignoring number of threads, built without the parallel feature.");
        }

        let settings = Self::load_settings(&args)?;
        let mut master = match settings.seed {
            Some(seed) => RandomSource::from_seed(seed),
            None => RandomSource::from_time(),
        };
        log::info!("Master seed is {}.", master.seed());
        let network = Self::load_network(&args, &mut master).context("Network build failed")?;

        Ok(Self {
            args,
            settings: Settings {
                seed: Some(master.seed()),
                ..settings
            },
            network,
            master,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        let records = self.run().context("Simulation run failed")?;
        self.finish(&records)
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) -> Result<()> {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level)
            .with_context(|| format!("Unable to open log file {}", args.log_file))
    }

    /// Setup rayon thread pool
    #[cfg(feature = "parallel")]
    fn setup_rayon(args: &Args) -> Result<()> {
        if let Some(n_threads) = args.threads {
            log::info!("Setting number of threads to {}.", n_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build_global()
                .context("Unable to set number of threads")?;
        }
        Ok(())
    }

    /// Load settings from file, or assemble them from the command line
    ///
    /// A seed given on the command line replaces the one of the settings file.
    fn load_settings(args: &Args) -> Result<Settings> {
        let settings = match &args.settings {
            Some(path) => {
                let settings = Settings::read_from_file(path)
                    .with_context(|| format!("Unable to load settings from {path}"))?;
                Settings {
                    seed: args.seed.or(settings.seed),
                    ..settings
                }
            }
            None => {
                let settings = Settings {
                    recovery_rate: args.recovery_rate,
                    sweep: SweepSettings {
                        samples: args.samples,
                        ..Default::default()
                    },
                    replicates: args.replicates,
                    seed: args.seed,
                };
                settings.validate().context("Invalid command line settings")?;
                settings
            }
        };
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }

    /// Generate or read the network and report its degree statistics
    fn load_network(args: &Args, master: &mut RandomSource) -> Result<Network> {
        let path = args.network.as_str();
        let network = match args.generate {
            Some(n_nodes) => {
                log::info!(
                    "Generating network with {n_nodes} nodes and mean degree {}...",
                    args.mean_degree
                );
                let network =
                    Network::erdos_renyi(n_nodes, args.mean_degree, &mut master.fork())?;
                log::info!("Writing network to {path}...");
                network.write(path)?;
                network
            }
            None => {
                log::info!("Reading network from {path}...");
                Network::read(path)?
            }
        };
        let distribution = network.degree_distribution();
        log::info!(
            "Network has {} nodes, {} directed edges and average degree {:.4}.",
            network.len(),
            network.edge_count(),
            crate::stats::degree::average_degree(&distribution)
        );
        for (degree, probability) in distribution.iter() {
            log::debug!("P(k={degree})={probability:.6}");
        }
        Ok(network)
    }

    fn create_progress_bar(&self, length: usize) -> Result<Option<ProgressBar>> {
        if self.args.disable_progress_bar {
            return Ok(None);
        }
        let bar = ProgressBar::new(length as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{bar:40}] {pos:>7}/{len:7} [{elapsed_precise} / {duration_precise}] {msg}",
                )?
                .progress_chars("=> "),
        );
        Ok(Some(bar))
    }

    fn run(&mut self) -> Result<Vec<RunRecord>> {
        let tasks = plan_tasks(&self.settings, &mut self.master);
        log::info!("Running {} simulations...", tasks.len());

        let bar = self.create_progress_bar(tasks.len())?;
        let start = Instant::now();
        let records = sweep(&self.network, &tasks, bar.as_ref())?;
        let elapsed = start.elapsed().as_secs_f64();

        if let Some(bar) = bar {
            bar.finish_with_message("Done.");
        }
        let per_run = if tasks.is_empty() {
            0.
        } else {
            elapsed / tasks.len() as f64
        };
        log::info!("Finished simulation in {elapsed:.3} s ({per_run:.6} s per run).");
        eprintln!("Elapsed time: {elapsed} s");
        eprintln!("Average time per run: {per_run} s");
        Ok(records)
    }

    fn finish(&self, records: &[RunRecord]) -> Result<()> {
        match &self.args.output {
            Some(path) => {
                log::info!("Storing results in {path}...");
                CsvResultWriter::from_path(path)?.write(records)?;
                let settings_path = settings_path_for(path);
                if settings_path == *path {
                    log::warn!("Not storing settings, they would replace the results in {path}.");
                } else {
                    log::info!("Storing settings in {settings_path}...");
                    self.settings.write_to_file(&settings_path)?;
                }
            }
            None => TextResultWriter::stdout().write(records)?,
        }
        log::info!("Finished storing results.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    fn ring(n_nodes: usize) -> Network {
        let adjacency = (0..n_nodes)
            .map(|i| vec![(i + 1) % n_nodes, (i + n_nodes - 1) % n_nodes])
            .collect();
        Network::from_adjacency(adjacency).unwrap()
    }

    fn settings(samples: usize, replicates: usize) -> Settings {
        Settings {
            recovery_rate: 0.1,
            sweep: SweepSettings {
                start: 0.,
                end: 1.,
                samples,
            },
            replicates,
            seed: Some(42),
        }
    }

    #[test]
    fn tasks_cover_grid_and_replicates() {
        let tasks = plan_tasks(&settings(4, 3), &mut RandomSource::from_seed(42));
        assert_eq!(tasks.len(), 15);
        assert_eq!(tasks[0].parameters.transmission_rate, 0.);
        assert_eq!(tasks[14].parameters.transmission_rate, 1.);
        assert_eq!(tasks[5].replicate, 2);
        let mut seeds: Vec<u64> = tasks.iter().map(|task| task.seed).collect();
        seeds.sort();
        seeds.dedup();
        assert_eq!(seeds.len(), 15);
    }

    #[test]
    fn sweep_is_reproducible() {
        let network = ring(50);
        let tasks = plan_tasks(&settings(10, 2), &mut RandomSource::from_seed(7));
        let first = sweep(&network, &tasks, None).unwrap();
        let second = sweep(&network, &tasks, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), tasks.len());
    }

    #[test]
    fn sweep_records_conserve_population() {
        let network = ring(30);
        let tasks = plan_tasks(&settings(5, 1), &mut RandomSource::from_seed(3));
        let records = sweep(&network, &tasks, None).unwrap();
        for (task, record) in tasks.iter().zip(records.iter()) {
            assert_eq!(record.beta, task.parameters.transmission_rate);
            assert_eq!(record.seed, task.seed);
            assert_eq!(record.susceptible + record.infected + record.recovered, 30);
            assert_eq!(record.infected, 0);
        }
        // zero transmission only removes the root
        assert_eq!(records[0].recovered, 1);
    }

    #[test]
    fn sweep_propagates_invalid_parameters() {
        let network = ring(5);
        let tasks = vec![Task {
            parameters: Parameters::new(0.5, 0.),
            replicate: 0,
            seed: 1,
        }];
        assert!(sweep(&network, &tasks, None).is_err());
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(name)
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[test]
    #[serial]
    fn command_line_seed_overrides_settings_file() {
        let path = temp_path("sirnet_test_runner_settings.yaml");
        settings(4, 2).write_to_file(&path).unwrap();

        let args = Args::parse_from([
            "sirnet", "-n", "unused.txt", "--settings", path.as_str(),
        ]);
        assert_eq!(Runner::load_settings(&args).unwrap().seed, Some(42));

        let args = Args::parse_from([
            "sirnet", "-n", "unused.txt", "--settings", path.as_str(), "--seed", "7",
        ]);
        let loaded = Runner::load_settings(&args).unwrap();
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.replicates, 2);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn command_line_settings_are_validated() {
        let args = Args::parse_from(["sirnet", "-n", "unused.txt", "--recovery-rate", "0"]);
        assert!(Runner::load_settings(&args).is_err());

        let args = Args::parse_from(["sirnet", "-n", "unused.txt", "--samples", "4"]);
        let loaded = Runner::load_settings(&args).unwrap();
        assert_eq!(loaded.parameters().len(), 5);
        assert_eq!(loaded.seed, None);
    }

    #[test]
    #[serial]
    fn generated_network_is_written_and_used() {
        let path = temp_path("sirnet_test_generated_network.txt");
        let args = Args::parse_from([
            "sirnet", "-n", path.as_str(), "--generate", "500", "--mean-degree", "4",
        ]);
        let network = Runner::load_network(&args, &mut RandomSource::from_seed(11)).unwrap();
        assert!(!network.is_empty());
        assert_eq!(Network::read(&path).unwrap(), network);

        // reading the same path back without generating gives the same network
        let args = Args::parse_from(["sirnet", "-n", path.as_str()]);
        let read_network = Runner::load_network(&args, &mut RandomSource::from_seed(0)).unwrap();
        assert_eq!(read_network, network);
        std::fs::remove_file(path).unwrap();
    }
}
