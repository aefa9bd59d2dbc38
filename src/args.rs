use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about,
    long_about = None,
    name = "sirnet",
)]
pub struct Args {
    /// Path to network (one line of neighbor ids per node).
    #[clap(long, short)]
    pub network: String,

    /// Generate an Erdős–Rényi network with this many nodes and write it to the network path.
    #[clap(long, value_name = "N_NODES")]
    pub generate: Option<usize>,

    /// Expected degree of generated networks.
    #[clap(long, default_value_t = 5.0)]
    pub mean_degree: f64,

    /// Path to settings (yaml file), overrides sweep options.
    #[clap(long)]
    pub settings: Option<String>,

    /// Path to output (csv file), prints to stdout if omitted. The effective settings are
    /// stored next to it with a yaml extension.
    #[clap(long, short)]
    pub output: Option<String>,

    /// Number of steps of the transmission rate grid over [0, 1].
    #[clap(long, default_value_t = 100)]
    pub samples: usize,

    /// Recovery rate of infected nodes.
    #[clap(long, default_value_t = 0.1)]
    pub recovery_rate: f64,

    /// Number of runs per transmission rate.
    #[clap(long, default_value_t = 1)]
    pub replicates: usize,

    /// Seed for reproducible sweeps, drawn from the clock if omitted. Takes precedence over
    /// the seed of a settings file.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Number of threads.
    #[clap(long)]
    pub threads: Option<usize>,

    /// Path to log file.
    #[clap(long, default_value = "sirnet.log")]
    pub log_file: String,

    /// Verbosity of the log (repeat for more).
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bar.
    #[clap(long)]
    pub disable_progress_bar: bool,
}
