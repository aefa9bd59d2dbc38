use clap::Parser;
use sirnet::args::Args;
use sirnet::runner::Runner;

fn main() {
    let args = Args::parse();
    let result = Runner::new(args).and_then(|mut runner| runner.start());
    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
