mod cli;

use std::process::exit;

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let args = cli::parse_args();
    if let Err(e) = cli::run(&args) {
        eprintln!("{e:#}");
        exit(1);
    }
}
