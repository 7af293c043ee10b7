use buzz_cli::args::CliArgs;
use buzz_cli::driver;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match driver::run(args) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("buzz: {error:#}");
            std::process::exit(70);
        }
    }
}
