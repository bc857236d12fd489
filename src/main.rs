use tracing_subscriber::EnvFilter;

fn main() {
    // RUST_LOG=jscheck=debug surfaces resolver/engine events on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = jscheck::cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
