use clap::Parser;
use codecontexter::cli::Cli;
use codecontexter::generate;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = generate::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
