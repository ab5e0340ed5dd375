use alertwatch::cli::Cli;

fn main() {
    if let Err(e) = Cli::run() {
        alertwatch::cli::print_error(&e.to_string());
        std::process::exit(1);
    }
}
