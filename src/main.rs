pub mod cli;
pub mod logging;

fn main() {
    logging::init_tracing();
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", colored::Colorize::red("error:"));
        std::process::exit(1);
    }
}
