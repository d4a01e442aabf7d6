use sapling::cli;

fn main() {
    cli::start_cli();
}
