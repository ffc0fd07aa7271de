use fastq_demux::Cli;

fn main() {
    if let Err(e) = Cli::run() {
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}
