use std::process;

mod cli;
mod job;
mod logging;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let parsed = match cli::parse_args(&args) {
        Ok(cli::Command::Run(parsed)) => parsed,
        Ok(cli::Command::Help) => {
            cli::print_help();
            return;
        }
        Err(err) => {
            eprintln!("error: {err}");
            cli::print_help();
            process::exit(2);
        }
    };

    logging::setup_tracing(parsed.log_level);
    tracing::info!("weightcopy starting");

    if let Err(err) = run(&parsed) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), String> {
    let job = job::load_job(&args.job_path)?;
    let report = job::run_job(&job)?;
    job::write_report(&report, args.out_path.as_deref())?;
    tracing::info!("completed");
    Ok(())
}
