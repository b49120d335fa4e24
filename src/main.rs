use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod tab;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let res = match args.command {
        args::Command::Recode {
            input,
            output,
            dictionary,
        } => tab::run_recode(&input, &output, &dictionary),
        args::Command::Report { input, output, out } => {
            tab::run_report(&input, &output, out.as_deref())
        }
    };

    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
