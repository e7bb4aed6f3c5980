// src/main.rs

use packhost::cli::{self, Command};
use packhost::{list, logging, print_version, run};
use tracing::error;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("packhost: failed to initialise logging: {err:?}");
        std::process::exit(2);
    }

    // exit 2 on internal/infrastructure error
    // exit 1 on service pack probe failure(s)
    // exit 0 on success or user interrupt
    let code = match &args.command {
        Some(Command::Version) => {
            print_version();
            0
        }
        Some(Command::List) => match list(&args) {
            Ok(()) => 0,
            Err(err) => {
                error!(error = %err, "unable to list service packs");
                2
            }
        },
        None => match run(args).await {
            Ok(batch) => batch.exit_code(),
            Err(err) => {
                error!(error = %err, "internal error during service pack execution");
                2
            }
        },
    };

    std::process::exit(code);
}
