//! `lipsync-job`: submit a lip-sync job, wait for it, download the result.

use clap::Parser;

use gaimin_tools::cli::{run_lipsync, LipsyncArgs};
use gaimin_tools::config::load_dotenv;

fn main() {
    // Load .env file before anything else
    load_dotenv();
    gaimin_tools::init_logging();

    let args = LipsyncArgs::parse();
    std::process::exit(run_lipsync(args));
}
