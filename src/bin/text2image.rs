//! `text2image`: generate an image from a text prompt.

use clap::Parser;

use gaimin_tools::cli::{run_text2image, Text2ImageArgs};
use gaimin_tools::config::load_dotenv;

fn main() {
    load_dotenv();
    gaimin_tools::init_logging();

    let args = Text2ImageArgs::parse();
    std::process::exit(run_text2image(args));
}
