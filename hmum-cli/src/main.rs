//! Entry point for the `hmum` command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = hmum_cli::run() {
        eprintln!("hmum: {err}");
        std::process::exit(1);
    }
}
