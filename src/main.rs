mod cli;
mod commands;
mod env_loader;
mod error;
mod logging;
mod sync;

use error::SaveSyncError;

fn main() {
    env_loader::load_dotenv();
    logging::init();

    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            match err.downcast_ref::<SaveSyncError>() {
                Some(known) => eprintln!("error[{}]: {err:#}", known.code().as_str()),
                None => eprintln!("error: {err:#}"),
            }
            std::process::exit(1);
        }
    }
}
