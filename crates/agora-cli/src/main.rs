mod cli;

use agora_core::client::ApiError;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        if e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::requires_login)
        {
            eprintln!("Not signed in. Run `agora login` to start a new session.");
        }
        std::process::exit(1);
    }
}
