mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use tell_matching::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
