use actix_web::{web, App, HttpServer};
use backend::config::AppConfig;
use backend::job_controller::state::{start_job_updater, JobsState};
use backend::services;
use backend::store::SqliteSiteStore;
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config =
        AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // Ensure the schema exists before accepting uploads.
    SqliteSiteStore::open(&config.database_path).map_err(io::Error::other)?;
    info!("Site store ready at {}", config.database_path);

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(config.job_channel_capacity);

    // Start job updater task
    tokio::spawn(start_job_updater(jobs_state.jobs.clone(), rx));

    let (host, port) = config.bind_address();
    info!("Server running at http://{}:{}", host, port);

    let app_config = web::Data::new(config);
    let jobs_data = web::Data::new(jobs_state);
    HttpServer::new(move || {
        App::new()
            .app_data(app_config.clone())
            .app_data(jobs_data.clone())
            .service(services::sites::configure_routes())
    })
    .bind((host, port))?
    .run()
    .await
}
