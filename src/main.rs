use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::modules::file_upload::{FfprobeProber, FileUploadService};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let upload_config = configs::upload_config(&ENV)
        .map_err(|e| std::io::Error::other(format!("Upload configuration error: {e}")))?;
    let prober = Arc::new(configs::duration_prober(&ENV));

    let file_service = FileUploadService::new(prober, upload_config);
    file_service
        .ensure_upload_dir()
        .await
        .map_err(|e| std::io::Error::other(format!("Upload directory error: {e}")))?;
    let file_service = web::Data::new(file_service);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(file_service.clone())
            .service(health_check)
            .service(
                web::scope("/api").service(
                    web::scope("/files")
                        .configure(modules::file_upload::route::configure::<FfprobeProber>),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
