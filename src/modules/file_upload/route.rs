use actix_web::web;

use crate::modules::file_upload::prober::DurationProber;

pub fn configure<P>(cfg: &mut web::ServiceConfig)
where
    P: DurationProber + Send + Sync + 'static,
{
    cfg.service(
        web::resource("/upload")
            .route(web::post().to(crate::modules::file_upload::handle::upload_file::<P>)),
    )
    .service(
        web::resource("/{filename}")
            .route(web::get().to(crate::modules::file_upload::handle::download_file::<P>)),
    );
}
