use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;

use crate::api::success::Success;
use crate::api::{error, success};
use crate::constants::UPLOAD_FIELD;
use crate::modules::file_upload::model::{MediaKind, NewUpload, UploadError};
use crate::modules::file_upload::prober::DurationProber;
use crate::modules::file_upload::schema::FileUploadResponse;
use crate::modules::file_upload::service::FileUploadService;

/// Upload file handler
pub async fn upload_file<P>(
    mut payload: Multipart,
    service: web::Data<FileUploadService<P>>,
) -> Result<success::Success<FileUploadResponse>, error::Error>
where
    P: DurationProber + Send + Sync + 'static,
{
    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            while field.try_next().await.map_err(|_| error::Error::InternalServer)?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .ok_or_else(|| error::Error::bad_request("Missing filename"))?
            .to_string();

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Stop buffering as soon as the payload can no longer fit its class ceiling
        let kind = MediaKind::from_filename(&filename);
        let limit_bytes = service.config().max_size(kind);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|_| error::Error::InternalServer)? {
            if bytes.len() + chunk.len() > limit_bytes {
                log::info!("Rejected upload {filename:?} while streaming: over {limit_bytes} bytes");
                return Err(error::SystemError::from(UploadError::SizeExceeded { kind, limit_bytes })
                    .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        let stored = service.upload_file(NewUpload::new(filename, mime_type, bytes)).await?;

        let response = FileUploadResponse {
            url: service.file_url(&stored.filename),
            path: stored.path.display().to_string(),
            filename: stored.filename,
            original_name: stored.original_name,
            mime_type: stored.mime_type,
            size: stored.size,
        };

        return Ok(Success::created(Some(response)).message("File uploaded successfully"));
    }

    Err(error::Error::bad_request("No file found in request"))
}

/// Download file handler
pub async fn download_file<P>(
    filename: web::Path<String>,
    service: web::Data<FileUploadService<P>>,
) -> Result<HttpResponse, error::Error>
where
    P: DurationProber + Send + Sync + 'static,
{
    let file_path = service
        .get_file(&filename.into_inner())
        .await?
        .ok_or_else(|| error::Error::not_found("File not found"))?;

    let bytes = tokio::fs::read(&file_path).await.map_err(error::SystemError::from)?;
    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();

    Ok(HttpResponse::Ok().content_type(mime.to_string()).body(bytes))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use std::path::Path;
    use std::sync::Arc;

    use crate::modules::file_upload::{model::UploadConfig, route};
    use crate::test::FakeProber;

    use super::*;

    const BOUNDARY: &str = "----storefront-boundary";

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> actix_web::test::TestRequest {
        test::TestRequest::post()
            .uri("/api/files/upload")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    fn service(
        dir: &Path,
        prober: FakeProber,
        max_image_size: usize,
    ) -> web::Data<FileUploadService<FakeProber>> {
        let config = UploadConfig {
            upload_dir: dir.to_path_buf(),
            max_image_size,
            ..UploadConfig::default()
        };
        web::Data::new(FileUploadService::new(Arc::new(prober), config))
    }

    macro_rules! app {
        ($data:expr) => {
            test::init_service(App::new().app_data($data.clone()).service(
                web::scope("/api/files").configure(route::configure::<FakeProber>),
            ))
            .await
        };
    }

    #[actix_web::test]
    async fn upload_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let data = service(dir.path(), FakeProber::with_duration(0.0), 1024);
        let app = app!(data);

        let req = upload_request(multipart_body("file", "my photo.jpg", "image/jpeg", b"jpegdata"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "File uploaded successfully");
        assert_eq!(body["data"]["original_name"], "my_photo.jpg");
        assert_eq!(body["data"]["mime_type"], "image/jpeg");
        assert_eq!(body["data"]["size"], 8);

        let filename = body["data"]["filename"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["url"], format!("/api/files/{filename}"));

        let req = test::TestRequest::get().uri(&format!("/api/files/{filename}")).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("content-type").unwrap(), "image/jpeg");
        assert_eq!(test::read_body(res).await.as_ref(), b"jpegdata");
    }

    #[actix_web::test]
    async fn invalid_type_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let data = service(dir.path(), FakeProber::with_duration(0.0), 1024);
        let app = app!(data);

        let req = upload_request(multipart_body("file", "tool.exe", "application/x-msdownload", b"MZ"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "Invalid file type. Only images (jpg, jpeg, png, gif) and videos (mp4) are allowed"
        );
    }

    #[actix_web::test]
    async fn oversized_stream_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = service(dir.path(), FakeProber::with_duration(0.0), 4);
        let app = app!(data);

        let req = upload_request(multipart_body("file", "big.png", "image/png", b"0123456789"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn long_video_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = service(dir.path(), FakeProber::with_duration(17.0), 1024);
        let app = app!(data);

        let req = upload_request(multipart_body("file", "clip.mp4", "video/mp4", b"mp4data"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Video duration exceeds 16 seconds limit");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn missing_file_field_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let data = service(dir.path(), FakeProber::with_duration(0.0), 1024);
        let app = app!(data);

        let req = upload_request(multipart_body("avatar", "a.png", "image/png", b"png"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn download_rejects_traversal_and_missing_files() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std::fs::create_dir_all(&uploads).unwrap();
        std::fs::write(root.path().join("secret.txt"), b"secret").unwrap();
        let data = service(&uploads, FakeProber::with_duration(0.0), 1024);
        let app = app!(data);

        for uri in ["/api/files/..%2Fsecret.txt", "/api/files/missing.png", "/api/files/.."] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
