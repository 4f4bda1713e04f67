use actix_web::HttpResponse;
use std::borrow::Cow;

#[derive(serde::Serialize)]
pub struct SuccessData<T: serde::Serialize> {
    pub data: Option<T>,
    pub message: Option<Cow<'static, str>>,
}

pub struct Success<T: serde::Serialize> {
    pub status: actix_web::http::StatusCode,
    pub body: Option<SuccessData<T>>,
}

impl<T: serde::Serialize> Success<T> {
    pub fn message<M>(mut self, msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        if let Some(body) = &mut self.body {
            body.message = Some(msg.into());
        }
        self
    }

    pub fn created(data: Option<T>) -> Self {
        Self {
            status: actix_web::http::StatusCode::CREATED,
            body: Some(SuccessData { data, message: None }),
        }
    }
}

impl<T: serde::Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        let mut response = HttpResponse::build(self.status);

        match self.body {
            Some(body) => response.json(body),
            None => response.finish(),
        }
    }
}
