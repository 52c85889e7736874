//! Image upload, download and removal.
//!
//! ```text
//! POST /upload_image        multipart/form-data; fields "image" and "csrf_token"
//! GET  /uploads/{filename}
//! POST /delete_image/{id}    csrf_token=...
//! ```

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use futures_util::StreamExt;
use futures_util::future::ready;
use futures_util::stream::once;
use tracing::debug;

use crate::domain::ports::ImageUpload;
use crate::domain::{Error, ImageId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csrf::{CSRF_FIELD, Protected, TokenOnly};
use crate::inbound::http::error::{DASHBOARD_PATH, recover, redirect};
use crate::inbound::http::flash::Flash;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Form field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

fn malformed_upload(detail: impl std::fmt::Display) -> Error {
    debug!(%detail, "malformed multipart upload");
    Error::validation_failed("The upload could not be read. Please choose a file and try again.")
}

/// Read the request body, refusing anything larger than `limit` bytes.
async fn read_limited(mut payload: web::Payload, limit: usize) -> ApiResult<web::Bytes> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(malformed_upload)?;
        if body.len() + chunk.len() > limit {
            return Err(Error::validation_failed(format!(
                "File is too large; the limit is {} MiB.",
                limit / (1024 * 1024)
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Fields of a decoded upload form.
#[derive(Debug)]
struct UploadForm {
    csrf_token: Option<String>,
    upload: ImageUpload,
}

/// Pull the `image` and `csrf_token` fields out of a multipart body.
///
/// A form without an image yields an upload with no filename so the
/// library reports it as missing. Only the first image part is kept.
async fn extract_upload(content_type: &str, body: web::Bytes) -> ApiResult<UploadForm> {
    let boundary = multer::parse_boundary(content_type).map_err(malformed_upload)?;
    let stream = once(ready(Ok::<_, std::io::Error>(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut form = UploadForm {
        csrf_token: None,
        upload: ImageUpload {
            filename: None,
            bytes: Vec::new(),
        },
    };
    let mut seen_image = false;

    while let Some(field) = multipart.next_field().await.map_err(malformed_upload)? {
        match field.name() {
            Some(IMAGE_FIELD) if !seen_image => {
                seen_image = true;
                form.upload.filename = field.file_name().map(str::to_owned);
                form.upload.bytes = field.bytes().await.map_err(malformed_upload)?.to_vec();
            }
            Some(CSRF_FIELD) => {
                form.csrf_token = Some(field.text().await.map_err(malformed_upload)?);
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Store an uploaded image and record it against the patient.
#[utoipa::path(
    post,
    path = "/upload_image",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Form with an `image` file field (jpg, jpeg, png or gif) and the page's `csrf_token`"),
    responses((status = 302, description = "Redirect to /dashboard")),
    tags = ["images"],
    operation_id = "uploadImage"
)]
#[post("/upload_image")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    store_upload(&state, &session, &req, payload)
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn store_upload(
    state: &HttpState,
    session: &SessionContext,
    req: &HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| malformed_upload("missing content type"))?
        .to_owned();
    let body = read_limited(payload, state.max_upload_bytes).await?;
    let form = extract_upload(&content_type, body).await?;
    session.verify_csrf(form.csrf_token.as_deref())?;
    let user = session.require_user(state.accounts.as_ref()).await?;
    state.images.upload(&user, form.upload).await?;
    session.flash(Flash::success("Image uploaded successfully"));
    Ok(redirect(DASHBOARD_PATH))
}

/// Stream a stored image back to a signed-in user.
#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    params(("filename" = String, Path, description = "Stored image name")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 302, description = "Not signed in; redirect to /login"),
        (status = 404, description = "No such image", body = Error)
    ),
    tags = ["images"],
    operation_id = "serveImage"
)]
#[get("/uploads/{filename}")]
pub async fn serve_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let filename = path.into_inner();
    open_image(&state, &session, &filename)
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn open_image(
    state: &HttpState,
    session: &SessionContext,
    filename: &str,
) -> ApiResult<HttpResponse> {
    let user = session.require_user(state.accounts.as_ref()).await?;
    let content = state.images.open(&user, filename).await?;
    Ok(HttpResponse::Ok()
        .content_type(content.content_type())
        .body(content.bytes))
}

/// Remove an image row and its file.
#[utoipa::path(
    post,
    path = "/delete_image/{id}",
    params(("id" = i32, Path, description = "Image id")),
    request_body(content = String, content_type = "application/x-www-form-urlencoded",
        description = "The page's `csrf_token`"),
    responses(
        (status = 302, description = "Redirect to /dashboard"),
        (status = 404, description = "No such image", body = Error)
    ),
    tags = ["images"],
    operation_id = "deleteImage"
)]
#[post("/delete_image/{id}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<Protected<TokenOnly>>,
) -> ApiResult<HttpResponse> {
    let id = ImageId::new(path.into_inner());
    remove_image(&state, &session, id, form.token())
        .await
        .or_else(|error| recover(&session, error, DASHBOARD_PATH))
}

async fn remove_image(
    state: &HttpState,
    session: &SessionContext,
    id: ImageId,
    token: Option<&str>,
) -> ApiResult<HttpResponse> {
    session.verify_csrf(token)?;
    let user = session.require_user(state.accounts.as_ref()).await?;
    state.images.delete(&user, id).await?;
    session.flash(Flash::success("Image deleted successfully"));
    Ok(redirect(DASHBOARD_PATH))
}
