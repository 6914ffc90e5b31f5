//! API request helpers

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::rejection::FormRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::HOST;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use url::Url;

use super::Error;

/// Public URL of the service, when known upfront
#[derive(Clone, Debug, Default)]
pub struct PublicUrl(pub Option<Url>);

/// Base URL used to build the links in responses
///
/// The configured public URL, or derived from the `Host` header of the request
#[derive(Debug)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// URL of the notes collection
    pub fn collection(&self) -> String {
        format!("{}/api/", self.0)
    }

    /// URL of a single note
    pub fn note(&self, id: i64) -> String {
        format!("{}/api/{id}/", self.0)
    }
}

impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(public_url) = parts
            .extract::<Extension<PublicUrl>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the public URL"))?;

        if let PublicUrl(Some(public_url)) = public_url {
            return Ok(Self(public_url.as_str().trim_end_matches('/').to_string()));
        }

        let host = parts
            .headers
            .get(HOST)
            .and_then(|host| host.to_str().ok())
            .map(ToString::to_string)
            .or_else(|| parts.uri.authority().map(ToString::to_string))
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::bad_request("Missing `Host` header"))?;

        Ok(Self(format!("http://{host}")))
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                let description = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);

                Err(Error::bad_request("JSON syntax error").with_description(description))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

fn parse_form<F>(form: Result<axum::Form<F>, FormRejection>) -> Result<F, Error> {
    match form {
        Ok(axum::Form(form)) => Ok(form),
        Err(err) => match err {
            FormRejection::FailedToDeserializeForm(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            FormRejection::FailedToDeserializeFormBody(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            err => Err(Error::bad_request("Unknown form error").with_description(err)),
        },
    }
}

/// Is the body a submitted web form?
fn is_form_submission(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .and_then(|content_type| content_type.parse::<mime::Mime>().ok())
        .is_some_and(|content_type| {
            content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()
        })
}

/// Body extractor accepting both JSON and web forms
pub struct Payload<F>(pub F);

impl<S, F> FromRequest<S> for Payload<F>
where
    S: Send + Sync,
    F: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form_submission(req.headers()) {
            let form = axum::Form::<F>::from_request(req, state).await;

            return parse_form(form).map(Payload);
        }

        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Payload)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}
