//! Query-string extraction and helpers shared by the routes.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use chrono::Local;
use metricdeck_domain::constants::DEFAULT_LOOKBACK_DAYS;
use metricdeck_domain::types::range::parse_date;
use metricdeck_domain::{DateRange, ExtraParams};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};

pub(crate) type RawParams = HashMap<String, String>;

/// [`Query`] whose rejection is an [`ApiError`], so malformed query strings
/// get the same JSON error body as every other failure.
pub(crate) struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let Query(value) = Query::<T>::try_from_uri(&parts.uri)?;
        Ok(Self(value))
    }
}

/// Parameters consumed by the routes themselves; anything else is forwarded
/// to details queries.
const RESERVED: [&str; 3] = ["metric", "start", "end"];

fn present<'a>(params: &'a RawParams, name: &str) -> Option<&'a str> {
    params.get(name).map(|value| value.trim()).filter(|value| !value.is_empty())
}

pub(crate) fn required<'a>(params: &'a RawParams, name: &'static str) -> Result<&'a str> {
    present(params, name).ok_or(ApiError::MissingParameter(name))
}

/// Range from `start`/`end`, both required.
pub(crate) fn required_range(params: &RawParams) -> Result<DateRange> {
    let start = required(params, "start")?;
    let end = required(params, "end")?;
    Ok(DateRange::new(date(start, "start")?, date(end, "end")?))
}

/// Range from `start`/`end`; a missing bound falls back to the trailing
/// window ending today.
pub(crate) fn range_or_default(params: &RawParams) -> Result<DateRange> {
    let fallback = DateRange::trailing_days(Local::now().date_naive(), DEFAULT_LOOKBACK_DAYS);
    let start = match present(params, "start") {
        Some(raw) => date(raw, "start")?,
        None => fallback.start,
    };
    let end = match present(params, "end") {
        Some(raw) => date(raw, "end")?,
        None => fallback.end,
    };
    Ok(DateRange::new(start, end))
}

/// Every parameter the routes do not consume themselves.
pub(crate) fn extra_params(params: &RawParams) -> ExtraParams {
    params
        .iter()
        .filter(|(name, _)| !RESERVED.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn date(raw: &str, bound: &str) -> Result<chrono::NaiveDate> {
    parse_date(raw).map_err(|err| ApiError::InvalidDate(format!("{bound}: {err}")))
}
