//! Currency metadata, rate lookup, and one-off conversion endpoints.

use api_types::currency::{Conversion, ConvertRequest, CurrencyInfo, RateView};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};
use engine::EngineError;

pub async fn list() -> Json<Vec<CurrencyInfo>> {
    Json(
        engine::supported_currencies()
            .iter()
            .map(|info| CurrencyInfo {
                code: info.code.to_string(),
                name: info.name.to_string(),
                symbol: info.symbol.to_string(),
            })
            .collect(),
    )
}

pub async fn exchange_rate(
    State(state): State<ServerState>,
    Path((from, to)): Path<(String, String)>,
) -> Result<Json<RateView>, ServerError> {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();

    let rate = state
        .engine
        .currency()
        .exchange_rate(&from, &to)
        .await
        .ok_or_else(|| EngineError::RateUnavailable {
            from: from.clone(),
            to: to.clone(),
        })?;

    Ok(Json(RateView {
        from_currency: from,
        to_currency: to,
        rate: rate.value,
        fetched_at: rate.fetched_at,
    }))
}

pub async fn convert(
    State(state): State<ServerState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<Conversion>, ServerError> {
    let from = payload.from_currency.trim().to_uppercase();
    let to = payload.to_currency.trim().to_uppercase();

    let conversion = state
        .engine
        .currency()
        .convert(payload.amount, &from, &to)
        .await
        .ok_or_else(|| EngineError::RateUnavailable { from, to })?;

    Ok(Json(Conversion {
        original_amount: conversion.original_amount,
        original_currency: conversion.original_currency,
        target_currency: conversion.target_currency,
        converted_amount: conversion.converted_amount,
        exchange_rate: conversion.exchange_rate,
    }))
}
