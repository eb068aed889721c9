//! Order confirmation and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use checkout::Confirmation;
use domain::{ConfirmOrderRequest, LineItem, Order, PaymentMethod, PaymentStatus};
use notifications::NotificationReport;
use order_store::{OrderId, OrderQuery, OrderStore};
use payments::PaymentGateway;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Order id reported for an order that only exists as an email.
const UNSAVED_ORDER_ID: i64 = 0;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ConfirmOrderResponse {
    pub success: bool,
    pub order_id: i64,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationReport>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: String,
    pub delivery_date: String,
    pub delivery_time: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let details = order.details;
        Self {
            id: order.id.as_i64(),
            customer_name: details.customer_name,
            customer_phone: details.customer_phone,
            customer_email: details.customer_email,
            delivery_address: details.delivery_address,
            delivery_date: details.delivery_date,
            delivery_time: details.delivery_time,
            items: details.items,
            total_amount: details.total_amount,
            payment_method: details.payment_method,
            payment_status: details.payment_status,
            stripe_payment_intent_id: details.payment_intent_id.map(|id| id.to_string()),
            stripe_charge_id: order.charge_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
            notes: details.notes,
        }
    }
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub count: usize,
}

// -- Handlers --

/// POST /api/confirm-order — record an order and notify the shop.
///
/// Responds 201 once the order is stored, or 200 when it could only be delivered by email.
#[tracing::instrument(skip(state, body))]
pub async fn confirm<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    body: Result<Json<ConfirmOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConfirmOrderResponse>), ApiError>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let Json(req) = body?;
    let confirmation = state.confirmation.confirm(req).await?;
    let message = confirmation.message();

    let (status, order_id, notifications) = match confirmation {
        Confirmation::Confirmed {
            order,
            notification,
        } => {
            notification.detach();
            (StatusCode::CREATED, order.id.as_i64(), None)
        }
        Confirmation::Degraded { report } => (StatusCode::OK, UNSAVED_ORDER_ID, Some(report)),
    };

    Ok((
        status,
        Json(ConfirmOrderResponse {
            success: true,
            order_id,
            message,
            notifications,
        }),
    ))
}

/// GET /api/orders — most recent orders first.
#[tracing::instrument(skip(state, params))]
pub async fn list<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> Result<Json<OrderListResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let Query(params) = params?;

    let mut query = OrderQuery::new();
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }

    let orders: Vec<OrderResponse> = state
        .store
        .list(query)
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(Json(OrderListResponse {
        count: orders.len(),
        orders,
    }))
}

/// GET /api/orders/:id — a single order.
#[tracing::instrument(skip(state, id))]
pub async fn get<S, G>(
    State(state): State<Arc<AppState<S, G>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: OrderStore + Clone + 'static,
    G: PaymentGateway + 'static,
{
    let Path(id) = id?;

    let order = state
        .store
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(OrderResponse::from(order)))
}
