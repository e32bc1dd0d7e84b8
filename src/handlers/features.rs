//! Feature schema handler

use axum::Json;

use crate::logic::layout::LayoutInfo;

pub async fn list() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}
