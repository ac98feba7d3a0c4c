//! Leader register for the office

use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use parish_auth::require_admin;
use parish_core::models::Leader;
use parish_registry::{LeaderListing, LeaderProfile, LeaderScope, LeadersHome, ListingQuery};
use parish_validation::FormData;
use uuid::Uuid;

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<LeaderListing>> {
    require_admin(&user)?;
    let listing = state.leaders.list(LeaderScope::Active, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn inactive_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<LeaderListing>> {
    require_admin(&user)?;
    let listing = state.leaders.list(LeaderScope::Inactive, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn home(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<LeadersHome>> {
    require_admin(&user)?;
    Ok(session.page(state.leaders.home().await?).await)
}

/// Second step of registering a member flagged as a leader
pub async fn create_from_member(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(member_id): Path<Uuid>,
    Json(form): Json<FormData>,
) -> HttpResult<Page<Leader>> {
    require_admin(&user)?;
    let (leader, flash) = state.leaders.create_leader_from_member(member_id, &form).await?;
    Ok(session
        .page(leader)
        .await
        .with_message(flash)
        .redirect("/members/"))
}

pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<LeaderProfile>> {
    require_admin(&user)?;
    Ok(session.page(state.leaders.profile(id).await?).await)
}
