//! Register views open to the parish evangelist
//!
//! Every handler runs the evangelist occupation gate first. Each view keeps
//! its own denial text.

use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use parish_registry::{
    LeaderListing, LeaderProfile, LeaderScope, LeadersHome, ListingQuery, MemberListing, MemberProfile,
    MemberScope, MembersHome,
};
use uuid::Uuid;

const ONLY_EVANGELISTS_PAGE: &str = "Only Evangelists can access this page.";
const ONLY_EVANGELISTS_VIEW: &str = "Only Evangelists can access this view.";

/// The signed-in evangelist's own leader record
pub async fn details(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<LeaderProfile>> {
    let context = state.evangelist_gate(ONLY_EVANGELISTS_PAGE).check(&user).await?;
    let profile = state.leaders.profile(context.leader.id).await?;
    Ok(session.page(profile).await)
}

pub async fn member_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<MemberListing>> {
    state.evangelist_gate(ONLY_EVANGELISTS_VIEW).check(&user).await?;
    let listing = state.members.list(MemberScope::Active, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn inactive_member_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<MemberListing>> {
    state.evangelist_gate(ONLY_EVANGELISTS_VIEW).check(&user).await?;
    let listing = state.members.list(MemberScope::Inactive, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn members_home(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<MembersHome>> {
    state.evangelist_gate(ONLY_EVANGELISTS_PAGE).check(&user).await?;
    Ok(session.page(state.members.home().await?).await)
}

pub async fn member_detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<MemberProfile>> {
    state
        .evangelist_gate("Only Evangelists can view church member detail.")
        .check(&user)
        .await?;
    Ok(session.page(state.members.profile(id).await?).await)
}

pub async fn leader_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<LeaderListing>> {
    state.evangelist_gate(ONLY_EVANGELISTS_VIEW).check(&user).await?;
    let listing = state.leaders.list(LeaderScope::Active, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn inactive_leader_list(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListingQuery>,
) -> HttpResult<Page<LeaderListing>> {
    state.evangelist_gate(ONLY_EVANGELISTS_VIEW).check(&user).await?;
    let listing = state.leaders.list(LeaderScope::Inactive, &query).await?;
    Ok(session.page(listing).await)
}

pub async fn leaders_home(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<LeadersHome>> {
    state
        .evangelist_gate("Only Evangelists can view Leaders Home.")
        .check(&user)
        .await?;
    Ok(session.page(state.leaders.home().await?).await)
}

pub async fn leader_detail(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> HttpResult<Page<LeaderProfile>> {
    state
        .evangelist_gate("Only Evangelists can view this leader detail.")
        .check(&user)
        .await?;
    Ok(session.page(state.leaders.profile(id).await?).await)
}
