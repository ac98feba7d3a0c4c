//! Role landing pages

use crate::error::HttpResult;
use crate::response::Page;
use crate::session::{CurrentUser, Session};
use crate::state::AppState;
use axum::extract::State;
use chrono::Utc;
use parish_auth::{require_admin, require_church_member};
use parish_core::models::User;
use parish_registry::{ensure_current_year, LeadersDistribution, MemberProfile, SacramentStats, StatusCounts};
use serde::Serialize;

/// Parish-wide figures shown on the admin and leader dashboards
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub current_year: i32,
    pub members: StatusCounts,
    pub sacraments: SacramentStats,
    pub leaders_distribution: LeadersDistribution,
    pub total_news: usize,
}

async fn overview(state: &AppState) -> HttpResult<Overview> {
    let year = ensure_current_year(state.stores.organisation.as_ref(), Utc::now()).await?;
    let report = state.members.report().await?;
    Ok(Overview {
        current_year: year.year,
        members: report.members,
        sacraments: report.sacraments,
        leaders_distribution: state.leaders.distribution().await?,
        total_news: state.news.count().await?,
    })
}

pub async fn admin(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<Overview>> {
    require_admin(&user)?;
    Ok(session.page(overview(&state).await?).await)
}

/// Pastor, evangelist, secretary and accountant dashboards share the overview
pub async fn leader(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(_user): CurrentUser,
) -> HttpResult<Page<Overview>> {
    Ok(session.page(overview(&state).await?).await)
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDashboard {
    pub user: User,
    pub profile: MemberProfile,
}

pub async fn member(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> HttpResult<Page<MemberDashboard>> {
    require_church_member(&user)?;
    let member_id = user.church_member_id.unwrap_or_default();
    let profile = state.members.profile(member_id).await?;
    Ok(session.page(MemberDashboard { user, profile }).await)
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::TestApp;
    use axum::http::StatusCode;
    use parish_core::humanize::local_today;
    use chrono::{Datelike, Utc};

    #[tokio::test]
    async fn test_admin_dashboard_sets_current_year() {
        let app = TestApp::new();
        app.admin("mchungaji").await;
        app.member_account("baraka", None).await;

        let (_, member_cookie) = app.login("baraka", None).await;
        let denied = app.get("/accounts/admin_dashboard/", Some(&member_cookie)).await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let (_, cookie) = app.login("mchungaji", None).await;
        let dashboard = app.get("/accounts/admin_dashboard/", Some(&cookie)).await;
        assert_eq!(dashboard.status, StatusCode::OK);
        assert_eq!(
            dashboard.body["data"]["current_year"],
            local_today(Utc::now()).year()
        );
        assert_eq!(dashboard.body["data"]["members"]["active"], 1);

        let years = app.state.stores.organisation.list_years().await.unwrap();
        assert_eq!(years.iter().filter(|y| y.is_current).count(), 1);
    }

    #[tokio::test]
    async fn test_member_dashboard_shows_own_profile() {
        let app = TestApp::new();
        app.member_account("baraka", None).await;
        let (_, cookie) = app.login("baraka", None).await;

        let dashboard = app.get("/accounts/member_dashboard/", Some(&cookie)).await;
        assert_eq!(dashboard.status, StatusCode::OK);
        assert_eq!(dashboard.body["data"]["profile"]["member"]["full_name"], "baraka");
        assert_eq!(dashboard.body["data"]["profile"]["cell"], "----");
    }
}
