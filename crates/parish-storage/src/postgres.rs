//! PostgreSQL store backed by an sqlx connection pool

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    LeaderFilter, LeaderStore, LeaderWithMember, LoginHistoryStore, MemberFilter, MemberStore,
    NewsStore, NewsWithMedia, OrganisationStore, SmsLogStore, UserStore,
};
use async_trait::async_trait;
use parish_core::models::{
    Cell, ChurchMember, ChurchYear, Leader, LoginHistory, News, NewsMedia, OutStation, SentSms,
    User, LAST_PATH_MAX_LEN,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../migrations/0001_parish_schema.sql");

const MEMBER_COLUMNS: &[&str] = &[
    "id",
    "member_id",
    "full_name",
    "gender",
    "date_of_birth",
    "phone_number",
    "email",
    "address",
    "status",
    "cell_id",
    "is_baptised",
    "date_of_baptism",
    "has_received_first_communion",
    "date_of_communion",
    "is_confirmed",
    "date_confirmed",
    "is_married",
    "date_of_marriage",
    "marital_status",
    "spouse_name",
    "number_of_children",
    "emergency_contact_name",
    "emergency_contact_phone",
    "is_this_church_member_a_leader",
    "passport",
    "baptism_certificate",
    "confirmation_certificate",
    "marriage_certificate",
    "date_created",
];

const LEADER_COLUMNS: &[&str] = &[
    "id",
    "leader_id",
    "church_member_id",
    "occupation",
    "start_date",
    "responsibilities",
    "time_in_service",
    "date_created",
];

const USER_COLUMNS: &str = "id, username, email, phone_number, user_type, is_superuser, \
    church_member_id, profile_picture, password_hash, is_agreed_to_terms_and_conditions, date_created";

const LOGIN_COLUMNS: &str = "id, user_id, login_time, ip_address, user_agent, last_visited_path";

const SMS_COLUMNS: &str = "id, recipient_id, phone_number, message, request_id, status, sent_at";

/// `m.id AS m_id, m.member_id AS m_member_id, ...`
fn select_list(alias: &str, columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("{alias}.{column} AS {alias}_{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn member_from_row(row: &PgRow, prefix: &str) -> StoreResult<ChurchMember> {
    let col = |name: &str| format!("{prefix}{name}");
    let gender: String = row.try_get(col("gender").as_str())?;
    let status: String = row.try_get(col("status").as_str())?;
    let marital_status: Option<String> = row.try_get(col("marital_status").as_str())?;
    let number_of_children: Option<i32> = row.try_get(col("number_of_children").as_str())?;

    Ok(ChurchMember {
        id: row.try_get(col("id").as_str())?,
        member_id: row.try_get(col("member_id").as_str())?,
        full_name: row.try_get(col("full_name").as_str())?,
        gender: gender.parse()?,
        date_of_birth: row.try_get(col("date_of_birth").as_str())?,
        phone_number: row.try_get(col("phone_number").as_str())?,
        email: row.try_get(col("email").as_str())?,
        address: row.try_get(col("address").as_str())?,
        status: status.parse()?,
        cell_id: row.try_get(col("cell_id").as_str())?,
        is_baptised: row.try_get(col("is_baptised").as_str())?,
        date_of_baptism: row.try_get(col("date_of_baptism").as_str())?,
        has_received_first_communion: row.try_get(col("has_received_first_communion").as_str())?,
        date_of_communion: row.try_get(col("date_of_communion").as_str())?,
        is_confirmed: row.try_get(col("is_confirmed").as_str())?,
        date_confirmed: row.try_get(col("date_confirmed").as_str())?,
        is_married: row.try_get(col("is_married").as_str())?,
        date_of_marriage: row.try_get(col("date_of_marriage").as_str())?,
        marital_status: marital_status.map(|s| s.parse()).transpose()?,
        spouse_name: row.try_get(col("spouse_name").as_str())?,
        number_of_children: number_of_children.map(|n| n.max(0) as u32),
        emergency_contact_name: row.try_get(col("emergency_contact_name").as_str())?,
        emergency_contact_phone: row.try_get(col("emergency_contact_phone").as_str())?,
        is_this_church_member_a_leader: row
            .try_get(col("is_this_church_member_a_leader").as_str())?,
        passport: row.try_get(col("passport").as_str())?,
        baptism_certificate: row.try_get(col("baptism_certificate").as_str())?,
        confirmation_certificate: row.try_get(col("confirmation_certificate").as_str())?,
        marriage_certificate: row.try_get(col("marriage_certificate").as_str())?,
        date_created: row.try_get(col("date_created").as_str())?,
    })
}

fn leader_from_row(row: &PgRow, prefix: &str) -> StoreResult<Leader> {
    let col = |name: &str| format!("{prefix}{name}");
    let occupation: String = row.try_get(col("occupation").as_str())?;

    Ok(Leader {
        id: row.try_get(col("id").as_str())?,
        leader_id: row.try_get(col("leader_id").as_str())?,
        church_member_id: row.try_get(col("church_member_id").as_str())?,
        occupation: occupation.parse()?,
        start_date: row.try_get(col("start_date").as_str())?,
        responsibilities: row.try_get(col("responsibilities").as_str())?,
        time_in_service: row.try_get(col("time_in_service").as_str())?,
        date_created: row.try_get(col("date_created").as_str())?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let user_type: String = row.try_get("user_type")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        user_type: user_type.parse()?,
        is_superuser: row.try_get("is_superuser")?,
        church_member_id: row.try_get("church_member_id")?,
        profile_picture: row.try_get("profile_picture")?,
        password_hash: row.try_get("password_hash")?,
        is_agreed_to_terms_and_conditions: row.try_get("is_agreed_to_terms_and_conditions")?,
        date_created: row.try_get("date_created")?,
    })
}

fn login_from_row(row: &PgRow) -> StoreResult<LoginHistory> {
    Ok(LoginHistory {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        login_time: row.try_get("login_time")?,
        ip_address: row.try_get("ip_address")?,
        user_agent: row.try_get("user_agent")?,
        last_visited_path: row.try_get("last_visited_path")?,
    })
}

fn sms_from_row(row: &PgRow) -> StoreResult<SentSms> {
    Ok(SentSms {
        id: row.try_get("id")?,
        recipient_id: row.try_get("recipient_id")?,
        phone_number: row.try_get("phone_number")?,
        message: row.try_get("message")?,
        request_id: row.try_get("request_id")?,
        status: row.try_get("status")?,
        sent_at: row.try_get("sent_at")?,
    })
}

fn news_from_row(row: &PgRow) -> StoreResult<News> {
    Ok(News {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn media_from_row(row: &PgRow) -> StoreResult<NewsMedia> {
    let media_type: String = row.try_get("media_type")?;
    Ok(NewsMedia {
        id: row.try_get("id")?,
        news_id: row.try_get("news_id")?,
        media_type: media_type.parse()?,
        file_path: row.try_get("file_path")?,
    })
}

/// Append `WHERE`/`AND` conditions for a member filter on alias `m`
fn push_member_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &MemberFilter) {
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
        builder.push(" AND m.status = ANY(").push_bind(statuses).push(")");
    }
    if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
        let pattern = format!("%{}%", name);
        builder
            .push(" AND (m.full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.member_id ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(gender) = filter.gender {
        builder.push(" AND m.gender = ").push_bind(gender.as_str());
    }
    if let Some(cell_id) = filter.cell_id {
        builder.push(" AND m.cell_id = ").push_bind(cell_id);
    }
    if let Some(outstation_id) = filter.outstation_id {
        builder
            .push(" AND m.cell_id IN (SELECT id FROM cells WHERE outstation_id = ")
            .push_bind(outstation_id)
            .push(")");
    }
}

/// PostgreSQL implementation of every store trait
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema if it does not exist yet
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    async fn media_for(&self, news_id: Uuid) -> StoreResult<Vec<NewsMedia>> {
        let rows = sqlx::query(
            "SELECT id, news_id, media_type, file_path FROM news_media WHERE news_id = $1",
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(media_from_row).collect()
    }

    async fn insert_media(&self, media: &[NewsMedia]) -> StoreResult<()> {
        for item in media {
            sqlx::query(
                "INSERT INTO news_media (id, news_id, media_type, file_path) VALUES ($1, $2, $3, $4)",
            )
            .bind(item.id)
            .bind(item.news_id)
            .bind(item.media_type.as_str())
            .bind(&item.file_path)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

fn bind_member<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    member: &'a ChurchMember,
) {
    let mut values = builder.separated(", ");
    values
        .push_bind(member.id)
        .push_bind(&member.member_id)
        .push_bind(&member.full_name)
        .push_bind(member.gender.as_str())
        .push_bind(member.date_of_birth)
        .push_bind(&member.phone_number)
        .push_bind(&member.email)
        .push_bind(&member.address)
        .push_bind(member.status.as_str())
        .push_bind(member.cell_id)
        .push_bind(member.is_baptised)
        .push_bind(member.date_of_baptism)
        .push_bind(member.has_received_first_communion)
        .push_bind(member.date_of_communion)
        .push_bind(member.is_confirmed)
        .push_bind(member.date_confirmed)
        .push_bind(member.is_married)
        .push_bind(member.date_of_marriage)
        .push_bind(member.marital_status.map(|s| s.as_str()))
        .push_bind(&member.spouse_name)
        .push_bind(member.number_of_children.map(|n| n as i32))
        .push_bind(&member.emergency_contact_name)
        .push_bind(&member.emergency_contact_phone)
        .push_bind(member.is_this_church_member_a_leader)
        .push_bind(&member.passport)
        .push_bind(&member.baptism_certificate)
        .push_bind(&member.confirmation_certificate)
        .push_bind(&member.marriage_certificate)
        .push_bind(member.date_created);
}

#[async_trait]
impl MemberStore for PgStore {
    async fn insert_member(&self, member: ChurchMember) -> StoreResult<ChurchMember> {
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO church_members ({}) VALUES (",
            MEMBER_COLUMNS.join(", ")
        ));
        bind_member(&mut builder, &member);
        builder.push(")");
        builder.build().execute(&self.pool).await?;
        Ok(member)
    }

    async fn update_member(&self, member: &ChurchMember) -> StoreResult<()> {
        // Rewrite every column except the primary key
        let mut builder = QueryBuilder::new(format!(
            "UPDATE church_members SET ({}) = ROW(",
            MEMBER_COLUMNS.join(", ")
        ));
        bind_member(&mut builder, member);
        builder.push(") WHERE id = ").push_bind(member.id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("church member"));
        }
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<ChurchMember>> {
        let sql = format!(
            "SELECT {} FROM church_members m WHERE m.id = $1",
            select_list("m", MEMBER_COLUMNS)
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| member_from_row(&row, "m_")).transpose()
    }

    async fn find_member_by_member_id(&self, member_id: &str) -> StoreResult<Option<ChurchMember>> {
        let sql = format!(
            "SELECT {} FROM church_members m WHERE m.member_id = $1",
            select_list("m", MEMBER_COLUMNS)
        );
        let row = sqlx::query(&sql)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| member_from_row(&row, "m_")).transpose()
    }

    async fn list_members(&self, filter: &MemberFilter) -> StoreResult<Vec<ChurchMember>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM church_members m WHERE TRUE",
            select_list("m", MEMBER_COLUMNS)
        ));
        push_member_filter(&mut builder, filter);
        builder.push(" ORDER BY m.full_name");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(|row| member_from_row(row, "m_")).collect()
    }

    async fn delete_member(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM church_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LeaderStore for PgStore {
    async fn insert_leader(&self, leader: Leader) -> StoreResult<Leader> {
        sqlx::query(
            "INSERT INTO leaders (id, leader_id, church_member_id, occupation, start_date, \
             responsibilities, time_in_service, date_created) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(leader.id)
        .bind(&leader.leader_id)
        .bind(leader.church_member_id)
        .bind(leader.occupation.as_str())
        .bind(leader.start_date)
        .bind(&leader.responsibilities)
        .bind(&leader.time_in_service)
        .bind(leader.date_created)
        .execute(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict { .. } => {
                StoreError::conflict("This church member already has leader details.")
            }
            other => other,
        })?;
        Ok(leader)
    }

    async fn update_leader(&self, leader: &Leader) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE leaders SET leader_id = $2, occupation = $3, start_date = $4, \
             responsibilities = $5, time_in_service = $6 WHERE id = $1",
        )
        .bind(leader.id)
        .bind(&leader.leader_id)
        .bind(leader.occupation.as_str())
        .bind(leader.start_date)
        .bind(&leader.responsibilities)
        .bind(&leader.time_in_service)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("leader"));
        }
        Ok(())
    }

    async fn get_leader(&self, id: Uuid) -> StoreResult<Option<Leader>> {
        let sql = format!(
            "SELECT {} FROM leaders l WHERE l.id = $1",
            select_list("l", LEADER_COLUMNS)
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| leader_from_row(&row, "l_")).transpose()
    }

    async fn find_leader_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<Leader>> {
        let sql = format!(
            "SELECT {} FROM leaders l WHERE l.church_member_id = $1",
            select_list("l", LEADER_COLUMNS)
        );
        let row = sqlx::query(&sql)
            .bind(church_member_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| leader_from_row(&row, "l_")).transpose()
    }

    async fn leader_id_exists(&self, leader_id: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM leaders WHERE leader_id = $1)")
            .bind(leader_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn list_leaders(&self, filter: &LeaderFilter) -> StoreResult<Vec<LeaderWithMember>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {}, {} FROM leaders l JOIN church_members m ON m.id = l.church_member_id WHERE TRUE",
            select_list("l", LEADER_COLUMNS),
            select_list("m", MEMBER_COLUMNS)
        ));
        push_member_filter(&mut builder, &filter.member);
        if let Some(occupation) = filter.occupation {
            builder.push(" AND l.occupation = ").push_bind(occupation.as_str());
        }
        builder.push(" ORDER BY m.full_name");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> StoreResult<LeaderWithMember> {
                Ok(LeaderWithMember {
                    leader: leader_from_row(row, "l_")?,
                    member: member_from_row(row, "m_")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.user_type.as_str())
        .bind(user.is_superuser)
        .bind(user.church_member_id)
        .bind(&user.profile_picture)
        .bind(&user.password_hash)
        .bind(user.is_agreed_to_terms_and_conditions)
        .bind(user.date_created)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, phone_number = $4, user_type = $5, \
             is_superuser = $6, church_member_id = $7, profile_picture = $8, password_hash = $9, \
             is_agreed_to_terms_and_conditions = $10 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.user_type.as_str())
        .bind(user.is_superuser)
        .bind(user.church_member_id)
        .bind(&user.profile_picture)
        .bind(&user.password_hash)
        .bind(user.is_agreed_to_terms_and_conditions)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user"));
        }
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_member(&self, church_member_id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE church_member_id = $1"
        ))
        .bind(church_member_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl LoginHistoryStore for PgStore {
    async fn record_login(&self, record: LoginHistory) -> StoreResult<LoginHistory> {
        sqlx::query(&format!(
            "INSERT INTO login_history ({LOGIN_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.login_time)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(&record.last_visited_path)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn latest_login(&self, user_id: Uuid) -> StoreResult<Option<LoginHistory>> {
        let row = sqlx::query(&format!(
            "SELECT {LOGIN_COLUMNS} FROM login_history WHERE user_id = $1 \
             ORDER BY login_time DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(login_from_row).transpose()
    }

    async fn previous_login(
        &self,
        user_id: Uuid,
        current_login_id: Uuid,
    ) -> StoreResult<Option<LoginHistory>> {
        let row = sqlx::query(&format!(
            "SELECT {LOGIN_COLUMNS} FROM login_history WHERE user_id = $1 AND id <> $2 \
             ORDER BY login_time DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(current_login_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(login_from_row).transpose()
    }

    async fn set_last_visited_path(&self, record_id: Uuid, path: &str) -> StoreResult<()> {
        if path.chars().count() > LAST_PATH_MAX_LEN {
            tracing::debug!(record_id = %record_id, "Last visited path too long to store");
            return Ok(());
        }
        let result = sqlx::query("UPDATE login_history SET last_visited_path = $2 WHERE id = $1")
            .bind(record_id)
            .bind(path)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("login history"));
        }
        Ok(())
    }

    async fn clear_login_history(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM login_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SmsLogStore for PgStore {
    async fn record_sms(&self, sms: SentSms) -> StoreResult<SentSms> {
        sqlx::query(&format!(
            "INSERT INTO sent_sms ({SMS_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(sms.id)
        .bind(sms.recipient_id)
        .bind(&sms.phone_number)
        .bind(&sms.message)
        .bind(&sms.request_id)
        .bind(&sms.status)
        .bind(sms.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(sms)
    }

    async fn list_sms(&self) -> StoreResult<Vec<SentSms>> {
        let rows = sqlx::query(&format!(
            "SELECT {SMS_COLUMNS} FROM sent_sms ORDER BY sent_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(sms_from_row).collect()
    }

    async fn update_sms_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE sent_sms SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("sent sms"));
        }
        Ok(())
    }

    async fn delete_sms(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sent_sms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_sms(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sent_sms")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl NewsStore for PgStore {
    async fn insert_news(&self, news: News, media: Vec<NewsMedia>) -> StoreResult<NewsWithMedia> {
        sqlx::query(
            "INSERT INTO news (id, title, content, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(news.id)
        .bind(&news.title)
        .bind(&news.content)
        .bind(news.created_at)
        .bind(news.updated_at)
        .execute(&self.pool)
        .await?;
        self.insert_media(&media).await?;
        Ok(NewsWithMedia { news, media })
    }

    async fn update_news(&self, news: &News, media: Option<Vec<NewsMedia>>) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE news SET title = $2, content = $3, updated_at = $4 WHERE id = $1")
                .bind(news.id)
                .bind(&news.title)
                .bind(&news.content)
                .bind(news.updated_at)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("news"));
        }

        if let Some(media) = media {
            sqlx::query("DELETE FROM news_media WHERE news_id = $1")
                .bind(news.id)
                .execute(&self.pool)
                .await?;
            self.insert_media(&media).await?;
        }
        Ok(())
    }

    async fn get_news(&self, id: Uuid) -> StoreResult<Option<NewsWithMedia>> {
        let row = sqlx::query(
            "SELECT id, title, content, created_at, updated_at FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let news = news_from_row(&row)?;
        let media = self.media_for(news.id).await?;
        Ok(Some(NewsWithMedia { news, media }))
    }

    async fn list_news(&self) -> StoreResult<Vec<NewsWithMedia>> {
        let rows = sqlx::query(
            "SELECT id, title, content, created_at, updated_at FROM news ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let news = news_from_row(row)?;
            let media = self.media_for(news.id).await?;
            items.push(NewsWithMedia { news, media });
        }
        Ok(items)
    }

    async fn delete_news(&self, id: Uuid) -> StoreResult<bool> {
        // news_media rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrganisationStore for PgStore {
    async fn insert_outstation(&self, outstation: OutStation) -> StoreResult<OutStation> {
        sqlx::query("INSERT INTO outstations (id, name) VALUES ($1, $2)")
            .bind(outstation.id)
            .bind(&outstation.name)
            .execute(&self.pool)
            .await?;
        Ok(outstation)
    }

    async fn insert_cell(&self, cell: Cell) -> StoreResult<Cell> {
        sqlx::query("INSERT INTO cells (id, name, outstation_id) VALUES ($1, $2, $3)")
            .bind(cell.id)
            .bind(&cell.name)
            .bind(cell.outstation_id)
            .execute(&self.pool)
            .await?;
        Ok(cell)
    }

    async fn list_outstations(&self) -> StoreResult<Vec<OutStation>> {
        let rows = sqlx::query("SELECT id, name FROM outstations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> StoreResult<OutStation> {
                Ok(OutStation {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn list_cells(&self) -> StoreResult<Vec<Cell>> {
        let rows = sqlx::query("SELECT id, name, outstation_id FROM cells ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> StoreResult<Cell> {
                Ok(Cell {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    outstation_id: row.try_get("outstation_id")?,
                })
            })
            .collect()
    }

    async fn list_years(&self) -> StoreResult<Vec<ChurchYear>> {
        let rows = sqlx::query("SELECT id, year, is_current FROM church_years ORDER BY year")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| -> StoreResult<ChurchYear> {
                Ok(ChurchYear {
                    id: row.try_get("id")?,
                    year: row.try_get("year")?,
                    is_current: row.try_get("is_current")?,
                })
            })
            .collect()
    }

    async fn save_year(&self, year: &ChurchYear) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO church_years (id, year, is_current) VALUES ($1, $2, $3) \
             ON CONFLICT (year) DO UPDATE SET is_current = EXCLUDED.is_current",
        )
        .bind(year.id)
        .bind(year.year)
        .bind(year.is_current)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
