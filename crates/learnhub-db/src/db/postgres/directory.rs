use learnhub_core::models::{
    NewOrganization, NewUser, Organization, OrganizationDeletion, OrganizationStatus, User,
    UserRole,
};
use learnhub_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::conflict_on_unique;
use crate::db::traits::DirectoryRepository;
use crate::db::transaction::TransactionGuard;

const USER_COLUMNS: &str =
    "id, username, email, role, designation, organization_id, created_at";
const ORGANIZATION_COLUMNS: &str = "id, name, domain, status, portal_admin_id, created_at";

#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert", username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let created = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, role, designation, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.designation)
        .bind(user.organization_id)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email already exists"))?;

        if let (UserRole::Employee, Some(org_id)) = (created.role, created.organization_id) {
            sqlx::query(
                r#"
                INSERT INTO user_courses (user_id, course_id)
                SELECT $1, course_id FROM organization_courses WHERE organization_id = $2
                "#,
            )
            .bind(created.id)
            .bind(org_id)
            .execute(tx.conn())
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn list_employees(&self, organization_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {} FROM users WHERE organization_id = $1 AND role = 'employee' ORDER BY username",
            USER_COLUMNS
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {} FROM users WHERE ($1::text IS NULL OR role = $1) ORDER BY created_at, username",
            USER_COLUMNS
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        // course links, progress, interactions and own requests cascade
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, organization), fields(db.table = "organizations", db.operation = "insert", name = %organization.name))]
    async fn create_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<(Organization, User), AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;
        let org_id = Uuid::new_v4();
        let admin_id = Uuid::new_v4();

        sqlx::query("INSERT INTO organizations (id, name, domain, status) VALUES ($1, $2, $3, $4)")
            .bind(org_id)
            .bind(&organization.name)
            .bind(&organization.domain)
            .bind(organization.status)
            .execute(tx.conn())
            .await
            .map_err(|e| conflict_on_unique(e, "Organization name already exists"))?;

        let admin = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, role, organization_id)
            VALUES ($1, $2, $3, 'portal_admin', $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(admin_id)
        .bind(&organization.portal_admin_username)
        .bind(&organization.portal_admin_email)
        .bind(org_id)
        .fetch_one(tx.conn())
        .await
        .map_err(|e| conflict_on_unique(e, "Portal admin username or email already exists"))?;

        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            "UPDATE organizations SET portal_admin_id = $2 WHERE id = $1 RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(org_id)
        .bind(admin_id)
        .fetch_one(tx.conn())
        .await?;

        tx.commit().await?;
        Ok((org, admin))
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    async fn get_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            "SELECT {} FROM organizations WHERE id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select"))]
    async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<Postgres, Organization>(&format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC, id",
            ORGANIZATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "update"))]
    async fn update_organization_status(
        &self,
        organization_id: Uuid,
        status: OrganizationStatus,
    ) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            "UPDATE organizations SET status = $2 WHERE id = $1 RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(organization_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "delete"))]
    async fn delete_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<OrganizationDeletion>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM organizations WHERE id = $1 FOR UPDATE")
                .bind(organization_id)
                .fetch_optional(tx.conn())
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "DELETE FROM user_courses WHERE user_id IN (SELECT id FROM users WHERE organization_id = $1)",
        )
        .bind(organization_id)
        .execute(tx.conn())
        .await?;

        let requests = sqlx::query("DELETE FROM course_requests WHERE organization_id = $1")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        sqlx::query("DELETE FROM organization_courses WHERE organization_id = $1")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        let users = sqlx::query("DELETE FROM users WHERE organization_id = $1")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(organization_id)
            .execute(tx.conn())
            .await?;

        tx.commit().await?;

        Ok(Some(OrganizationDeletion {
            organization_id,
            users_deleted: users.rows_affected(),
            course_requests_deleted: requests.rows_affected(),
        }))
    }
}
