use crate::dto::user_dto::{StudentSummary, UserProfile};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        Ok(UserProfile {
            role: user.role,
            full_name: user.full_name,
            email: user.email,
        })
    }

    pub async fn list_students(&self) -> Result<Vec<StudentSummary>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, role FROM users WHERE role ILIKE 'student' ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;
        tracing::debug!(count = users.len(), "students listed");

        Ok(users
            .into_iter()
            .map(|u| StudentSummary {
                id: u.id,
                full_name: u.full_name,
                email: u.email,
            })
            .collect())
    }

    pub async fn promote(&self, uid: Uuid, new_role: &str) -> Result<Role> {
        let role: Role = new_role.parse().map_err(Error::BadRequest)?;
        let res = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(uid)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        tracing::info!(user_id = %uid, role = role.as_str(), "user role changed");
        Ok(role)
    }
}
