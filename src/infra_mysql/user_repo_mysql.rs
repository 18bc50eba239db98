use super::util::{downcast, is_dup_key, like_pattern};
use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::Context;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const USER_COLUMNS: &str = "u.user_id, u.username, u.firstname, u.surname, u.fullname, \
                            u.currency, u.photo, u.photo_small, u.created_at";

const SEARCH_CLAUSE: &str = "(LOWER(u.username) LIKE ? OR LOWER(u.firstname) LIKE ? \
                             OR LOWER(u.surname) LIKE ? OR LOWER(u.fullname) LIKE ?)";

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> anyhow::Result<UserRecord> {
        Ok(UserRecord {
            user_id: row.try_get("user_id").context("decode user_id")?,
            username: row.try_get("username").context("decode username")?,
            firstname: row.try_get("firstname").context("decode firstname")?,
            surname: row.try_get("surname").context("decode surname")?,
            fullname: row.try_get("fullname").context("decode fullname")?,
            currency: row.try_get("currency").context("decode currency")?,
            photo: row.try_get("photo").context("decode photo")?,
            photo_small: row.try_get("photo_small").context("decode photo_small")?,
            created_at: row.try_get("created_at").context("decode created_at")?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<UserClaim> {
        let tx = downcast(tx)?;

        let res = sqlx::query(
            r#"
INSERT INTO user (user_id, username, firstname, surname, fullname, currency, photo, photo_small, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(&record.firstname)
        .bind(&record.surname)
        .bind(&record.fullname)
        .bind(record.currency)
        .bind(&record.photo)
        .bind(&record.photo_small)
        .bind(record.created_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(UserClaim::Won),
            Err(e) if is_dup_key(&e) => Ok(UserClaim::Existing),
            Err(e) => Err(anyhow::anyhow!("user insert: {e}")),
        }
    }

    async fn save_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> anyhow::Result<()> {
        let tx = downcast(tx)?;

        sqlx::query(
            r#"
INSERT INTO user (user_id, username, firstname, surname, fullname, currency, photo, photo_small, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
ON DUPLICATE KEY UPDATE
    firstname = VALUES(firstname),
    surname = VALUES(surname),
    fullname = VALUES(fullname),
    currency = VALUES(currency),
    photo = VALUES(photo),
    photo_small = VALUES(photo_small)
"#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(&record.firstname)
        .bind(&record.surname)
        .bind(&record.fullname)
        .bind(record.currency)
        .bind(&record.photo)
        .bind(&record.photo_small)
        .bind(record.created_at)
        .execute(tx.conn())
        .await
        .context("user save")?;

        Ok(())
    }

    async fn find_by_username_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> anyhow::Result<Option<UserRecord>> {
        let tx = downcast(tx)?;

        let sql = format!("SELECT {USER_COLUMNS} FROM user u WHERE u.username = ?");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(tx.conn())
            .await
            .context("query user by username")?;

        row.map(Self::row_to_record).transpose()
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user u WHERE u.username = ?");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("query user by username")?;

        row.map(Self::row_to_record).transpose()
    }

    async fn list_excluding(
        &self,
        username: &str,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>> {
        let rows = match search_needle(search) {
            None => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM user u WHERE u.username <> ? ORDER BY u.username"
                );
                sqlx::query(&sql)
                    .bind(username)
                    .fetch_all(&self.pool)
                    .await
            }
            Some(needle) => {
                let pattern = like_pattern(&needle);
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM user u WHERE u.username <> ? AND {SEARCH_CLAUSE} \
                     ORDER BY u.username"
                );
                sqlx::query(&sql)
                    .bind(username)
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("list users")?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn list_friends(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<UserRecord>> {
        let base = format!(
            r#"
SELECT {USER_COLUMNS}
FROM friendship f
JOIN user u
  ON u.user_id = IF(f.requester_id = ?, f.addressee_id, f.requester_id)
WHERE f.status = 'ACCEPTED'
  AND (f.requester_id = ? OR f.addressee_id = ?)
"#
        );

        let rows = match search_needle(search) {
            None => {
                let sql = format!("{base} ORDER BY u.username");
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(user_id)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
            }
            Some(needle) => {
                let pattern = like_pattern(&needle);
                let sql = format!("{base} AND {SEARCH_CLAUSE} ORDER BY u.username");
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(user_id)
                    .bind(user_id)
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(&pattern)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("list friends")?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
