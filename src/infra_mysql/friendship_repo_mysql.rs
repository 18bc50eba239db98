use super::util::{downcast, is_dup_key};
use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlFriendshipRepo {
    pool: MySqlPool,
}

impl MySqlFriendshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_edge(row: MySqlRow) -> anyhow::Result<FriendshipEdge> {
        Ok(FriendshipEdge {
            requester: row.try_get("requester_id").context("decode requester_id")?,
            addressee: row.try_get("addressee_id").context("decode addressee_id")?,
            status: row.try_get("status").context("decode status")?,
            created_at: row.try_get("created_at").context("decode created_at")?,
        })
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MySqlFriendshipRepo {
    async fn insert_pending_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<FriendshipClaim> {
        if requester == addressee {
            anyhow::bail!("friendship with self");
        }
        let pair = UserPair::new(requester, addressee);
        let tx = downcast(tx)?;

        // uk_friendship_pair rejects a second edge in either direction
        let res = sqlx::query(
            r#"
INSERT INTO friendship (requester_id, addressee_id, user_min, user_max, status, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(requester)
        .bind(addressee)
        .bind(UserPair::min(&pair))
        .bind(UserPair::max(&pair))
        .bind(FriendshipStatus::Pending)
        .bind(created_at)
        .execute(tx.conn())
        .await;

        match res {
            Ok(_) => Ok(FriendshipClaim::Won),
            Err(e) if is_dup_key(&e) => Ok(FriendshipClaim::Existing),
            Err(e) => Err(anyhow::anyhow!("friendship insert: {e}")),
        }
    }

    async fn accept_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        requester: UserId,
        addressee: UserId,
    ) -> anyhow::Result<bool> {
        let tx = downcast(tx)?;

        let res = sqlx::query(
            r#"
UPDATE friendship
SET status = ?
WHERE requester_id = ? AND addressee_id = ? AND status = ?
"#,
        )
        .bind(FriendshipStatus::Accepted)
        .bind(requester)
        .bind(addressee)
        .bind(FriendshipStatus::Pending)
        .execute(tx.conn())
        .await
        .context("accept friendship")?;

        Ok(res.rows_affected() == 1)
    }

    async fn delete_pending_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64> {
        let pair = UserPair::new(a, b);
        let tx = downcast(tx)?;

        let res = sqlx::query(
            "DELETE FROM friendship WHERE user_min = ? AND user_max = ? AND status = ?",
        )
        .bind(UserPair::min(&pair))
        .bind(UserPair::max(&pair))
        .bind(FriendshipStatus::Pending)
        .execute(tx.conn())
        .await
        .context("delete pending friendship")?;

        Ok(res.rows_affected())
    }

    async fn delete_between_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: UserId,
        b: UserId,
    ) -> anyhow::Result<u64> {
        let pair = UserPair::new(a, b);
        let tx = downcast(tx)?;

        let res = sqlx::query("DELETE FROM friendship WHERE user_min = ? AND user_max = ?")
            .bind(UserPair::min(&pair))
            .bind(UserPair::max(&pair))
            .execute(tx.conn())
            .await
            .context("delete friendship")?;

        Ok(res.rows_affected())
    }

    async fn list_incident(&self, user_id: UserId) -> anyhow::Result<Vec<FriendshipEdge>> {
        let rows = sqlx::query(
            r#"
SELECT requester_id, addressee_id, status, created_at
FROM friendship
WHERE requester_id = ?
UNION ALL
SELECT requester_id, addressee_id, status, created_at
FROM friendship
WHERE addressee_id = ?
"#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list friendships")?;

        rows.into_iter().map(Self::row_to_edge).collect()
    }
}
