use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

pub fn downcast<'a, 't>(tx: &'a mut dyn StorageTx<'t>) -> anyhow::Result<&'a mut MySqlTx<'t>> {
    if tx.backend() != StorageBackend::MySql {
        anyhow::bail!("{:?} transaction handed to a MySQL repo", tx.backend());
    }
    // SAFETY: MySqlTx is the only StorageTx reporting the MySql backend.
    let tx = unsafe {
        let p = tx as *mut dyn StorageTx<'t>;
        let p = p as *mut MySqlTx<'t>;
        &mut *p
    };
    Ok(tx)
}

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// `%needle%` with LIKE metacharacters escaped.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("bob"), "%bob%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
