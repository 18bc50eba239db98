use crate::domain_model::{Currency, FriendshipStatus};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Database, Decode, Encode, Type};
use std::fmt;
use std::str::FromStr;

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FriendshipStatus::Pending => "PENDING",
            FriendshipStatus::Accepted => "ACCEPTED",
        };
        f.write_str(s)
    }
}

impl FromStr for FriendshipStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            _ => anyhow::bail!("unknown friendship status: {}", s),
        }
    }
}

macro_rules! text_column {
    ($ty:ty) => {
        impl<'r, DB: Database> Decode<'r, DB> for $ty
        where
            &'r str: Decode<'r, DB>,
        {
            fn decode(value: <DB as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<DB>>::decode(value)?;
                Ok(s.parse()?)
            }
        }

        impl<'q, DB: Database> Encode<'q, DB> for $ty
        where
            String: Encode<'q, DB>,
        {
            fn encode_by_ref(
                &self,
                buf: &mut <DB as Database>::ArgumentBuffer<'q>,
            ) -> Result<IsNull, BoxDynError> {
                self.to_string().encode_by_ref(buf)
            }
        }

        impl<DB: Database> Type<DB> for $ty
        where
            String: Type<DB>,
        {
            fn type_info() -> <DB as Database>::TypeInfo {
                <String as Type<DB>>::type_info()
            }

            fn compatible(ty: &<DB as Database>::TypeInfo) -> bool {
                <String as Type<DB>>::compatible(ty)
            }
        }
    };
}

text_column!(FriendshipStatus);
text_column!(Currency);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_form() {
        for s in [FriendshipStatus::Pending, FriendshipStatus::Accepted] {
            assert_eq!(s.to_string().parse::<FriendshipStatus>().unwrap(), s);
        }
        assert!("pending".parse::<FriendshipStatus>().is_err());
    }
}
