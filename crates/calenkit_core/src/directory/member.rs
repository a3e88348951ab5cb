//! Member directory contract and SQLite implementation.
//!
//! # Invariants
//! - Member ids are compared exactly; callers normalize before lookups.
//! - `register` is an upsert and never deletes members.

use crate::model::member::Member;
use crate::repo::{ensure_connection_ready, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};

static MEMBER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid member id regex"));

/// Returns whether `member_id` looks like the email address members log in with.
pub fn is_valid_member_id(member_id: &str) -> bool {
    MEMBER_ID_RE.is_match(member_id)
}

/// Lookup contract for the member directory.
pub trait MemberDirectory {
    fn resolve(&self, member_id: &str) -> RepoResult<Option<Member>>;
}

/// Member directory backed by the `members` table.
#[derive(Clone, Copy)]
pub struct SqliteMemberDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberDirectory<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["members"])?;
        Ok(Self { conn })
    }

    /// Inserts or renames one member.
    pub fn register(&self, member: &Member) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO members (mem_id, name)
             VALUES (?1, ?2)
             ON CONFLICT (mem_id) DO UPDATE SET name = excluded.name;",
            params![member.member_id.as_str(), member.name.as_str()],
        )?;
        Ok(())
    }
}

impl MemberDirectory for SqliteMemberDirectory<'_> {
    fn resolve(&self, member_id: &str) -> RepoResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                "SELECT mem_id, name FROM members WHERE mem_id = ?1;",
                [member_id],
                |row| {
                    Ok(Member {
                        member_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(member)
    }
}
