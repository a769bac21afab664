//! Read-side query surface over accounts and the business directory.
//!
//! # Responsibility
//! - Provide filter/join queries across accounts, companies, activities
//!   and activity links.
//! - Offer directory seeding helpers on the SQLite implementation.
//!
//! # Invariants
//! - Query APIs never mutate storage.
//! - Substring filters are case-sensitive containment; `%` and `_` in a
//!   fragment are matched literally.
//! - Account listings are ordered by `user_name ASC, id ASC`.

use crate::model::account::{Account, AccountId, AccountWithCompany};
use crate::model::company::{
    ActivityId, Company, CompanyActivity, CompanyActivityLink, CompanyId,
};
use crate::repo::account_store::{collect_accounts, parse_account_row, ACCOUNT_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ACCOUNT_ORDER: &str = "ORDER BY a.user_name ASC, a.id ASC";

/// Read-only relational queries used by `UserAdmin`.
pub trait DirectoryQuery {
    fn list_accounts(&self) -> RepoResult<Vec<Account>>;
    /// Lists all accounts with their company joined (left join).
    fn list_accounts_with_company(&self) -> RepoResult<Vec<AccountWithCompany>>;
    fn list_companies(&self) -> RepoResult<Vec<Company>>;
    fn find_company(&self, id: CompanyId) -> RepoResult<Option<Company>>;
    fn list_activities(&self) -> RepoResult<Vec<CompanyActivity>>;
    fn list_activity_links(&self) -> RepoResult<Vec<CompanyActivityLink>>;
    /// Accounts whose last name contains `fragment`.
    fn search_by_last_name(&self, fragment: &str) -> RepoResult<Vec<Account>>;
    /// Accounts whose company name contains `fragment`. Accounts without a
    /// company never match.
    fn search_by_company_name(&self, fragment: &str) -> RepoResult<Vec<Account>>;
    /// Accounts whose company is linked to an activity described exactly
    /// as `description`.
    fn search_by_activity(&self, description: &str) -> RepoResult<Vec<Account>>;
}

/// SQLite-backed directory queries.
pub struct SqliteDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a company and returns its generated id.
    pub fn insert_company(&self, name: &str, owner: Option<&str>) -> RepoResult<CompanyId> {
        self.conn.execute(
            "INSERT INTO companies (name, owner_account_id) VALUES (?1, ?2);",
            params![name, owner],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Sets or clears the owning account of a company.
    pub fn set_company_owner(&self, id: CompanyId, owner: Option<&str>) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE companies SET owner_account_id = ?1 WHERE id = ?2;",
            params![owner, id],
        )?;
        Ok(())
    }

    /// Inserts an activity and returns its generated id.
    pub fn insert_activity(&self, description: &str) -> RepoResult<ActivityId> {
        self.conn.execute(
            "INSERT INTO company_activities (description) VALUES (?1);",
            [description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Links a company to an activity. Linking twice is a no-op.
    pub fn link_activity(&self, company_id: CompanyId, activity_id: ActivityId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO company_activity_links (company_id, activity_id)
             VALUES (?1, ?2);",
            params![company_id, activity_id],
        )?;
        Ok(())
    }

    fn accounts_where(&self, joins: &str, filter: &str, value: &str) -> RepoResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {ACCOUNT_COLUMNS}
             FROM accounts a
             {joins}
             WHERE {filter}
             {ACCOUNT_ORDER};"
        ))?;
        let rows = stmt.query([value])?;
        collect_accounts(rows)
    }
}

impl DirectoryQuery for SqliteDirectory<'_> {
    fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a {ACCOUNT_ORDER};"))?;
        let rows = stmt.query([])?;
        collect_accounts(rows)
    }

    fn list_accounts_with_company(&self) -> RepoResult<Vec<AccountWithCompany>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {ACCOUNT_COLUMNS},
                c.id AS joined_company_id,
                c.name AS joined_company_name,
                c.owner_account_id AS joined_owner_account_id
             FROM accounts a
             LEFT JOIN companies c ON c.id = a.company_id
             {ACCOUNT_ORDER};"
        ))?;
        let mut rows = stmt.query([])?;
        let mut joined = Vec::new();
        while let Some(row) = rows.next()? {
            let account = parse_account_row(row)?;
            let company = match row.get::<_, Option<CompanyId>>("joined_company_id")? {
                Some(id) => Some(Company {
                    id,
                    name: row.get("joined_company_name")?,
                    owner_account_id: row.get("joined_owner_account_id")?,
                }),
                None => None,
            };
            joined.push(AccountWithCompany { account, company });
        }
        Ok(joined)
    }

    fn list_companies(&self) -> RepoResult<Vec<Company>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, owner_account_id FROM companies ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut companies = Vec::new();
        while let Some(row) = rows.next()? {
            companies.push(parse_company_row(row)?);
        }
        Ok(companies)
    }

    fn find_company(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, owner_account_id FROM companies WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_company_row(row)?));
        }
        Ok(None)
    }

    fn list_activities(&self) -> RepoResult<Vec<CompanyActivity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, description FROM company_activities ORDER BY id ASC;")?;
        let activities = stmt
            .query_map([], |row| {
                Ok(CompanyActivity {
                    id: row.get("id")?,
                    description: row.get("description")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    fn list_activity_links(&self) -> RepoResult<Vec<CompanyActivityLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT company_id, activity_id
             FROM company_activity_links
             ORDER BY company_id ASC, activity_id ASC;",
        )?;
        let links = stmt
            .query_map([], |row| {
                Ok(CompanyActivityLink {
                    company_id: row.get("company_id")?,
                    activity_id: row.get("activity_id")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn search_by_last_name(&self, fragment: &str) -> RepoResult<Vec<Account>> {
        self.accounts_where("", "instr(a.last_name, ?1) > 0", fragment)
    }

    fn search_by_company_name(&self, fragment: &str) -> RepoResult<Vec<Account>> {
        self.accounts_where(
            "INNER JOIN companies c ON c.id = a.company_id",
            "instr(c.name, ?1) > 0",
            fragment,
        )
    }

    fn search_by_activity(&self, description: &str) -> RepoResult<Vec<Account>> {
        self.accounts_where(
            "INNER JOIN company_activity_links l ON l.company_id = a.company_id
             INNER JOIN company_activities act ON act.id = l.activity_id",
            "act.description = ?1",
            description,
        )
    }
}

fn parse_company_row(row: &Row<'_>) -> RepoResult<Company> {
    let id: CompanyId = row.get("id")?;
    let owner_account_id: Option<AccountId> = row.get("owner_account_id")?;
    if owner_account_id.as_deref() == Some("") {
        return Err(RepoError::InvalidData(format!(
            "empty owner_account_id for company {id} in companies.owner_account_id"
        )));
    }
    Ok(Company {
        id,
        name: row.get("name")?,
        owner_account_id,
    })
}
