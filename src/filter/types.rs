use serde::{Deserialize, Serialize};

/// Sort keys accepted by the directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Year,
    Section,
    Employer,
    CreatedAt,
}

impl SortKey {
    /// Parse a query-string value; anything unknown sorts by name
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("year") => SortKey::Year,
            Some("section") => SortKey::Section,
            Some("employer") => SortKey::Employer,
            Some("created_at") => SortKey::CreatedAt,
            _ => SortKey::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Year => "year",
            SortKey::Section => "section",
            SortKey::Employer => "employer",
            SortKey::CreatedAt => "created_at",
        }
    }
}

/// Filters for the member directory.
///
/// `search` is matched with ILIKE against last name, first name, email and
/// the current employer's name. A `None` or empty search applies no filter.
/// Without `limit` the whole filtered set is returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFilter {
    pub annee_diplome: Option<i32>,
    pub section_id: Option<i32>,
    pub employer_id: Option<i32>,
    pub search: Option<String>,
    pub show_admins: bool,
    pub show_opted_out: bool,
    /// Also list deactivated and unapproved accounts (admin views only)
    #[serde(default)]
    pub include_disabled: bool,
    /// Drop users who refused contact sharing (exports)
    #[serde(default)]
    pub exclude_contact_opted_out: bool,
    #[serde(default)]
    pub sort: SortKey,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parse_falls_back_to_name() {
        assert_eq!(SortKey::parse(Some("year")), SortKey::Year);
        assert_eq!(SortKey::parse(Some("created_at")), SortKey::CreatedAt);
        assert_eq!(SortKey::parse(Some("salary")), SortKey::Name);
        assert_eq!(SortKey::parse(None), SortKey::Name);
    }

    #[test]
    fn sort_key_as_str_matches_parse() {
        for key in [SortKey::Name, SortKey::Year, SortKey::Section, SortKey::Employer, SortKey::CreatedAt] {
            assert_eq!(SortKey::parse(Some(key.as_str())), key);
        }
    }
}
