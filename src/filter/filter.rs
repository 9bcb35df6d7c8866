use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{DirectoryFilter, SqlResult};

const DIRECTORY_COLUMNS: &str = "u.id, u.prenom, u.nom, u.email, u.annee_diplome, u.section_id, \
     s.nom AS section_nom, e.id AS employer_id, e.nom AS employer_nom, ue.poste, \
     u.is_admin, u.is_active, u.opt_out_contact, u.opt_out_directory, u.created_at";

/// Users joined to their section and current employer
const DIRECTORY_FROM: &str = "FROM users u \
     LEFT JOIN sections s ON s.id = u.section_id \
     LEFT JOIN user_employment ue ON ue.user_id = u.id AND ue.is_current = TRUE \
     LEFT JOIN employers e ON e.id = ue.employer_id";

/// SQL builder for the filtered, sorted, paginated member directory
pub struct DirectoryQuery {
    filter: DirectoryFilter,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl DirectoryQuery {
    /// Validate pagination and cap the limit at `max_limit`
    pub fn new(filter: DirectoryFilter, max_limit: Option<i64>) -> Result<Self, FilterError> {
        if let Some(limit) = filter.limit {
            if limit < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        if let Some(offset) = filter.offset {
            if offset < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        let max_limit = max_limit.unwrap_or(i64::MAX);
        let limit = filter.limit.map(|limit| {
            if limit > max_limit {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max_limit);
                max_limit
            } else {
                limit
            }
        });
        let offset = filter.offset;

        Ok(Self { filter, limit, offset })
    }

    pub fn filter(&self) -> &DirectoryFilter {
        &self.filter
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.filter);
        let order_clause = FilterOrder::generate(&FilterOrder::for_sort(self.filter.sort));
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", DIRECTORY_COLUMNS),
            DIRECTORY_FROM.to_string(),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// Count over the same joins and predicate, ignoring pagination
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.filter);
        let query = format!(
            "SELECT COUNT(*) AS count {} WHERE {}",
            DIRECTORY_FROM, where_clause
        );
        SqlResult { query, params }
    }

    fn build_limit_clause(&self) -> String {
        // Offset without a limit is ignored: no limit means the full set
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}
