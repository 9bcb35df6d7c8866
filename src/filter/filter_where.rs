use super::types::{DirectoryFilter, SqlParam};

/// Accumulates WHERE conditions and their numbered parameters
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    pub fn generate(filter: &DirectoryFilter) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new();
        filter_where.build(filter);
        let where_clause = if filter_where.conditions.is_empty() {
            "1=1".to_string()
        } else {
            filter_where.conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    fn build(&mut self, filter: &DirectoryFilter) {
        if !filter.include_disabled {
            self.conditions.push("u.is_approved = TRUE".to_string());
            self.conditions.push("u.is_active = TRUE".to_string());
        }
        if !filter.show_admins {
            self.conditions.push("u.is_admin = FALSE".to_string());
        }
        if !filter.show_opted_out {
            self.conditions.push("u.opt_out_directory = FALSE".to_string());
        }
        if filter.exclude_contact_opted_out {
            self.conditions.push("u.opt_out_contact = FALSE".to_string());
        }

        if let Some(year) = filter.annee_diplome {
            let p = self.param(SqlParam::Int(year));
            self.conditions.push(format!("u.annee_diplome = {}", p));
        }
        if let Some(section_id) = filter.section_id {
            let p = self.param(SqlParam::Int(section_id));
            self.conditions.push(format!("u.section_id = {}", p));
        }
        if let Some(employer_id) = filter.employer_id {
            let p = self.param(SqlParam::Int(employer_id));
            self.conditions.push(format!("e.id = {}", p));
        }

        // Falsy search means no filter
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let p = self.param(SqlParam::Text(format!("%{}%", escape_like(search))));
            self.conditions.push(format!(
                "(u.nom ILIKE {p} OR u.prenom ILIKE {p} OR u.email ILIKE {p} OR e.nom ILIKE {p})"
            ));
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}

impl Default for FilterWhere {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
