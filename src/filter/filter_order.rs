use super::types::{FilterOrderInfo, SortDirection, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Fixed tie-break policy for each sort key
    pub fn for_sort(key: SortKey) -> Vec<FilterOrderInfo> {
        use SortDirection::{Asc, Desc};

        let columns: &[(&'static str, SortDirection)] = match key {
            SortKey::Name => &[("u.nom", Asc), ("u.prenom", Asc)],
            SortKey::Year => &[("u.annee_diplome", Desc), ("u.nom", Asc), ("u.prenom", Asc)],
            SortKey::Section => &[
                ("s.nom", Asc),
                ("u.annee_diplome", Desc),
                ("u.nom", Asc),
                ("u.prenom", Asc),
            ],
            SortKey::Employer => &[("e.nom", Asc), ("u.nom", Asc), ("u.prenom", Asc)],
            SortKey::CreatedAt => &[("u.created_at", Desc)],
        };

        columns.iter()
            .map(|&(column, sort)| FilterOrderInfo { column, sort })
            .collect()
    }

    /// Render ORDER BY; `u.id` is appended so pages never overlap
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {} NULLS LAST", i.column, i.sort.to_sql()))
            .collect();
        parts.push("u.id ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }
}
