//! CSV and plain-text renderings of the member and employer lists.

use std::str::FromStr;

use crate::database::models::EmployerSummary;
use crate::database::users::DirectoryRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Text,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Text),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// Rows of strings under a fixed header
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>, csv::Error> {
        match format {
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Text => Ok(self.to_text().into_bytes()),
        }
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }

    /// One line per row, columns padded to their widest value
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |cells: Vec<&str>| -> String {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut out = String::new();
        out.push_str(&line(self.headers.clone()));
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

pub fn users_table(rows: &[DirectoryRow]) -> Table {
    Table {
        headers: vec!["nom", "prenom", "email", "annee_diplome", "section", "employeur", "poste"],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.nom.clone(),
                    r.prenom.clone(),
                    r.email.clone(),
                    opt(&r.annee_diplome),
                    opt(&r.section_nom),
                    opt(&r.employer_nom),
                    opt(&r.poste),
                ]
            })
            .collect(),
    }
}

pub fn employers_table(rows: &[EmployerSummary]) -> Table {
    Table {
        headers: vec!["nom", "secteur", "ville", "employes_actuels"],
        rows: rows
            .iter()
            .map(|e| {
                vec![
                    e.nom.clone(),
                    opt(&e.secteur),
                    opt(&e.ville),
                    e.current_employees.to_string(),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employers() -> Vec<EmployerSummary> {
        vec![
            EmployerSummary {
                id: 1,
                nom: "Acme, Inc.".to_string(),
                secteur: Some("Industrie".to_string()),
                ville: None,
                current_employees: 12,
            },
            EmployerSummary {
                id: 2,
                nom: "Bolt".to_string(),
                secteur: None,
                ville: Some("Lyon".to_string()),
                current_employees: 3,
            },
        ]
    }

    #[test]
    fn parses_formats() {
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("TXT".parse::<ExportFormat>(), Ok(ExportFormat::Text));
        assert_eq!("".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let csv = String::from_utf8(employers_table(&employers()).to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "nom,secteur,ville,employes_actuels");
        assert_eq!(lines[1], "\"Acme, Inc.\",Industrie,,12");
        assert_eq!(lines[2], "Bolt,,Lyon,3");
    }

    #[test]
    fn text_columns_are_aligned() {
        let text = employers_table(&employers()).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "nom         secteur    ville  employes_actuels");
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2], "Acme, Inc.  Industrie         12");
        assert_eq!(lines[3], "Bolt                   Lyon   3");
    }
}
