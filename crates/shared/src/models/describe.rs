use chrono::NaiveDate;
use serde::Serialize;

use crate::models::field::FieldType;
use crate::models::table::{ColumnKind, Table};

/// Information about one field for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbfFieldInfo {
    pub name: String,
    pub original_name: String,
    pub type_tag: FieldType,
    pub kind: ColumnKind,
    pub displacement: u32,
    pub length: u8,
}

/// Summary information about a decoded DBF file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbfSummary {
    pub version: u8,
    pub last_update: Option<NaiveDate>,
    pub record_count: u32,
    pub first_record_offset: u16,
    pub record_length: u16,
    pub field_count: usize,
    pub rows_decoded: usize,
    pub deleted_rows: usize,
    pub fields: Vec<DbfFieldInfo>,
}

impl DbfSummary {
    pub fn from_table(table: &Table) -> Self {
        let header = table.header();
        let fields = table
            .fields()
            .iter()
            .zip(table.schema())
            .map(|(field, column)| DbfFieldInfo {
                name: field.name.clone(),
                original_name: field.original_name.clone(),
                type_tag: field.field_type,
                kind: column.kind,
                displacement: field.displacement,
                length: field.length,
            })
            .collect::<Vec<_>>();

        Self {
            version: header.version,
            last_update: header.last_update,
            record_count: header.record_count,
            first_record_offset: header.first_record_offset,
            record_length: header.record_length,
            field_count: fields.len(),
            rows_decoded: table.len(),
            deleted_rows: table.records().iter().filter(|r| r.deleted).count(),
            fields,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain text listing, one line per field
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Version: 0x{:02X}\n", self.version));
        if let Some(date) = self.last_update {
            out.push_str(&format!("Last update: {date}\n"));
        }
        out.push_str(&format!(
            "Records: {} declared, {} decoded, {} deleted\n",
            self.record_count, self.rows_decoded, self.deleted_rows
        ));
        out.push_str(&format!(
            "Record length: {} (first record at {})\n",
            self.record_length, self.first_record_offset
        ));
        out.push_str(&format!("Fields: {}\n", self.field_count));
        for (i, field) in self.fields.iter().enumerate() {
            let renamed = if field.name != field.original_name {
                format!(" (was {})", field.original_name)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "{:3}: {}{} [{}] -> {:?} @{} len {}\n",
                i + 1,
                field.name,
                renamed,
                field.type_tag.tag(),
                field.kind,
                field.displacement,
                field.length
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldDescriptor;
    use crate::models::header::Header;
    use crate::models::record::{Row, Value};

    fn sample() -> Table {
        let header = Header {
            version: 0x03,
            last_update: NaiveDate::from_ymd_opt(2001, 1, 2),
            record_count: 2,
            first_record_offset: 97,
            record_length: 15,
        };
        let mut select = FieldDescriptor::new("F_SELECT", FieldType::Character, 5, 10);
        select.original_name = "SELECT".to_string();
        let fields = vec![FieldDescriptor::new("ID", FieldType::Numeric, 1, 4), select];
        let mut gone = Row::new(vec![Value::Integer(2), Value::from("b")]);
        gone.deleted = true;
        Table::new(header, fields, vec![Row::new(vec![Value::Integer(1), Value::from("a")]), gone])
    }

    #[test]
    fn test_summary_counts() {
        let summary = DbfSummary::from_table(&sample());
        assert_eq!(summary.field_count, 2);
        assert_eq!(summary.rows_decoded, 2);
        assert_eq!(summary.deleted_rows, 1);
        assert_eq!(summary.fields[0].kind, ColumnKind::Integer);
        assert_eq!(summary.fields[1].kind, ColumnKind::Text);
    }

    #[test]
    fn test_summary_json() {
        let json = DbfSummary::from_table(&sample()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["record_count"], 2);
        assert_eq!(value["last_update"], "2001-01-02");
        assert_eq!(value["fields"][0]["type_tag"], "N");
        assert_eq!(value["fields"][1]["kind"], "text");
        assert_eq!(value["fields"][1]["original_name"], "SELECT");
    }

    #[test]
    fn test_summary_text() {
        let text = DbfSummary::from_table(&sample()).to_text();
        assert!(text.contains("Records: 2 declared, 2 decoded, 1 deleted"));
        assert!(text.contains("F_SELECT (was SELECT) [C]"));
    }
}
