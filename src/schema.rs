use serde::Serialize;

use crate::driver::CellValue;
use crate::error::TdvqError;
use crate::materialize::QueryResult;

/// Introspection query over the TDV system catalog for one datasource.
pub fn schema_query(datasource: &str) -> String {
    format!(
        "SELECT SCHEMA_NAME AS table_schema, TABLE_NAME AS table_name, \
         COLUMN_NAME AS column_name, DATA_TYPE AS data_type \
         FROM /services/databases/system/ALL_COLUMNS \
         WHERE DATASOURCE_NAME = '{}' \
         ORDER BY SCHEMA_NAME, TABLE_NAME, ORDINAL_POSITION",
        datasource.replace('\'', "''")
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDescription {
    pub schemas: Vec<SchemaInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub name: String,
    pub tables: Vec<TableInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Group introspection rows into schema → table → columns, keeping the
/// order in which each name first appears.
pub fn format_schema(result: &QueryResult) -> Result<SchemaDescription, TdvqError> {
    for required in ["table_schema", "table_name", "column_name", "data_type"] {
        if !result
            .columns
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(required))
        {
            return Err(TdvqError::Format {
                message: format!("schema result is missing column '{}'", required),
            });
        }
    }

    let mut description = SchemaDescription::default();

    for idx in 0..result.rows.len() {
        let text = |column: &str| match result.value(idx, column) {
            Some(CellValue::Text(s)) => s.clone(),
            _ => String::new(),
        };

        let schema_name = text("table_schema");
        let table_name = text("table_name");

        let schema_pos = match description
            .schemas
            .iter()
            .position(|s| s.name == schema_name)
        {
            Some(pos) => pos,
            None => {
                description.schemas.push(SchemaInfo {
                    name: schema_name,
                    tables: Vec::new(),
                });
                description.schemas.len() - 1
            }
        };
        let schema = &mut description.schemas[schema_pos];

        let table_pos = match schema.tables.iter().position(|t| t.name == table_name) {
            Some(pos) => pos,
            None => {
                schema.tables.push(TableInfo {
                    name: table_name,
                    columns: Vec::new(),
                });
                schema.tables.len() - 1
            }
        };
        let table = &mut schema.tables[table_pos];

        table.columns.push(ColumnInfo {
            name: text("column_name"),
            data_type: text("data_type"),
        });
    }

    Ok(description)
}
