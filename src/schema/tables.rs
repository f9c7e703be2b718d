//! Table definitions for the emissions database

use super::types::*;

pub static COUNTRIES: TableSchema = TableSchema {
    name: "countries",
    columns: &[
        Column::surrogate_key("id"),
        Column::required("name", ColumnType::Text).unique(),
    ],
    foreign_keys: &[],
};

/// `emission_value` stays nullable: missing figures are stored as NULL until cleaning
pub static EMISSIONS: TableSchema = TableSchema {
    name: "emissions",
    columns: &[
        Column::surrogate_key("id"),
        Column::required("country_id", ColumnType::Integer),
        Column::required("year", ColumnType::Integer),
        Column::new("emission_value", ColumnType::Real),
    ],
    foreign_keys: &[ForeignKey::new("country_id", "countries")],
};

/// All tables in creation order (parents before children)
pub static ALL_TABLES: &[&TableSchema] = &[&COUNTRIES, &EMISSIONS];
