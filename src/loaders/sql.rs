use crate::domain::model::TableSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
    MySql,
}

pub fn quote_ident(dialect: Dialect, ident: &str) -> String {
    match dialect {
        Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
    }
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// MySQL 字串字面值另外需要跳脫反斜線
pub fn quote_mysql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

pub fn create_table_sql(dialect: Dialect, schema: &TableSchema) -> String {
    let column_defs = schema
        .columns
        .iter()
        .map(|col| format!("{} TEXT", quote_ident(dialect, col)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        quote_ident(dialect, &schema.table_name),
        column_defs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema {
            table_name: "orders".to_string(),
            columns: vec!["id".to_string(), "customer name".to_string()],
        }
    }

    #[test]
    fn test_create_table_double_quoted() {
        assert_eq!(
            create_table_sql(Dialect::Postgres, &schema()),
            r#"CREATE TABLE IF NOT EXISTS "orders" ("id" TEXT, "customer name" TEXT);"#
        );
        assert_eq!(
            create_table_sql(Dialect::Sqlite, &schema()),
            create_table_sql(Dialect::Postgres, &schema())
        );
    }

    #[test]
    fn test_create_table_backtick_quoted() {
        assert_eq!(
            create_table_sql(Dialect::MySql, &schema()),
            "CREATE TABLE IF NOT EXISTS `orders` (`id` TEXT, `customer name` TEXT);"
        );
    }

    #[test]
    fn test_quote_escaping() {
        assert_eq!(quote_ident(Dialect::Postgres, "a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_ident(Dialect::MySql, "a`b"), "`a``b`");
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_mysql_literal("C:\\data\\x.csv"), "'C:\\\\data\\\\x.csv'");
    }
}
