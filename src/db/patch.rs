// src/db/patch.rs

use sqlx::{Encode, QueryBuilder, Sqlite, SqliteExecutor, Type};

use crate::utils::patch::Field;

/// Sparse `UPDATE ... SET` statement: only the columns that were set are written.
pub struct UpdateBuilder<'args> {
    builder: QueryBuilder<'args, Sqlite>,
    columns: usize,
    scope: Vec<(&'static str, &'args str)>,
}

impl<'args> UpdateBuilder<'args> {
    pub fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {} SET ", table)),
            columns: 0,
            scope: Vec::new(),
        }
    }

    pub fn set<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite>,
    {
        if self.columns > 0 {
            self.builder.push(", ");
        }
        self.builder.push(column);
        self.builder.push(" = ");
        self.builder.push_bind(value);
        self.columns += 1;
        self
    }

    /// Writes the column only when a value is given.
    pub fn set_some<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite>,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    /// Writes the column for `Value` and `Null`, skips it for `Missing`.
    pub fn set_field<T>(&mut self, column: &str, field: Field<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite>,
    {
        if let Some(value) = field.into_update() {
            self.set(column, value);
        }
        self
    }

    /// Restricts the update to rows where `column = value`, on top of the key.
    pub fn scope(&mut self, column: &'static str, value: &'args str) -> &mut Self {
        self.scope.push((column, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns == 0
    }

    /// Runs the statement against rows where `key_column = key`; returns affected rows.
    /// Nothing is executed when no column was set.
    pub async fn execute<'e, E>(
        mut self,
        key_column: &str,
        key: &'args str,
        executor: E,
    ) -> Result<u64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        if self.is_empty() {
            return Ok(0);
        }
        self.builder.push(" WHERE ");
        self.builder.push(key_column);
        self.builder.push(" = ");
        self.builder.push_bind(key);
        for (column, value) in std::mem::take(&mut self.scope) {
            self.builder.push(" AND ");
            self.builder.push(column);
            self.builder.push(" = ");
            self.builder.push_bind(value);
        }

        let result = self.builder.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        self.builder.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_columns_are_written() {
        let mut update = UpdateBuilder::new("dynamics");
        update
            .set("title", "New".to_string())
            .set_some::<i64>("duration", None)
            .set_field::<i64>("max_students", Field::Null)
            .set_field::<i64>("min_students", Field::Missing);

        assert_eq!(update.sql(), "UPDATE dynamics SET title = ?, max_students = ?");
    }

    #[test]
    fn empty_update_has_no_columns() {
        let update = UpdateBuilder::new("posts");
        assert!(update.is_empty());
    }
}
