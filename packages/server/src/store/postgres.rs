//! `PostgreSQL` [`RelationalStore`] implementation.
//!
//! Schema, inserts, and `WHERE` clauses are all rendered from the entity
//! descriptor tables, so adding an entity kind needs no SQL of its own.
//! Every identifier is double-quoted: field names such as `abstract` are
//! reserved words in SQL.

use async_trait::async_trait;
use metacat_core::{
    EntityDescriptor, EntityHash, FieldKind, Operator, Predicate, Scalar, ID_FIELD,
};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use tracing::debug;

use super::{RelationalStore, CREATED_FIELD, UPDATED_FIELD};
use crate::config::StoreConfig;
use crate::connect::{AttemptResult, Connector};
use crate::error::StoreError;

/// Relational store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

/// One typed bind parameter for a rendered statement.
enum BindValue {
    Int(Option<i64>),
    Bool(Option<bool>),
    Text(Option<String>),
}

impl BindValue {
    fn for_field(kind: FieldKind, value: Option<&Scalar>) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Code => Self::Text(value.and_then(Scalar::coerce_text)),
            FieldKind::Bool => Self::Bool(value.and_then(Scalar::coerce_bool)),
            FieldKind::Int | FieldKind::ForeignKey { .. } => {
                Self::Int(value.and_then(Scalar::coerce_int))
            }
        }
    }

    fn apply(self, query: Query<'_, Postgres, PgArguments>) -> Query<'_, Postgres, PgArguments> {
        match self {
            Self::Int(value) => query.bind(value),
            Self::Bool(value) => query.bind(value),
            Self::Text(value) => query.bind(value),
        }
    }
}

/// Double-quotes an identifier. Names come from static descriptor tables,
/// never from callers.
fn quoted(name: &str) -> String {
    format!("\"{name}\"")
}

/// Column name for a hash field ([`ID_FIELD`] maps to the `id` column).
fn column(field: &str) -> String {
    if field == ID_FIELD {
        quoted("id")
    } else {
        quoted(field)
    }
}

fn column_type(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => "TEXT".to_string(),
        FieldKind::Code => "VARCHAR(100)".to_string(),
        FieldKind::Bool => "BOOLEAN".to_string(),
        FieldKind::Int => "BIGINT".to_string(),
        FieldKind::ForeignKey { references } => {
            // Referenced tables are created first: the registry orders
            // referenced kinds before the link kinds that point at them.
            format!("BIGINT REFERENCES {} (\"id\")", quoted(references))
        }
    }
}

fn create_table_sql(descriptor: &EntityDescriptor) -> String {
    let mut columns = vec![
        "\"id\" BIGSERIAL PRIMARY KEY".to_string(),
        format!("{} BIGINT NOT NULL DEFAULT 0", quoted(CREATED_FIELD)),
        format!("{} BIGINT NOT NULL DEFAULT 0", quoted(UPDATED_FIELD)),
    ];
    for field in descriptor.fields {
        columns.push(format!("{} {}", quoted(field.name), column_type(field.kind)));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(descriptor.kind),
        columns.join(", ")
    )
}

fn insert_sql(descriptor: &EntityDescriptor) -> String {
    let mut columns = vec![quoted(CREATED_FIELD), quoted(UPDATED_FIELD)];
    for field in descriptor.fields {
        columns.push(quoted(field.name));
    }
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${n}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING \"id\"",
        quoted(descriptor.kind),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(descriptor: &EntityDescriptor) -> String {
    let mut assignments = vec![
        format!("{} = $1", quoted(CREATED_FIELD)),
        format!("{} = $2", quoted(UPDATED_FIELD)),
    ];
    for (position, field) in descriptor.fields.iter().enumerate() {
        assignments.push(format!("{} = ${}", quoted(field.name), position + 3));
    }
    format!(
        "UPDATE {} SET {} WHERE \"id\" = ${}",
        quoted(descriptor.kind),
        assignments.join(", "),
        descriptor.fields.len() + 3
    )
}

/// Renders a predicate as a `WHERE` clause with `$n` placeholders starting
/// at `first_placeholder`, plus the bind values in placeholder order.
fn render_where(
    descriptor: &EntityDescriptor,
    predicate: &Predicate,
    first_placeholder: usize,
) -> (String, Vec<BindValue>) {
    if predicate.is_always_true() {
        return (String::new(), Vec::new());
    }

    let mut clauses = Vec::new();
    let mut binds = Vec::new();
    for (offset, comparison) in predicate.comparisons().iter().enumerate() {
        let placeholder = first_placeholder + offset;
        let kind = if comparison.field == ID_FIELD {
            FieldKind::Int
        } else {
            descriptor
                .field(&comparison.field)
                .map_or(FieldKind::Text, |field| field.kind)
        };

        if comparison.op == Operator::Like {
            // LIKE compares text regardless of the column type.
            clauses.push(format!(
                "{}::text LIKE ${placeholder}",
                column(&comparison.field)
            ));
            binds.push(BindValue::Text(comparison.value.coerce_text()));
        } else {
            clauses.push(format!(
                "{} {} ${placeholder}",
                column(&comparison.field),
                comparison.op.sql()
            ));
            binds.push(BindValue::for_field(kind, Some(&comparison.value)));
        }
    }
    (format!(" WHERE {}", clauses.join(" AND ")), binds)
}

fn select_sql(descriptor: &EntityDescriptor, predicate: &Predicate) -> (String, Vec<BindValue>) {
    let (clause, binds) = render_where(descriptor, predicate, 1);
    (
        format!(
            "SELECT * FROM {}{clause} ORDER BY \"id\"",
            quoted(descriptor.kind)
        ),
        binds,
    )
}

fn hash_from_row(descriptor: &EntityDescriptor, row: &PgRow) -> Result<EntityHash, sqlx::Error> {
    let mut hash = EntityHash::new();
    hash.insert(ID_FIELD, row.try_get::<i64, _>("id")?);
    hash.insert(CREATED_FIELD, row.try_get::<i64, _>(CREATED_FIELD)?);
    hash.insert(UPDATED_FIELD, row.try_get::<i64, _>(UPDATED_FIELD)?);
    for field in descriptor.fields {
        let value = match field.kind {
            FieldKind::Text | FieldKind::Code => row
                .try_get::<Option<String>, _>(field.name)?
                .map_or(Scalar::Null, Scalar::Text),
            FieldKind::Bool => row
                .try_get::<Option<bool>, _>(field.name)?
                .map_or(Scalar::Null, Scalar::Bool),
            FieldKind::Int | FieldKind::ForeignKey { .. } => row
                .try_get::<Option<i64>, _>(field.name)?
                .map_or(Scalar::Null, Scalar::Int),
        };
        hash.insert(field.name, value);
    }
    Ok(hash)
}

impl PostgresStore {
    /// Wraps an already-connected pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_binds(descriptor: &EntityDescriptor, row: &EntityHash) -> Vec<BindValue> {
        let mut binds = vec![
            BindValue::Int(row.get_scalar(CREATED_FIELD).and_then(Scalar::coerce_int)),
            BindValue::Int(row.get_scalar(UPDATED_FIELD).and_then(Scalar::coerce_int)),
        ];
        for field in descriptor.fields {
            binds.push(BindValue::for_field(field.kind, row.get_scalar(field.name)));
        }
        binds
    }
}

#[async_trait]
impl RelationalStore for PostgresStore {
    async fn ensure_table(&self, descriptor: &EntityDescriptor) -> Result<(), StoreError> {
        let sql = create_table_sql(descriptor);
        debug!(kind = descriptor.kind, "ensuring table");
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn insert(
        &self,
        descriptor: &EntityDescriptor,
        row: &EntityHash,
    ) -> Result<i64, StoreError> {
        let sql = insert_sql(descriptor);
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in Self::row_binds(descriptor, row) {
            query = match bind {
                BindValue::Int(value) => query.bind(value),
                BindValue::Bool(value) => query.bind(value),
                BindValue::Text(value) => query.bind(value),
            };
        }
        query.fetch_one(&self.pool).await.map_err(StoreError::backend)
    }

    async fn fetch(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
    ) -> Result<Option<EntityHash>, StoreError> {
        let sql = format!(
            "SELECT * FROM {} WHERE \"id\" = $1",
            quoted(descriptor.kind)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        row.map(|row| hash_from_row(descriptor, &row))
            .transpose()
            .map_err(StoreError::backend)
    }

    async fn select(
        &self,
        descriptor: &EntityDescriptor,
        predicate: &Predicate,
    ) -> Result<Vec<EntityHash>, StoreError> {
        let (sql, binds) = select_sql(descriptor, predicate);
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = bind.apply(query);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        rows.iter()
            .map(|row| hash_from_row(descriptor, row))
            .collect::<Result<_, _>>()
            .map_err(StoreError::backend)
    }

    async fn update(
        &self,
        descriptor: &EntityDescriptor,
        id: i64,
        row: &EntityHash,
    ) -> Result<(), StoreError> {
        let sql = update_sql(descriptor);
        let mut query = sqlx::query(&sql);
        for bind in Self::row_binds(descriptor, row) {
            query = bind.apply(query);
        }
        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                kind: descriptor.kind.to_string(),
                id,
            });
        }
        Ok(())
    }

    async fn delete(&self, descriptor: &EntityDescriptor, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", quoted(descriptor.kind));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Startup connector for the relational store.
pub struct PostgresConnector {
    config: StoreConfig,
}

impl PostgresConnector {
    /// Creates a connector for the configured database.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    type Handle = PostgresStore;

    fn resource(&self) -> &str {
        "relational store"
    }

    async fn connect(&self) -> AttemptResult<PostgresStore> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&self.config.url)
            .await?;
        Ok(PostgresStore::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use metacat_core::{descriptor_for, Comparison, Entity};

    use super::*;

    fn proposals() -> &'static EntityDescriptor {
        metacat_core::Proposal::descriptor()
    }

    #[test]
    fn ddl_quotes_reserved_column_names() {
        let sql = create_table_sql(proposals());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"proposals\""));
        assert!(sql.contains("\"abstract\" TEXT"));
        assert!(sql.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains("\"created\" BIGINT NOT NULL DEFAULT 0"));
    }

    #[test]
    fn link_tables_reference_their_targets() {
        let descriptor = descriptor_for("proposal_participant").unwrap();
        let sql = create_table_sql(descriptor);
        assert!(sql.contains("\"proposal_id\" BIGINT REFERENCES \"proposals\" (\"id\")"));
        assert!(sql.contains("\"person_id\" BIGINT REFERENCES \"users\" (\"id\")"));
    }

    #[test]
    fn insert_returns_the_assigned_identifier() {
        let sql = insert_sql(proposals());
        assert!(sql.starts_with("INSERT INTO \"proposals\" (\"created\", \"updated\","));
        assert!(sql.ends_with("RETURNING \"id\""));
    }

    #[test]
    fn update_targets_one_row_by_identifier() {
        let descriptor = descriptor_for("citation_proposal").unwrap();
        let sql = update_sql(descriptor);
        assert_eq!(
            sql,
            "UPDATE \"citation_proposal\" SET \"created\" = $1, \"updated\" = $2, \
             \"citation_id\" = $3, \"proposal_id\" = $4 WHERE \"id\" = $5"
        );
    }

    #[test]
    fn empty_predicate_selects_everything_in_id_order() {
        let (sql, binds) = select_sql(proposals(), &Predicate::always_true());
        assert_eq!(sql, "SELECT * FROM \"proposals\" ORDER BY \"id\"");
        assert!(binds.is_empty());
    }

    #[test]
    fn comparisons_render_with_numbered_placeholders() {
        let predicate = Predicate::always_true()
            .and(Comparison::new(ID_FIELD, Operator::Eq, 7_i64))
            .and(Comparison::new("title", Operator::Like, "solar%"));
        let (sql, binds) = select_sql(proposals(), &predicate);
        assert_eq!(
            sql,
            "SELECT * FROM \"proposals\" WHERE \"id\" = $1 AND \"title\"::text LIKE $2 \
             ORDER BY \"id\""
        );
        assert_eq!(binds.len(), 2);
    }
}
