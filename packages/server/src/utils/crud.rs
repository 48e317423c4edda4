//! Generic record-store operations over entities keyed by an `i32` id.

use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityName, EntityTrait,
    IntoActiveModel, Iterable, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, QueryOrder,
    SqlErr,
};

use crate::error::AppError;

/// The "no such row" error for table `E`.
pub fn not_found<E: EntityTrait>(id: i32) -> AppError {
    AppError::NotFound(format!(
        "Table {} has no entry with id={id}",
        E::default().table_name()
    ))
}

/// Insert a new row and return it with its server-assigned id.
pub async fn create_entry<A, C>(db: &C, entry: A) -> Result<<A::Entity as EntityTrait>::Model, AppError>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    Ok(entry.insert(db).await?)
}

/// Fetch a row by id, failing with 404 if it does not exist.
pub async fn get_entry<E, C>(db: &C, id: i32) -> Result<E::Model, AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found::<E>(id))
}

/// Every row of `E`, in insertion (primary key) order.
pub async fn fetch_all<E, C>(db: &C) -> Result<Vec<E::Model>, AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut select = E::find();
    for key in E::PrimaryKey::iter() {
        select = select.order_by_asc(key.into_column());
    }
    Ok(select.all(db).await?)
}

/// The first row of `E` matching `filter`, if any.
pub async fn fetch_one<E, C, F>(db: &C, filter: F) -> Result<Option<E::Model>, AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    F: IntoCondition,
{
    Ok(E::find().filter(filter).one(db).await?)
}

/// Persist the changed columns of an existing row.
pub async fn update_entry<A, C>(db: &C, entry: A) -> Result<<A::Entity as EntityTrait>::Model, AppError>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    Ok(entry.update(db).await?)
}

/// Delete a row by id and return it as it was before deletion.
///
/// Rows still referenced by other tables are refused with 409.
pub async fn delete_entry<E, C>(db: &C, id: i32) -> Result<E::Model, AppError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    let entry = get_entry::<E, C>(db, id).await?;

    E::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(format!(
                "Entry with id={id} of table {} is still referenced",
                E::default().table_name()
            )),
            _ => AppError::from(e),
        })?;

    Ok(entry)
}
