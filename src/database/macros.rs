/// Defines a method to query the database using SQL.
///
/// # Syntax
/// ```ignore
/// [Base Type] > method_name(...arguments) > [Output Type] where "sql query"
/// ```
/// Where the `Base Type` is the type that the method is being defined for and the `Output Type`
/// is what the first statement is deserialized into, usually `Vec<T>` or `Option<T>`.
/// Every argument is bound to the query parameter of the same name.
///
/// # Example
///
/// ```ignore
/// define_relation! {
///     SnapshotRow > recent(limit: usize) > Vec<SnapshotRow>
///         where "SELECT * FROM stats ORDER BY created_at DESC LIMIT $limit"
/// }
///
/// let rows = SnapshotRow::recent(12, &db).await?;
/// ```
#[macro_export]
macro_rules! define_relation {
    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) > $export:ty where $query:literal) => {
        impl $model {
            pub async fn $relation($($binding : $binding_type ,)* db: &$crate::database::Database) -> $crate::database::Result<$export> {
                db.sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .fetch()
                    .await
            }
        }
    };
}
