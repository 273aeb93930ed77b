use sea_orm::sea_query::{Alias, Expr, InsertStatement, OnConflict, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DbErr, Value};

/// What happens to a column when the insert hits the conflict key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    /// `col = excluded.col`
    Overwrite,
    /// `col = col OR excluded.col`; a flag that is set stays set.
    Accumulate,
    /// `col = CURRENT_TIMESTAMP`, whether or not the column is inserted.
    Touch,
}

/// A natural-key upsert against one table.
///
/// `columns` are bound positionally on insert. `on_conflict` lists the columns
/// rewritten when a row with the same `conflict` key already exists; an empty
/// list means `DO NOTHING` (insert-or-ignore).
#[derive(Debug, Clone, Copy)]
pub struct UpsertSpec {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub conflict: &'static [&'static str],
    pub on_conflict: &'static [(&'static str, Assign)],
}

impl UpsertSpec {
    fn conflict_action(&self) -> OnConflict {
        let mut action = OnConflict::columns(self.conflict.iter().map(|c| Alias::new(*c)));
        if self.on_conflict.is_empty() {
            return action.do_nothing().to_owned();
        }
        for (column, assign) in self.on_conflict {
            match assign {
                Assign::Overwrite => action.update_column(Alias::new(*column)),
                Assign::Accumulate => action.value(
                    Alias::new(*column),
                    SimpleExpr::from(Expr::col(Alias::new(*column)))
                        .or(Expr::col((Alias::new("excluded"), Alias::new(*column))).into()),
                ),
                Assign::Touch => action.value(Alias::new(*column), Expr::current_timestamp()),
            };
        }
        action.to_owned()
    }

    /// Build the `INSERT .. ON CONFLICT` statement for one row.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Custom` when `values` does not match `columns`.
    pub fn statement(&self, values: Vec<Value>) -> Result<InsertStatement, DbErr> {
        if values.len() != self.columns.len() {
            return Err(DbErr::Custom(format!(
                "{} upsert expects {} values, got {}",
                self.table,
                self.columns.len(),
                values.len()
            )));
        }
        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(self.table))
            .columns(self.columns.iter().map(|c| Alias::new(*c)))
            .values(values.into_iter().map(SimpleExpr::from))
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .on_conflict(self.conflict_action());
        Ok(insert)
    }

    /// Run the upsert with one value per entry of `columns`.
    ///
    /// Returns the number of rows affected (zero when an insert-or-ignore skipped).
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Custom` on an arity mismatch, or the database error.
    pub async fn execute<C>(&self, conn: &C, values: Vec<Value>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let insert = self.statement(values)?;
        let stmt = conn.get_database_backend().build(&insert);
        Ok(conn.execute(stmt).await?.rows_affected())
    }
}
