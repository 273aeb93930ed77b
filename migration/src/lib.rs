pub use sea_orm_migration::prelude::*;

mod m20250301_000001_staging;
mod m20250301_000002_dimensions;
mod m20250301_000003_analytics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_staging::Migration),
            Box::new(m20250301_000002_dimensions::Migration),
            Box::new(m20250301_000003_analytics::Migration),
        ]
    }
}

/// Column definition using the exact (legacy, mixed-case) column name.
///
/// The dashboard reads these tables with `SELECT *`, so declared names are part
/// of the wire format and must not be re-cased.
pub(crate) fn col(name: &'static str) -> ColumnDef {
    ColumnDef::new(Alias::new(name))
}

pub(crate) fn unique_index(name: &'static str, table: &'static str, columns: &[&'static str]) -> IndexCreateStatement {
    let mut index = Index::create();
    index.name(name).table(Alias::new(table)).unique().if_not_exists();
    for column in columns {
        index.col(Alias::new(*column));
    }
    index.to_owned()
}

pub(crate) fn plain_index(name: &'static str, table: &'static str, columns: &[&'static str]) -> IndexCreateStatement {
    let mut index = Index::create();
    index.name(name).table(Alias::new(table)).if_not_exists();
    for column in columns {
        index.col(Alias::new(*column));
    }
    index.to_owned()
}

pub(crate) async fn drop_tables(manager: &SchemaManager<'_>, tables: &[&'static str]) -> Result<(), DbErr> {
    for table in tables {
        manager
            .drop_table(Table::drop().table(Alias::new(*table)).if_exists().to_owned())
            .await?;
    }
    Ok(())
}
