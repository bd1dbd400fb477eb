use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveIden)]
enum Countries {
    Table,
    CountryId,
    CountryName,
    RegionName,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    LocationId,
    StreetAddress,
    PostalCode,
    City,
    StateProvince,
    CountryId,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    JobId,
    JobTitle,
    MinSalary,
    MaxSalary,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    DepartmentId,
    DepartmentName,
    ManagerId,
    LocationId,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    EmployeeId,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    HireDate,
    JobId,
    Salary,
    CommissionPct,
    ManagerId,
    DepartmentId,
}

const FK_DEPARTMENT_MANAGER: &str = "fk_departments_manager";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot add a constraint to an existing table, but it also does
        // not require the referenced table to exist yet.
        let inline_manager_fk = manager.get_database_backend() == DatabaseBackend::Sqlite;

        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Countries::CountryId)
                            .char_len(2)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Countries::CountryName).string_len(40).not_null())
                    .col(ColumnDef::new(Countries::RegionName).string_len(25))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::LocationId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Locations::StreetAddress).string_len(40))
                    .col(ColumnDef::new(Locations::PostalCode).string_len(12))
                    .col(ColumnDef::new(Locations::City).string_len(30).not_null())
                    .col(ColumnDef::new(Locations::StateProvince).string_len(25))
                    .col(ColumnDef::new(Locations::CountryId).char_len(2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_locations_country")
                            .from(Locations::Table, Locations::CountryId)
                            .to(Countries::Table, Countries::CountryId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jobs::JobId)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Jobs::JobTitle).string_len(35).not_null())
                    .col(
                        ColumnDef::new(Jobs::MinSalary)
                            .double()
                            .check(Expr::col(Jobs::MinSalary).between(0, 999_999)),
                    )
                    .col(
                        ColumnDef::new(Jobs::MaxSalary)
                            .double()
                            .check(Expr::col(Jobs::MaxSalary).between(0, 999_999)),
                    )
                    .check(Expr::col(Jobs::MinSalary).lte(Expr::col(Jobs::MaxSalary)))
                    .to_owned(),
            )
            .await?;

        let mut departments = Table::create();
        departments
            .table(Departments::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Departments::DepartmentId)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(Departments::DepartmentName)
                    .string_len(30)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Departments::ManagerId).integer())
            .col(ColumnDef::new(Departments::LocationId).integer())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_departments_location")
                    .from(Departments::Table, Departments::LocationId)
                    .to(Locations::Table, Locations::LocationId),
            );
        if inline_manager_fk {
            departments.foreign_key(&mut department_manager_fk());
        }
        manager.create_table(departments.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::EmployeeId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::FirstName).string_len(20).not_null())
                    .col(ColumnDef::new(Employees::LastName).string_len(25).not_null())
                    .col(
                        ColumnDef::new(Employees::Email)
                            .string_len(25)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::PhoneNumber).string_len(20))
                    .col(
                        ColumnDef::new(Employees::HireDate)
                            .date()
                            .not_null()
                            .default(Expr::current_date()),
                    )
                    .col(ColumnDef::new(Employees::JobId).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Employees::Salary)
                            .double()
                            .check(Expr::col(Employees::Salary).between(0.0, 999_999.99)),
                    )
                    .col(
                        ColumnDef::new(Employees::CommissionPct)
                            .double()
                            .check(Expr::col(Employees::CommissionPct).between(0.0, 0.99)),
                    )
                    .col(ColumnDef::new(Employees::ManagerId).integer())
                    .col(ColumnDef::new(Employees::DepartmentId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_job")
                            .from(Employees::Table, Employees::JobId)
                            .to(Jobs::Table, Jobs::JobId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_manager")
                            .from(Employees::Table, Employees::ManagerId)
                            .to(Employees::Table, Employees::EmployeeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::DepartmentId),
                    )
                    .to_owned(),
            )
            .await?;

        if !inline_manager_fk {
            manager
                .create_foreign_key(department_manager_fk().to_owned())
                .await?;
        }

        for (name, column) in [
            ("idx_employees_job", Employees::JobId),
            ("idx_employees_manager", Employees::ManagerId),
            ("idx_employees_department", Employees::DepartmentId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Employees::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Sqlite {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .name(FK_DEPARTMENT_MANAGER)
                        .table(Departments::Table)
                        .to_owned(),
                )
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Countries::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn department_manager_fk() -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(FK_DEPARTMENT_MANAGER)
        .from(Departments::Table, Departments::ManagerId)
        .to(Employees::Table, Employees::EmployeeId)
        .to_owned()
}
