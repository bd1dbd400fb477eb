use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub employee_id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: Option<String>,
    pub hire_date: NaiveDate,
    #[sea_orm(indexed)]
    pub job_id: String,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    #[sea_orm(indexed)]
    pub manager_id: Option<i32>,
    #[sea_orm(indexed)]
    pub department_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Job,
    Department,
    Manager,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Job => Entity::belongs_to(super::jobs::Entity)
                .from(Column::JobId)
                .to(super::jobs::Column::JobId)
                .into(),
            Self::Department => Entity::belongs_to(super::departments::Entity)
                .from(Column::DepartmentId)
                .to(super::departments::Column::DepartmentId)
                .into(),
            Self::Manager => Entity::belongs_to(Entity)
                .from(Column::ManagerId)
                .to(Column::EmployeeId)
                .into(),
        }
    }
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
