use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub department_id: i32,
    #[sea_orm(unique)]
    pub department_name: String,
    pub manager_id: Option<i32>,
    pub location_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Manager,
    Location,
    Employee,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Manager => Entity::belongs_to(super::employees::Entity)
                .from(Column::ManagerId)
                .to(super::employees::Column::EmployeeId)
                .into(),
            Self::Location => Entity::belongs_to(super::locations::Entity)
                .from(Column::LocationId)
                .to(super::locations::Column::LocationId)
                .into(),
            Self::Employee => Entity::has_many(super::employees::Entity).into(),
        }
    }
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
