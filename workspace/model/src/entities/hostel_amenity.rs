use super::{amenity, hostel};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hostel_amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hostel_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub amenity_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "hostel::Entity",
        from = "Column::HostelId",
        to = "hostel::Column::Id",
        on_delete = "Cascade"
    )]
    Hostel,
    #[sea_orm(
        belongs_to = "amenity::Entity",
        from = "Column::AmenityId",
        to = "amenity::Column::Id",
        on_delete = "Cascade"
    )]
    Amenity,
}

impl Related<hostel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hostel.def()
    }
}

impl Related<amenity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Amenity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
