use sea_orm::entity::prelude::*;

/// Entry in the global amenity catalogue (Wi-Fi, laundry, ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "amenities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hostel_amenity::Entity")]
    HostelAmenity,
}

impl Related<super::hostel::Entity> for Entity {
    fn to() -> RelationDef {
        super::hostel_amenity::Relation::Hostel.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::hostel_amenity::Relation::Amenity.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
