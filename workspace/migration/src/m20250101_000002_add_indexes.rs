use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_tables::{Bookings, HostelMedia, Hostels, Reviews, Rooms, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One review per user and hostel
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_user_hostel")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .col(Reviews::HostelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hostel_media_hostel")
                    .table(HostelMedia::Table)
                    .col(HostelMedia::HostelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_hostel")
                    .table(Rooms::Table)
                    .col(Rooms::HostelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hostels_owner")
                    .table(Hostels::Table)
                    .col(Hostels::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_room")
                    .table(Bookings::Table)
                    .col(Bookings::RoomId)
                    .to_owned(),
            )
            .await?;

        // At most one thumbnail per hostel; the builder has no partial indexes
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_hostel_media_one_thumbnail \
                 ON hostel_media (hostel_id) WHERE is_thumbnail",
            )
            .await?;

        // Admin review queue
        manager
            .create_index(
                Index::create()
                    .name("idx_users_verification_status")
                    .table(Users::Table)
                    .col(Users::IdentityVerificationStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_hostel_media_one_thumbnail")
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_users_verification_status")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_bookings_room")
                    .table(Bookings::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_hostels_owner")
                    .table(Hostels::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_rooms_hostel")
                    .table(Rooms::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_hostel_media_hostel")
                    .table(HostelMedia::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reviews_user_hostel")
                    .table(Reviews::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
