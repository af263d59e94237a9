use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_null(Users::Username))
                    .col(string(Users::FullName))
                    .col(string(Users::Email).unique_key())
                    .col(string_len_null(Users::Phone, 20))
                    .col(string_len_null(Users::WhatsappPhone, 20))
                    .col(string_len_null(Users::Gender, 10))
                    .col(string_len(Users::Role, 20).default("Student"))
                    .col(string_null(Users::PasswordHash))
                    .col(boolean(Users::EmailVerified).default(false))
                    .col(boolean(Users::IsIdentityVerified).default(false))
                    .col(text_null(Users::IdFrontImageUrl))
                    .col(text_null(Users::IdBackImageUrl))
                    .col(text_null(Users::PassportImageUrl))
                    .col(string_len_null(Users::IdNumber, 50))
                    .col(string_len(Users::IdentityVerificationStatus, 20).default("NOT_SUBMITTED"))
                    .col(text_null(Users::VerificationRemarks))
                    .col(string_len(Users::AccountStatus, 20).default("ACTIVE"))
                    .col(text_null(Users::AvatarUrl))
                    .col(text_null(Users::Bio))
                    .col(string_len(Users::Visibility, 50).default("PUBLIC"))
                    .col(uuid_null(Users::ManagedBy))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_managed_by")
                            .from(Users::Table, Users::ManagedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create hostels table
        manager
            .create_table(
                Table::create()
                    .table(Hostels::Table)
                    .if_not_exists()
                    .col(pk_uuid(Hostels::Id))
                    .col(uuid(Hostels::OwnerId))
                    .col(string(Hostels::Name))
                    .col(string(Hostels::Campus))
                    .col(text(Hostels::Address))
                    .col(text_null(Hostels::Description))
                    .col(string_len(Hostels::Policy, 20).default("Mixed"))
                    .col(boolean(Hostels::IsVerified).default(false))
                    .col(timestamp_with_time_zone(Hostels::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hostels_owner")
                            .from(Hostels::Table, Hostels::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create hostel_media table
        manager
            .create_table(
                Table::create()
                    .table(HostelMedia::Table)
                    .if_not_exists()
                    .col(pk_uuid(HostelMedia::Id))
                    .col(uuid(HostelMedia::HostelId))
                    .col(text(HostelMedia::Url))
                    .col(string_len(HostelMedia::MediaType, 10).default("Image"))
                    .col(boolean(HostelMedia::IsThumbnail).default(false))
                    .col(integer(HostelMedia::Position).default(0))
                    .col(timestamp_with_time_zone(HostelMedia::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hostel_media_hostel")
                            .from(HostelMedia::Table, HostelMedia::HostelId)
                            .to(Hostels::Table, Hostels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create amenities table
        manager
            .create_table(
                Table::create()
                    .table(Amenities::Table)
                    .if_not_exists()
                    .col(pk_uuid(Amenities::Id))
                    .col(string_len(Amenities::Name, 100).unique_key())
                    .col(string_len_null(Amenities::Icon, 50))
                    .to_owned(),
            )
            .await?;

        // Create hostel_amenities table (join table)
        manager
            .create_table(
                Table::create()
                    .table(HostelAmenities::Table)
                    .if_not_exists()
                    .col(uuid(HostelAmenities::HostelId))
                    .col(uuid(HostelAmenities::AmenityId))
                    .primary_key(
                        Index::create()
                            .name("pk_hostel_amenities")
                            .col(HostelAmenities::HostelId)
                            .col(HostelAmenities::AmenityId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hostel_amenities_hostel")
                            .from(HostelAmenities::Table, HostelAmenities::HostelId)
                            .to(Hostels::Table, Hostels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hostel_amenities_amenity")
                            .from(HostelAmenities::Table, HostelAmenities::AmenityId)
                            .to(Amenities::Table, Amenities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create rooms table
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(pk_uuid(Rooms::Id))
                    .col(uuid(Rooms::HostelId))
                    .col(string_len(Rooms::Label, 50))
                    .col(string_len_null(Rooms::Floor, 20))
                    .col(string_len_null(Rooms::Block, 50))
                    .col(string_len(Rooms::RoomType, 20))
                    .col(decimal_len(Rooms::Price, 10, 2))
                    .col(string_len(Rooms::BillingCycle, 20).default("Per Semester"))
                    .col(integer(Rooms::TotalSlots))
                    .col(integer(Rooms::OccupiedSlots).default(0))
                    .col(string_len(Rooms::Status, 20).default("Available"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_hostel")
                            .from(Rooms::Table, Rooms::HostelId)
                            .to(Hostels::Table, Hostels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create bookings table
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Bookings::Id))
                    .col(uuid(Bookings::StudentId))
                    .col(uuid(Bookings::RoomId))
                    .col(string_len(Bookings::Status, 20).default("Pending"))
                    .col(timestamp_with_time_zone(Bookings::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_student")
                            .from(Bookings::Table, Bookings::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_room")
                            .from(Bookings::Table, Bookings::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_uuid(Reviews::Id))
                    .col(uuid(Reviews::UserId))
                    .col(uuid(Reviews::HostelId))
                    .col(integer(Reviews::Rating))
                    .col(string_null(Reviews::Title))
                    .col(text_null(Reviews::Comment))
                    .col(text_null(Reviews::OwnerReply))
                    .col(timestamp_with_time_zone_null(Reviews::RepliedAt))
                    .col(boolean(Reviews::IsVerified).default(false))
                    .col(integer(Reviews::HelpfulCount).default(0))
                    .col(timestamp_with_time_zone(Reviews::CreatedAt))
                    .col(timestamp_with_time_zone(Reviews::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_hostel")
                            .from(Reviews::Table, Reviews::HostelId)
                            .to(Hostels::Table, Hostels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Payments::Id))
                    .col(uuid(Payments::BookingId))
                    .col(decimal_len(Payments::Amount, 10, 2))
                    .col(string_len_null(Payments::MpesaCode, 50).unique_key())
                    .col(string_len(Payments::Status, 20).default("Pending"))
                    .col(timestamp_with_time_zone(Payments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_booking")
                            .from(Payments::Table, Payments::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first so foreign keys never dangle
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HostelAmenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Amenities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HostelMedia::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hostels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    FullName,
    Email,
    Phone,
    WhatsappPhone,
    Gender,
    Role,
    PasswordHash,
    EmailVerified,
    IsIdentityVerified,
    IdFrontImageUrl,
    IdBackImageUrl,
    PassportImageUrl,
    IdNumber,
    IdentityVerificationStatus,
    VerificationRemarks,
    AccountStatus,
    AvatarUrl,
    Bio,
    Visibility,
    ManagedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Hostels {
    Table,
    Id,
    OwnerId,
    Name,
    Campus,
    Address,
    Description,
    Policy,
    IsVerified,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum HostelMedia {
    Table,
    Id,
    HostelId,
    Url,
    MediaType,
    IsThumbnail,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Amenities {
    Table,
    Id,
    Name,
    Icon,
}

#[derive(DeriveIden)]
enum HostelAmenities {
    Table,
    HostelId,
    AmenityId,
}

#[derive(DeriveIden)]
pub(crate) enum Rooms {
    Table,
    Id,
    HostelId,
    Label,
    Floor,
    Block,
    RoomType,
    Price,
    BillingCycle,
    TotalSlots,
    OccupiedSlots,
    Status,
}

#[derive(DeriveIden)]
pub(crate) enum Bookings {
    Table,
    Id,
    StudentId,
    RoomId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Reviews {
    Table,
    Id,
    UserId,
    HostelId,
    Rating,
    Title,
    Comment,
    OwnerReply,
    RepliedAt,
    IsVerified,
    HelpfulCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    BookingId,
    Amount,
    MpesaCode,
    Status,
    CreatedAt,
}
