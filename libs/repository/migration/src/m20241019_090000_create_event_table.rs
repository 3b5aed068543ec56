use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Title).string().not_null())
                    .col(
                        ColumnDef::new(Event::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::Overview).text().not_null())
                    .col(ColumnDef::new(Event::Image).string().not_null())
                    .col(ColumnDef::new(Event::Venue).string().not_null())
                    .col(ColumnDef::new(Event::Location).string().not_null())
                    .col(ColumnDef::new(Event::Date).string().not_null())
                    .col(ColumnDef::new(Event::Time).string().not_null())
                    .col(ColumnDef::new(Event::Mode).string().not_null())
                    .col(ColumnDef::new(Event::Audience).string().not_null())
                    .col(ColumnDef::new(Event::Agenda).json_binary().not_null())
                    .col(ColumnDef::new(Event::Organizer).string().not_null())
                    .col(ColumnDef::new(Event::Tags).json_binary().not_null())
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-event-created_at")
                    .table(Event::Table)
                    .col(Event::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Event {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Overview,
    Image,
    Venue,
    Location,
    Date,
    Time,
    Mode,
    Audience,
    Agenda,
    Organizer,
    Tags,
    CreatedAt,
    UpdatedAt,
}
