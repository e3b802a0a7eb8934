use sea_orm_migration::{prelude::*, schema::*};

static IDX_WEATHER_DATA_LOCATION_NAME: &str = "idx_weather_data_location_name";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WeatherData::Table)
                    .if_not_exists()
                    .col(pk_auto(WeatherData::Id))
                    .col(string(WeatherData::LocationName))
                    .col(double(WeatherData::TempC))
                    .col(timestamp(WeatherData::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_WEATHER_DATA_LOCATION_NAME)
                    .table(WeatherData::Table)
                    .col(WeatherData::LocationName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_WEATHER_DATA_LOCATION_NAME)
                    .table(WeatherData::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(WeatherData::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum WeatherData {
    Table,
    Id,
    LocationName,
    TempC,
    LastUpdated,
}
