use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, ExprTrait, Func},
    ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

pub struct WeatherRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WeatherRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a fetched reading. History is append-only: every successful
    /// fetch inserts a new row, nothing is updated in place.
    pub async fn append(
        &self,
        location_name: &str,
        temp_c: f64,
        captured_at: NaiveDateTime,
    ) -> Result<entity::weather_data::Model, DbErr> {
        let reading = entity::weather_data::ActiveModel {
            location_name: ActiveValue::Set(location_name.to_string()),
            temp_c: ActiveValue::Set(temp_c),
            last_updated: ActiveValue::Set(captured_at),
            ..Default::default()
        };

        reading.insert(self.db).await
    }

    /// Most recent recorded reading for a place, matched case-insensitively
    /// against the stored display name.
    pub async fn find_latest_by_name(
        &self,
        location_name: &str,
    ) -> Result<Option<entity::weather_data::Model>, DbErr> {
        entity::prelude::WeatherData::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(
                    entity::weather_data::Column::LocationName,
                )))
                .eq(location_name.to_lowercase()),
            )
            .order_by_desc(entity::weather_data::Column::LastUpdated)
            .one(self.db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use stratus_test_utils::prelude::*;

    use super::*;

    mod append {
        use super::*;

        /// Expect Ok with the inserted row when recording a reading
        #[tokio::test]
        async fn inserts_a_new_row() -> Result<(), TestError> {
            let test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let repo = WeatherRepository::new(&test.db);

            let captured_at = Utc::now().naive_utc();
            let model = repo.append("Istanbul", 20.0, captured_at).await?;

            assert!(model.id >= 1);
            assert_eq!(model.location_name, "Istanbul");
            assert_eq!(model.temp_c, 20.0);

            Ok(())
        }

        /// Expect repeated appends for the same place to accumulate rows
        /// rather than overwrite
        #[tokio::test]
        async fn keeps_history_for_the_same_place() -> Result<(), TestError> {
            let test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let repo = WeatherRepository::new(&test.db);

            let now = Utc::now().naive_utc();
            let first = repo.append("Istanbul", 18.0, now).await?;
            let second = repo
                .append("Istanbul", 21.0, now + Duration::minutes(30))
                .await?;

            assert_ne!(first.id, second.id);

            Ok(())
        }
    }

    mod find_latest_by_name {
        use super::*;

        /// Expect the newest reading regardless of the letter case used in
        /// the query
        #[tokio::test]
        async fn matches_case_insensitively_and_returns_newest() -> Result<(), TestError> {
            let test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let repo = WeatherRepository::new(&test.db);

            let now = Utc::now().naive_utc();
            repo.append("Istanbul", 18.0, now - Duration::hours(2)).await?;
            repo.append("Istanbul", 21.5, now).await?;

            let found = repo.find_latest_by_name("ISTANBUL").await?;

            let found = found.expect("expected a persisted reading");
            assert_eq!(found.location_name, "Istanbul");
            assert_eq!(found.temp_c, 21.5);

            Ok(())
        }

        /// Expect None for a place that was never recorded
        #[tokio::test]
        async fn returns_none_for_unknown_place() -> Result<(), TestError> {
            let test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let repo = WeatherRepository::new(&test.db);

            let found = repo.find_latest_by_name("Ankara").await?;

            assert!(found.is_none());

            Ok(())
        }
    }
}
