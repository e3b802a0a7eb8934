use crate::service::weather::WeatherLookupService;

#[derive(Clone)]
pub struct AppState {
    pub lookup: WeatherLookupService,
}
