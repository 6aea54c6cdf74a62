//! Shared fixtures for integration tests.

use solar_quote::{Coordinates, ProtocolAssumptions, QuoteConfig, QuoteEngine, QuoteInputs, RawQuoteInputs};

/// Kansas City, Missouri residential quote (0.38 MWh/week, 18.96 kW, $0.1126/kWh).
pub fn kansas_city_inputs() -> QuoteInputs {
    QuoteInputs::new(
        0.3798269230769231,
        18.96,
        0.1126,
        Coordinates::new(39.0707091494141, -94.35609788750925),
    )
    .with_carbon_offsets(0.6)
}

/// The Kansas City quote as decimal strings, the way stored quotes hold it.
pub fn kansas_city_raw() -> RawQuoteInputs {
    RawQuoteInputs {
        weekly_consumption_mwh: "0.3798269230769231".to_string(),
        system_size_kw: "18.96".to_string(),
        electricity_price_per_kwh: "0.1126".to_string(),
        latitude: "39.0707091494141".to_string(),
        longitude: "-94.35609788750925".to_string(),
        carbon_offsets_per_mwh: Some("0.6".to_string()),
        ..Default::default()
    }
}

/// Engine with default assumptions and built-in tables.
pub fn engine(config: QuoteConfig) -> QuoteEngine {
    QuoteEngine::new(ProtocolAssumptions::default(), config)
}

/// Both quote flows.
pub fn both_configs() -> [QuoteConfig; 2] {
    [QuoteConfig::project(), QuoteConfig::non_account()]
}
