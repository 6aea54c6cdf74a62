//! Integration tests for end-to-end quote computation.

mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use solar_quote::quote::RateSource;
use solar_quote::runner::read_stored_quotes;
use solar_quote::{
    compute_quote, Coordinates, Overrides, PresentValueMethod, QuoteConfig, QuoteError, QuoteInputs, QuoteRunner,
};

#[test]
fn kansas_city_deposit_is_in_expected_range() {
    for config in common::both_configs() {
        let result = common::engine(config).compute_quote(&common::kansas_city_inputs()).unwrap();
        assert_eq!(result.debug.rates.region.as_deref(), Some("Missouri"));
        assert!(
            result.protocol_deposit_usd > 30_000.0 && result.protocol_deposit_usd < 40_000.0,
            "{} deposit {} outside 30k-40k",
            config.method,
            result.protocol_deposit_usd
        );
        assert!(result.net_weekly_credit > 0.0);
        assert!(result.efficiency_score > 0.0);
    }
}

#[test]
fn flows_use_their_own_present_value_method() {
    let project = common::engine(QuoteConfig::project())
        .compute_quote(&common::kansas_city_inputs())
        .unwrap();
    let non_account = common::engine(QuoteConfig::non_account())
        .compute_quote(&common::kansas_city_inputs())
        .unwrap();

    assert_eq!(project.method(), PresentValueMethod::MonthlyNpv);
    assert_eq!(non_account.method(), PresentValueMethod::GrowingAnnuity);
    // Carbon accounting does not depend on the flow
    assert_eq!(project.net_weekly_credit, non_account.net_weekly_credit);
    assert_eq!(project.weekly_impact_assets_wad, non_account.weekly_impact_assets_wad);
    assert_relative_eq!(project.protocol_deposit_usd, non_account.protocol_deposit_usd, max_relative = 0.06);
}

#[test]
fn escalator_override_raises_deposit() {
    let base = compute_quote(&common::kansas_city_inputs(), QuoteConfig::project()).unwrap();
    let overridden = compute_quote(
        &common::kansas_city_inputs().with_overrides(Overrides {
            escalator_rate: Some(0.05),
            ..Default::default()
        }),
        QuoteConfig::project(),
    )
    .unwrap();

    assert_eq!(overridden.escalator_rate, 0.05);
    assert_eq!(overridden.debug.rates.escalator_source, RateSource::Override);
    assert!(overridden.protocol_deposit_usd > base.protocol_deposit_usd);
}

#[test]
fn oversized_system_nets_to_zero() {
    let inputs = QuoteInputs::new(
        0.3798269230769231,
        100_000.0,
        0.1126,
        Coordinates::new(39.0707091494141, -94.35609788750925),
    )
    .with_carbon_offsets(0.6);

    for config in common::both_configs() {
        let result = common::engine(config).compute_quote(&inputs).unwrap();
        assert_eq!(result.net_weekly_credit, 0.0);
        assert_eq!(result.net_credit_per_mwh, 0.0);
        assert_eq!(result.weekly_impact_assets_wad, "0");
        assert_eq!(result.efficiency_score, 0.0);
        assert!(result.weekly_debt > 1000.0 * result.weekly_credits);
    }
}

#[test]
fn net_credit_is_never_negative() {
    let engine = common::engine(QuoteConfig::project());
    for kw in [1.0, 10.0, 18.96, 50.0, 500.0, 5_000.0] {
        for offsets in [0.0, 0.3, 0.6, 1.2] {
            let inputs = QuoteInputs::new(0.38, kw, 0.11, Coordinates::new(39.07, -94.36)).with_carbon_offsets(offsets);
            let result = engine.compute_quote(&inputs).unwrap();
            assert!(result.net_weekly_credit >= 0.0, "kw {} offsets {}", kw, offsets);
            assert!(result.net_credit_per_mwh >= 0.0);
        }
    }
}

#[test]
fn fixed_point_amounts_match_rounded_floats() {
    let result = compute_quote(&common::kansas_city_inputs(), QuoteConfig::project()).unwrap();

    let usd6: i128 = result.protocol_deposit_usd6.parse().unwrap();
    assert_eq!(usd6, (result.protocol_deposit_usd * 1e6).round() as i128);
    assert_abs_diff_eq!(result.decoded_deposit_usd().unwrap(), result.protocol_deposit_usd, epsilon = 1e-6);

    let wad: i128 = result.weekly_impact_assets_wad.parse().unwrap();
    assert_eq!(wad, (result.net_weekly_credit * 1e18).round() as i128);
    assert_relative_eq!(result.decoded_weekly_impact().unwrap(), result.net_weekly_credit, max_relative = 1e-12);
}

#[test]
fn raw_inputs_match_float_inputs() {
    let parsed = common::kansas_city_raw().parse().unwrap();
    assert_eq!(parsed, common::kansas_city_inputs());

    let engine = common::engine(QuoteConfig::non_account());
    let from_raw = engine.compute_quote(&parsed).unwrap();
    let from_floats = engine.compute_quote(&common::kansas_city_inputs()).unwrap();
    assert_eq!(from_raw, from_floats);
}

#[test]
fn repeated_quotes_are_identical() {
    let engine = common::engine(QuoteConfig::project());
    let first = engine.compute_quote(&common::kansas_city_inputs()).unwrap();
    let second = engine.compute_quote(&common::kansas_city_inputs()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn location_outside_every_region_uses_default_escalator() {
    let inputs = QuoteInputs::new(0.5, 10.0, 0.2, Coordinates::new(33.8938, 35.5018)).with_carbon_offsets(0.7);
    let result = compute_quote(&inputs, QuoteConfig::non_account()).unwrap();
    assert_eq!(result.escalator_rate, 0.0331);
    assert!(result.debug.rates.region_fallback);
}

#[test]
fn invalid_inputs_are_client_errors() {
    let mut raw = common::kansas_city_raw();
    raw.electricity_price_per_kwh = "-0.1".to_string();
    let err = raw.parse().unwrap_err();
    assert!(matches!(err, QuoteError::InvalidInput { field: "electricity_price_per_kwh", .. }));
    assert!(err.is_client_error());
}

#[test]
fn trace_serializes_to_json() {
    let result = compute_quote(&common::kansas_city_inputs(), QuoteConfig::project()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["debug"]["protocol_deposit"]["method"], "monthly_npv");
    assert_eq!(json["debug"]["rates"]["region"], "Missouri");
    assert_eq!(json["protocol_deposit_usd6"], result.protocol_deposit_usd6.as_str());
}

#[test]
fn batch_requote_matches_single_quotes() {
    let csv = "\
id,weekly_consumption_mwh,system_size_kw,electricity_price_per_kwh,latitude,longitude,carbon_offsets_per_mwh,protocol_deposit_usd6,efficiency_score
kc,0.3798269230769231,18.96,0.1126,39.0707091494141,-94.35609788750925,0.6,,
";
    let stored = read_stored_quotes(csv.as_bytes()).unwrap();
    let runner = QuoteRunner::new(common::engine(QuoteConfig::project()));
    let outcomes = runner.run_batch(&stored, &Overrides::default());

    let single = compute_quote(&common::kansas_city_inputs(), QuoteConfig::project()).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].new_deposit_usd6.as_deref(), Some(single.protocol_deposit_usd6.as_str()));
    assert_eq!(outcomes[0].new_efficiency, Some(single.efficiency_score));
}
