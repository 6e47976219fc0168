//! Reporter runs against files on disk, starting from provider-shaped
//! transfers.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;

use st0x_pnl::config::ReporterConfig;
use st0x_pnl::{Event, RawTransfer, reporter};

use common::weth;

const TRANSFERS_JSON: &str = r#"[
    {"chain": "ethereum", "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "decimals": 18, "rawAmount": 2000000000000000000, "unitPriceUsd": "1800", "timestamp": "2023-01-01T00:00:00Z", "kind": "swap_in"},
    {"chain": "ethereum", "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "rawAmount": 0, "unitPriceUsd": "1900", "timestamp": "2023-03-01T00:00:00Z", "kind": "receive"},
    {"chain": "ethereum", "address": "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "decimals": 18, "rawAmount": -500000000000000000, "unitPriceUsd": "3000", "timestamp": "2024-01-01T00:00:00Z", "kind": "send"}
]"#;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn events_from_transfers() -> Vec<Event> {
    let transfers: Vec<RawTransfer> = serde_json::from_str(TRANSFERS_JSON).unwrap();
    transfers
        .into_iter()
        .map(|transfer| Event::try_from(transfer).unwrap())
        .collect()
}

#[test]
fn transfers_flow_through_reporter_run() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = write_file(
        &dir,
        "events.json",
        &serde_json::to_string(&events_from_transfers()).unwrap(),
    );
    let market_path = write_file(
        &dir,
        "market.json",
        r#"[{"chain": "ethereum", "address": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "priceUsd": "2000", "balance": "1"}]"#,
    );
    let config_path = write_file(
        &dir,
        "reporter.toml",
        &format!(
            "log_level = \"debug\"\nevents = {:?}\nmarket = {:?}\n",
            events_path.display().to_string(),
            market_path.display().to_string(),
        ),
    );

    let config = ReporterConfig::load_file(&config_path).unwrap();
    let report = reporter::run(&config).unwrap();

    assert_eq!(report.tokens.len(), 1);
    let token = &report.tokens[0];
    assert_eq!(token.token, weth());
    assert_eq!(token.realized_pnl_usd, dec!(600));
    assert_eq!(token.holdings, dec!(1.5));
    assert_eq!(token.cost_basis_usd, dec!(1800));
    assert_eq!(token.unrealized_pnl_usd, dec!(300));
    assert_eq!(token.total_invested_usd, dec!(3600));
    assert_eq!(token.unmatched_disposal_amount, Decimal::ZERO);

    assert_eq!(report.tax.total.long_term_gains_usd, dec!(600));
    assert_eq!(report.tax.total.realized_event_count, 1);
}

#[test]
fn report_json_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = write_file(
        &dir,
        "events.json",
        &serde_json::to_string(&events_from_transfers()).unwrap(),
    );
    let config = ReporterConfig::load(&format!(
        "events = {:?}\n",
        events_path.display().to_string()
    ))
    .unwrap();

    let report = reporter::run(&config).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let token = &json["tokens"][0];
    assert_eq!(token["token"]["address"], "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    assert!(token.get("realizedPnlUsd").is_some());
    assert!(token.get("unmatchedDisposalAmount").is_some());
    assert!(json["summary"].get("pnlByChain").is_some());
    assert!(json["tax"].get("byChain").is_some());
    assert_eq!(json["tax"]["byToken"][0]["realizedEventCount"], 1);
}

#[test]
fn unreadable_events_file_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReporterConfig::load(&format!(
        "events = {:?}\n",
        dir.path().join("missing.json").display().to_string()
    ))
    .unwrap();

    let error = reporter::run(&config).unwrap_err();

    assert!(
        error.downcast_ref::<reporter::InputError>().is_some(),
        "Expected InputError, got {error:?}"
    );
}
