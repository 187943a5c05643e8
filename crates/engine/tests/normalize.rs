use std::str::FromStr;

use api_types::{disbursement, payment, receiver};
use engine::{
    DisbursementStatus, Engine, EngineError, EntityKind, PaymentStatus, RawRecord, Record, Status,
    warnings::InconsistencyWarning,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn address(fill: char) -> String {
    format!("G{}", fill.to_string().repeat(55))
}

fn raw_disbursement(value: Value) -> disbursement::Disbursement {
    serde_json::from_value(value).unwrap()
}

fn raw_payment(value: Value) -> payment::Payment {
    serde_json::from_value(value).unwrap()
}

fn raw_receiver(value: Value) -> receiver::Receiver {
    serde_json::from_value(value).unwrap()
}

fn disbursement_json(sent: i64, failed: i64, canceled: i64, remaining: i64) -> Value {
    json!({
        "id": "d-1",
        "name": "March payroll",
        "created_at": "2024-03-01T09:00:00.000Z",
        "created_by": {"first_name": "Ada", "last_name": "Lovelace"},
        "started_by": {"first_name": "Grace"},
        "total_payments": sent + failed + canceled + remaining,
        "total_payments_sent": sent,
        "total_payments_failed": failed,
        "total_payments_canceled": canceled,
        "total_payments_remaining": remaining,
        "total_amount": "1000.00",
        "amount_disbursed": "250.50",
        "average_amount": "100.00",
        "status": "PROCESSING",
        "registration_contact_type": "PHONE_NUMBER",
        "asset": {"id": "a-1", "code": "USDC"},
        "wallet": {"id": "w-1", "name": "Demo Wallet"},
        "verification_field": "DATE_OF_BIRTH",
        "file_name": "march.csv",
        "status_history": [
            {"status": "DRAFT", "timestamp": "2024-03-01T09:00:00Z", "user_id": "u-1"},
            {"status": "PROCESSING", "timestamp": "2024-03-02T09:00:00Z", "user_id": "u-2"},
            {"status": "PENDING", "timestamp": "2024-03-01T12:00:00Z", "user_id": "u-2"},
            {"status": "PENDING"}
        ]
    })
}

#[test]
fn disbursement_stats_round_trip() {
    let engine = Engine::default();
    for (sent, failed, canceled, remaining) in [(0, 0, 0, 0), (3, 1, 2, 4), (10, 0, 0, 0)] {
        let raw = raw_disbursement(disbursement_json(sent, failed, canceled, remaining));
        let d = engine.normalize_disbursement(&raw).unwrap();
        let stats = &d.stats;
        assert_eq!(stats.payments_successful_count, sent as u64);
        assert_eq!(stats.payments_failed_count, failed as u64);
        assert_eq!(stats.payments_canceled_count, canceled as u64);
        assert_eq!(stats.payments_remaining_count, remaining as u64);
        assert_eq!(stats.payments_total_count, stats.sum_of_parts());
        assert!(stats.consistency_warnings().is_empty());
    }
}

#[test]
fn disbursement_maps_every_field() {
    let raw = raw_disbursement(disbursement_json(1, 1, 1, 1));
    let d = Engine::default().normalize_disbursement(&raw).unwrap();

    assert_eq!(d.id, "d-1");
    assert_eq!(d.name, "March payroll");
    assert_eq!(d.created_by.as_deref(), Some("Ada Lovelace"));
    assert_eq!(d.started_by, None);
    assert_eq!(d.status, Some(Status::Known(DisbursementStatus::Processing)));
    assert_eq!(d.asset.code, "USDC");
    assert_eq!(d.wallet.name, "Demo Wallet");
    assert_eq!(d.stats.total_amount, dec("1000"));
    assert_eq!(d.stats.disbursed_amount, dec("250.5"));
    assert_eq!(d.stats.average_payment_amount, dec("100"));
    assert_eq!(d.file_name.as_deref(), Some("march.csv"));
    assert_eq!(d.receiver_registration_message_template, None);
    assert_eq!(
        d.created_at.unwrap().to_rfc3339(),
        "2024-03-01T09:00:00+00:00"
    );

    let statuses: Vec<_> = d.status_history.iter().map(|c| c.status.known()).collect();
    assert_eq!(
        statuses,
        vec![
            Some(DisbursementStatus::Processing),
            Some(DisbursementStatus::Pending),
            Some(DisbursementStatus::Draft),
        ]
    );
    assert_eq!(d.status_history[2].actor.as_deref(), Some("u-1"));
    assert_eq!(d.status_history[2].message, None);
}

#[test]
fn disbursement_average_is_derived_when_missing() {
    let mut value = disbursement_json(1, 1, 1, 0);
    value["average_amount"] = Value::Null;
    value["total_amount"] = json!("100");
    let d = Engine::default()
        .normalize_disbursement(&raw_disbursement(value))
        .unwrap();
    assert_eq!(d.stats.average_payment_amount.round_dp(7), dec("33.3333333"));
}

#[test]
fn inconsistent_disbursement_still_normalizes() {
    let mut value = disbursement_json(1, 1, 1, 1);
    value["total_payments"] = json!(9);
    value["amount_disbursed"] = json!(2000);
    value["status"] = json!("ARCHIVED");
    let d = Engine::default()
        .normalize_disbursement(&raw_disbursement(value))
        .unwrap();
    assert_eq!(d.stats.payments_total_count, 9);
    assert_eq!(d.stats.disbursed_amount, dec("2000"));
    assert_eq!(d.status, Some(Status::Unrecognized("ARCHIVED".to_string())));
    assert_eq!(d.status.unwrap().known(), None);
}

#[test]
fn disbursement_missing_wallet_is_fatal() {
    let mut value = disbursement_json(1, 0, 0, 0);
    value["wallet"] = json!({"id": "w-1"});
    let err = Engine::default()
        .normalize_disbursement(&raw_disbursement(value))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingRequiredField {
            field: "wallet.name".to_string()
        }
    );
}

#[test]
fn disbursement_negative_count_reads_as_zero() {
    let mut value = disbursement_json(1, 0, 0, 0);
    value["total_payments_failed"] = json!(-2);
    let engine = Engine::default();
    let raw = raw_disbursement(value);
    let d = engine.normalize_disbursement(&raw).unwrap();
    assert_eq!(d.stats.payments_failed_count, 0);

    let report = engine.validate(&RawRecord::Disbursement(raw));
    assert!(report.is_valid());
    assert!(report.warnings.contains(&InconsistencyWarning::InvalidCount {
        field: "total_payments_failed".to_string(),
        value: -2,
    }));
}

#[test]
fn unreadable_total_amount_reads_as_zero() {
    let mut value = disbursement_json(1, 1, 0, 0);
    value["total_amount"] = json!("N/A");
    value["average_amount"] = json!("");
    let d = Engine::default()
        .normalize_disbursement(&raw_disbursement(value))
        .unwrap();
    assert_eq!(d.stats.total_amount, Decimal::ZERO);
    assert_eq!(d.stats.average_payment_amount, Decimal::ZERO);
    assert_eq!(d.stats.disbursed_amount, dec("250.5"));
}

fn payment_json(amount: Value) -> Value {
    json!({
        "id": "p-1",
        "created_at": "2024-03-02T10:00:00Z",
        "amount": amount,
        "asset": {"code": "USDC"},
        "disbursement": {"id": "d-1", "name": "March payroll"},
        "receiver_wallet": {"id": "rw-1", "receiver": {"id": "r-1"}},
        "stellar_transaction_id": "tx-abc",
        "stellar_address": address('A'),
        "external_payment_id": "ext-1",
        "status": "COMPLETED",
        "status_history": [
            {"status": "PENDING", "timestamp": "2024-03-02T10:00:00Z"},
            {"status": "COMPLETED", "timestamp": "2024-03-02T10:05:00Z", "status_message": "sent"}
        ]
    })
}

#[test]
fn payment_maps_every_field() {
    let p = Engine::default()
        .normalize_payment(&raw_payment(payment_json(json!("12.3400000"))))
        .unwrap();
    assert_eq!(p.amount, dec("12.34"));
    assert_eq!(p.asset_code, "USDC");
    assert_eq!(p.disbursement_name, "March payroll");
    assert!(!p.is_direct());
    assert_eq!(p.receiver_id.as_deref(), Some("r-1"));
    assert_eq!(p.receiver_wallet_id.as_deref(), Some("rw-1"));
    assert_eq!(p.transaction_id.as_deref(), Some("tx-abc"));
    assert_eq!(p.sender_address.unwrap().as_str(), address('A'));
    assert_eq!(p.circle_transfer_request_id, None);
    assert_eq!(p.status, Some(Status::Known(PaymentStatus::Completed)));
    assert_eq!(p.status_history[0].message.as_deref(), Some("sent"));
    assert_eq!(
        p.status_history[1].message.as_deref(),
        Some("Status updated")
    );
}

#[test]
fn non_positive_payment_amounts_are_invalid() {
    let engine = Engine::default();
    for amount in [json!("0"), json!("-1"), json!(0), json!(-0.5), json!("-0.0000001")] {
        let err = engine
            .normalize_payment(&raw_payment(payment_json(amount.clone())))
            .unwrap_err();
        assert!(
            matches!(err, EngineError::InvalidFieldValue { ref field, .. } if field == "amount"),
            "{amount} gave {err:?}"
        );
    }
}

#[test]
fn absent_payment_amount_is_missing() {
    let mut value = payment_json(Value::Null);
    value.as_object_mut().unwrap().remove("amount");
    let err = Engine::default()
        .normalize_payment(&raw_payment(value))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingRequiredField {
            field: "amount".to_string()
        }
    );
}

#[test]
fn direct_payment_defaults() {
    let mut value = payment_json(json!("5"));
    value["disbursement"] = Value::Null;
    let p = Engine::default().normalize_payment(&raw_payment(value.clone())).unwrap();
    assert_eq!(p.disbursement_name, "Direct Payment");
    assert_eq!(p.disbursement_id, "");
    assert!(p.is_direct());

    let engine = Engine::builder().direct_payment_label("Ad hoc").build();
    assert_eq!(
        engine
            .normalize_payment(&raw_payment(value))
            .unwrap()
            .disbursement_name,
        "Ad hoc"
    );
}

#[test]
fn unknown_payment_status_keeps_its_history() {
    let mut value = payment_json(json!("5"));
    value["status"] = json!("SUCCESS");
    value["status_history"] = json!([
        {"status": "PENDING", "timestamp": "2024-03-02T10:00:00Z"},
        {"status": "SUCCESS", "timestamp": "2024-03-02T10:05:00Z"}
    ]);
    let p = Engine::default().normalize_payment(&raw_payment(value)).unwrap();
    assert_eq!(p.status, Some(Status::Unrecognized("SUCCESS".to_string())));
    assert_eq!(p.status_history.len(), 2);
    assert_eq!(p.status_history[0].status.as_str(), "SUCCESS");
    assert_eq!(
        p.status_history[1].status,
        Status::Known(PaymentStatus::Pending)
    );
}

#[test]
fn malformed_sender_address_is_dropped() {
    let mut value = payment_json(json!("5"));
    let bad = format!("G{}0", "A".repeat(54));
    value["stellar_address"] = json!(bad);
    let engine = Engine::default();
    let raw = raw_payment(value);
    let p = engine.normalize_payment(&raw).unwrap();
    assert_eq!(p.sender_address, None);

    let report = engine.validate(&RawRecord::Payment(raw));
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        InconsistencyWarning::MalformedAddress { field, value, .. }
            if field == "stellar_address" && *value == bad
    )));
}

fn receiver_json() -> Value {
    json!({
        "id": "r-1",
        "phone_number": "+15555550100",
        "email": null,
        "wallets": [
            {"id": "rw-1", "stellar_address": address('B'), "wallet": {"name": "Vibrant"}, "status": "REGISTERED", "created_at": "2024-01-01T00:00:00Z"},
            {"id": "rw-2", "wallet": {"name": "Other"}, "status": "READY"}
        ],
        "total_payments": 3,
        "successful_payments": 2,
        "received_amounts": [
            {"received_amount": "10.5", "asset_code": "USDC", "asset_issuer": address('C')},
            {"received_amount": "0", "asset_code": "EURC"},
            {"received_amount": "-3", "asset_code": "XLM"},
            {"received_amount": "7", "asset_code": "XLM", "asset_issuer": ""}
        ]
    })
}

#[test]
fn receiver_uses_the_requested_wallet() {
    let r = Engine::default()
        .normalize_receiver(&raw_receiver(receiver_json()), Some("rw-1"))
        .unwrap();
    let wallet = r.wallet.as_ref().unwrap();
    assert_eq!(wallet.id, "rw-1");
    assert_eq!(wallet.provider_name.as_deref(), Some("Vibrant"));
    assert_eq!(r.status.as_deref(), Some("REGISTERED"));
    assert_eq!(r.total_payments_count, 3);
    assert_eq!(r.successful_payments_count, 2);
    assert!(r.has_contact());

    let amounts: Vec<_> = r
        .received_amounts
        .iter()
        .map(|a| (a.asset_code.as_str(), a.amount))
        .collect();
    assert_eq!(amounts, vec![("USDC", dec("10.5")), ("XLM", dec("7"))]);
    assert!(r.received_amounts[1].asset_issuer.is_none());
}

#[test]
fn receiver_with_unknown_wallet_has_empty_wallet_fields() {
    let r = Engine::default()
        .normalize_receiver(&raw_receiver(receiver_json()), Some("rw-404"))
        .unwrap();
    assert!(r.wallet.is_none());
    assert!(r.status.is_none());
}

#[test]
fn receiver_without_id_is_fatal() {
    let mut value = receiver_json();
    value["id"] = json!("");
    let err = Engine::default()
        .normalize_receiver(&raw_receiver(value), None)
        .unwrap_err();
    assert_eq!(err.field(), Some("id"));
}

#[test]
fn batch_collects_failures_without_stopping() {
    let mut bad_payment = payment_json(json!("-4"));
    bad_payment["id"] = json!("p-bad");
    let records = vec![
        RawRecord::Disbursement(raw_disbursement(disbursement_json(1, 0, 0, 0))),
        RawRecord::Payment(raw_payment(bad_payment)),
        RawRecord::Receiver {
            receiver: raw_receiver(receiver_json()),
            wallet_id: Some("rw-2".to_string()),
        },
        RawRecord::Disbursement(raw_disbursement(json!({"name": "no id"}))),
    ];

    let outcome = Engine::default().normalize_batch(&records);
    assert!(!outcome.is_complete());
    let indexes: Vec<_> = outcome.records.iter().map(|item| item.index).collect();
    assert_eq!(indexes, vec![0, 2]);
    assert!(matches!(outcome.records[1].record, Record::Receiver(_)));

    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].kind, EntityKind::Payment);
    assert_eq!(outcome.failures[0].record_id.as_deref(), Some("p-bad"));
    assert_eq!(outcome.failures[1].record_id, None);
    assert_eq!(outcome.failures[1].error.field(), Some("id"));
}

#[test]
fn normalization_is_idempotent_and_thread_safe() {
    let engine = Engine::default();
    let raw = raw_disbursement(disbursement_json(2, 2, 2, 2));
    let expected = engine.normalize_disbursement(&raw).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.normalize_disbursement(&raw)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for result in results {
        assert_eq!(result.unwrap(), expected);
    }
}

#[test]
fn validate_matches_normalize() {
    let engine = Engine::default();
    let raw = RawRecord::Payment(raw_payment(json!({"id": "p-1", "amount": "3"})));
    let report = engine.validate(&raw);
    assert!(!report.is_valid());
    assert_eq!(
        engine.normalize(&raw).unwrap_err(),
        report.first_error().cloned().unwrap()
    );
}
