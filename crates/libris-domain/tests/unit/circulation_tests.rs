//! Loan state and loan codes

use chrono::{NaiveDate, Utc};
use libris_domain::Circulation;
use libris_domain::constants::CIRCULATION_CODE_PREFIX;
use libris_domain::value_objects::SequenceCode;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn loan(returned_on: Option<NaiveDate>) -> Circulation {
    Circulation {
        id: "loan-1".to_string(),
        code: "SKL001".to_string(),
        member_id: "member-1".to_string(),
        book_id: "book-1".to_string(),
        borrowed_on: day(1),
        due_on: day(8),
        returned_on,
        fine: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_open_loan_is_overdue_only_after_due_day() {
    let open = loan(None);
    assert!(open.is_open());
    assert!(!open.is_overdue_on(day(8)));
    assert!(open.is_overdue_on(day(9)));
}

#[test]
fn test_returned_loan_is_never_overdue() {
    let closed = loan(Some(day(12)));
    assert!(!closed.is_open());
    assert!(!closed.is_overdue_on(day(20)));
}

#[test]
fn test_loan_dates_serialize_as_calendar_days() {
    let json = serde_json::to_value(loan(None)).unwrap();
    assert_eq!(json["borrowed_on"], "2025-03-01");
    assert_eq!(json["returned_on"], serde_json::Value::Null);
}

#[test]
fn test_loan_codes_carry_their_own_prefix() {
    let first = SequenceCode::next_after(CIRCULATION_CODE_PREFIX, None).unwrap();
    assert_eq!(first.to_string(), "SKL001");
    let next = SequenceCode::next_after(CIRCULATION_CODE_PREFIX, Some("SKL999")).unwrap();
    assert_eq!(next.to_string(), "SKL1000");
    assert!(SequenceCode::parse(CIRCULATION_CODE_PREFIX, "BK001").is_err());
}
