use super::*;
use proptest::prelude::*;

fn a1() -> AccountId {
    AccountId("A1".into())
}

#[test]
fn debit_form_builds_debit_request() {
    let form = OperationForm::new(OperationKind::Debit, "30", "atm");
    let request = validate_operation(Some(&a1()), &form).expect("valid");
    assert_eq!(
        request,
        OperationRequest::Debit {
            account: a1(),
            amount: Decimal::new(30, 0),
            description: "atm".into(),
        }
    );
}

#[test]
fn credit_ignores_destination_entirely() {
    let form = OperationForm::new(OperationKind::Credit, "12.50", "salary").with_destination("   ");
    let request = validate_operation(Some(&a1()), &form).expect("valid");
    assert_eq!(request.kind(), OperationKind::Credit);
    assert_eq!(request.amount(), Decimal::new(1250, 2));
}

#[test]
fn transfer_without_destination_is_rejected() {
    let form = OperationForm::new(OperationKind::Transfer, "10", "rent");
    let violations = validate_operation(Some(&a1()), &form).expect_err("must fail");
    assert_eq!(violations, vec![Violation::DestinationRequiredForTransfer]);
    assert_eq!(violations[0].field(), FormField::Destination);
}

#[test]
fn transfer_keeps_source_and_destination_independent() {
    let form = OperationForm::new(OperationKind::Transfer, "10", " rent ").with_destination(" B2 ");
    let request = validate_operation(Some(&a1()), &form).expect("valid");
    assert_eq!(
        request,
        OperationRequest::Transfer {
            source: a1(),
            destination: AccountId("B2".into()),
            amount: Decimal::new(10, 0),
            description: "rent".into(),
        }
    );
}

#[test]
fn reports_every_violation_at_once() {
    let form = OperationForm::new(OperationKind::Transfer, "abc", "  ");
    let violations = validate_operation(None, &form).expect_err("must fail");
    assert_eq!(
        violations,
        vec![
            Violation::AccountRequired,
            Violation::AmountMustBePositive,
            Violation::DescriptionRequired,
            Violation::DestinationRequiredForTransfer,
        ]
    );
}

#[test]
fn blank_selected_account_counts_as_missing() {
    let form = OperationForm::new(OperationKind::Debit, "5", "fee");
    let violations =
        validate_operation(Some(&AccountId("  ".into())), &form).expect_err("must fail");
    assert_eq!(violations, vec![Violation::AccountRequired]);
}

#[test]
fn empty_and_zero_amounts_are_rejected() {
    for raw in ["", "0", "0.00", "-0", "   "] {
        let form = OperationForm::new(OperationKind::Debit, raw, "fee");
        let violations = validate_operation(Some(&a1()), &form).expect_err("must fail");
        assert_eq!(violations, vec![Violation::AmountMustBePositive], "amount {raw:?}");
    }
}

proptest! {
    #[test]
    fn non_positive_amounts_never_validate(cents in i64::MIN / 2..=0i64, kind_idx in 0usize..3) {
        let kind = OperationKind::ALL[kind_idx];
        let amount = Decimal::new(cents, 2).to_string();
        let form = OperationForm::new(kind, amount, "desc").with_destination("B2");
        let violations = validate_operation(Some(&a1()), &form).expect_err("must fail");
        prop_assert!(violations.contains(&Violation::AmountMustBePositive));
    }

    #[test]
    fn positive_amounts_validate_for_debit_and_credit(cents in 1i64..1_000_000_000i64, credit in any::<bool>()) {
        let kind = if credit { OperationKind::Credit } else { OperationKind::Debit };
        let form = OperationForm::new(kind, Decimal::new(cents, 2).to_string(), "desc");
        let request = validate_operation(Some(&a1()), &form).expect("valid");
        prop_assert_eq!(request.amount(), Decimal::new(cents, 2));
        prop_assert_eq!(request.kind(), kind);
    }
}
