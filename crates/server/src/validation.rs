//! Request body validation.
//!
//! Each check collects every violation before failing, so a response can
//! list all offending fields at once. Limits mirror the persisted schema:
//! names <= 100 chars, categories <= 50, descriptions <= 500, tags <= 30.

use api_types::{
    account::{AccountNew, AccountUpdate},
    auth::Register,
    budget::{BudgetNew, BudgetUpdate},
    transaction::{TransactionKind, TransactionNew, TransactionUpdate},
    user::{PasswordChange, ProfileUpdate},
};

use crate::ServerError;

const NAME_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;
const TAG_MAX: usize = 30;
const PASSWORD_MIN: usize = 6;

fn finish(violations: Vec<String>) -> Result<(), ServerError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ServerError::Validation(violations))
    }
}

fn check_required_text(violations: &mut Vec<String>, value: &str, field: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(format!("{field} must not be empty"));
    } else if trimmed.chars().count() > max {
        violations.push(format!("{field} must be at most {max} characters"));
    }
}

fn check_optional_text(violations: &mut Vec<String>, value: Option<&str>, field: &str, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            violations.push(format!("{field} must be at most {max} characters"));
        }
    }
}

fn check_email(violations: &mut Vec<String>, email: &str) {
    let trimmed = email.trim();
    let well_formed = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        violations.push("email must be a valid address".to_string());
    }
}

fn check_currency(violations: &mut Vec<String>, currency: Option<&str>) {
    if let Some(code) = currency {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            violations.push("currency must be a three-letter code".to_string());
        }
    }
}

fn check_tags(violations: &mut Vec<String>, tags: Option<&[String]>) {
    if let Some(tags) = tags {
        for tag in tags {
            if tag.trim().is_empty() {
                violations.push("tags must not contain empty entries".to_string());
            } else if tag.chars().count() > TAG_MAX {
                violations.push(format!("tags must be at most {TAG_MAX} characters each"));
            }
        }
    }
}

pub(crate) fn register(payload: &Register) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    check_required_text(&mut violations, &payload.name, "name", NAME_MAX);
    check_email(&mut violations, &payload.email);
    if payload.password.chars().count() < PASSWORD_MIN {
        violations.push(format!(
            "password must be at least {PASSWORD_MIN} characters"
        ));
    }
    finish(violations)
}

pub(crate) fn profile_update(payload: &ProfileUpdate) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        check_required_text(&mut violations, name, "name", NAME_MAX);
    }
    if let Some(email) = payload.email.as_deref() {
        check_email(&mut violations, email);
    }
    finish(violations)
}

pub(crate) fn password_change(payload: &PasswordChange) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if payload.current_password.is_empty() {
        violations.push("current_password must not be empty".to_string());
    }
    if payload.new_password.chars().count() < PASSWORD_MIN {
        violations.push(format!(
            "new_password must be at least {PASSWORD_MIN} characters"
        ));
    }
    finish(violations)
}

pub(crate) fn account_new(payload: &AccountNew) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    check_required_text(&mut violations, &payload.name, "name", NAME_MAX);
    check_currency(&mut violations, payload.currency.as_deref());
    check_optional_text(
        &mut violations,
        payload.description.as_deref(),
        "description",
        DESCRIPTION_MAX,
    );
    finish(violations)
}

pub(crate) fn account_update(payload: &AccountUpdate) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        check_required_text(&mut violations, name, "name", NAME_MAX);
    }
    check_currency(&mut violations, payload.currency.as_deref());
    check_optional_text(
        &mut violations,
        payload.description.as_deref(),
        "description",
        DESCRIPTION_MAX,
    );
    finish(violations)
}

pub(crate) fn transaction_new(payload: &TransactionNew) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if payload.amount_minor <= 0 {
        violations.push("amount_minor must be positive".to_string());
    }
    check_required_text(&mut violations, &payload.category, "category", CATEGORY_MAX);
    check_optional_text(
        &mut violations,
        payload.description.as_deref(),
        "description",
        DESCRIPTION_MAX,
    );
    check_tags(&mut violations, payload.tags.as_deref());
    if payload.kind == TransactionKind::Transfer {
        match payload.transfer_account_id {
            None => violations.push("transfer_account_id is required for transfers".to_string()),
            Some(target) if target == payload.account_id => {
                violations.push("transfer_account_id must differ from account_id".to_string());
            }
            Some(_) => {}
        }
    }
    finish(violations)
}

pub(crate) fn transaction_update(payload: &TransactionUpdate) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if let Some(amount) = payload.amount_minor {
        if amount <= 0 {
            violations.push("amount_minor must be positive".to_string());
        }
    }
    if let Some(category) = payload.category.as_deref() {
        check_required_text(&mut violations, category, "category", CATEGORY_MAX);
    }
    check_optional_text(
        &mut violations,
        payload.description.as_deref(),
        "description",
        DESCRIPTION_MAX,
    );
    check_tags(&mut violations, payload.tags.as_deref());
    finish(violations)
}

pub(crate) fn budget_new(payload: &BudgetNew) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    check_optional_text(&mut violations, payload.name.as_deref(), "name", NAME_MAX);
    check_required_text(&mut violations, &payload.category, "category", CATEGORY_MAX);
    if payload.amount_minor < 0 {
        violations.push("amount_minor must not be negative".to_string());
    }
    if let (Some(start), Some(end)) = (payload.start_date, payload.end_date) {
        if end < start {
            violations.push("end_date must not precede start_date".to_string());
        }
    }
    finish(violations)
}

pub(crate) fn budget_update(payload: &BudgetUpdate) -> Result<(), ServerError> {
    let mut violations = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        check_required_text(&mut violations, name, "name", NAME_MAX);
    }
    if let Some(category) = payload.category.as_deref() {
        check_required_text(&mut violations, category, "category", CATEGORY_MAX);
    }
    if let Some(amount) = payload.amount_minor {
        if amount < 0 {
            violations.push("amount_minor must not be negative".to_string());
        }
    }
    if let (Some(start), Some(end)) = (payload.start_date, payload.end_date) {
        if end < start {
            violations.push("end_date must not precede start_date".to_string());
        }
    }
    finish(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::account::AccountKind;
    use uuid::Uuid;

    #[test]
    fn register_collects_all_violations() {
        let err = register(&Register {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "hunt".to_string(),
        });
        match err {
            Err(ServerError::Validation(violations)) => assert_eq!(violations.len(), 3),
            _ => panic!("expected validation failure"),
        }
    }

    #[test]
    fn transfer_requires_a_distinct_target() {
        let account_id = Uuid::new_v4();
        let base = TransactionNew {
            account_id,
            amount_minor: 100,
            kind: TransactionKind::Transfer,
            category: "Transfers".to_string(),
            description: None,
            date: None,
            tags: None,
            transfer_account_id: None,
        };
        assert!(transaction_new(&base).is_err());

        let same_target = TransactionNew {
            transfer_account_id: Some(account_id),
            ..base
        };
        assert!(transaction_new(&same_target).is_err());
    }

    #[test]
    fn account_currency_must_be_three_letters() {
        let payload = AccountNew {
            name: "Checking".to_string(),
            kind: AccountKind::Checking,
            balance_minor: None,
            currency: Some("DOLLARS".to_string()),
            description: None,
            is_active: None,
        };
        assert!(account_new(&payload).is_err());
    }

    #[test]
    fn valid_payloads_pass() {
        let payload = AccountNew {
            name: "Checking".to_string(),
            kind: AccountKind::Checking,
            balance_minor: Some(10_000),
            currency: Some("usd".to_string()),
            description: None,
            is_active: None,
        };
        assert!(account_new(&payload).is_ok());
    }
}
