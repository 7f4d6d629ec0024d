use chrono::Utc;
use uuid::Uuid;

use engine::{
    AccountKind, CreateAccountCmd, CreateTransactionCmd, Engine, EngineError, MoneyCents,
    TransactionKind, TransactionListFilter, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_user() -> (Engine, Uuid) {
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .create_user("Alice", "alice@example.com", "not-a-real-hash")
        .await
        .unwrap();
    (engine, user.id)
}

async fn checking_account(engine: &Engine, user_id: Uuid, opening_minor: i64) -> Uuid {
    engine
        .new_account(
            CreateAccountCmd::new(user_id, "Checking", AccountKind::Checking)
                .opening_balance(MoneyCents::new(opening_minor)),
        )
        .await
        .unwrap()
        .id
}

async fn balance_of(engine: &Engine, account_id: Uuid, user_id: Uuid) -> i64 {
    engine
        .account(account_id, user_id)
        .await
        .unwrap()
        .balance
        .cents()
}

#[tokio::test]
async fn expense_create_update_delete_round_trips_the_balance() {
    let (engine, user_id) = engine_with_user().await;
    let account_id = checking_account(&engine, user_id, 10_000).await;

    // Create: 100.00 - 30.00 = 70.00
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            account_id,
            MoneyCents::new(3_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id, user_id).await, 7_000);

    // Update the amount: 70.00 + 30.00 - 50.00 = 50.00
    engine
        .update_transaction(
            UpdateTransactionCmd::new(tx.id, user_id).amount(MoneyCents::new(5_000)),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id, user_id).await, 5_000);

    // Delete: back to the opening balance.
    engine.delete_transaction(tx.id, user_id).await.unwrap();
    assert_eq!(balance_of(&engine, account_id, user_id).await, 10_000);
}

#[tokio::test]
async fn income_increases_the_balance() {
    let (engine, user_id) = engine_with_user().await;
    let account_id = checking_account(&engine, user_id, 0).await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            account_id,
            MoneyCents::new(123_456),
            TransactionKind::Income,
            "Salary",
            Utc::now(),
        ))
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, account_id, user_id).await, 123_456);
}

#[tokio::test]
async fn balance_equals_opening_plus_signed_sum() {
    let (engine, user_id) = engine_with_user().await;
    let opening = 50_000;
    let account_id = checking_account(&engine, user_id, opening).await;

    let incomes = [12_000, 700];
    let expenses = [4_999, 1, 20_000];
    for amount in incomes {
        engine
            .create_transaction(CreateTransactionCmd::new(
                user_id,
                account_id,
                MoneyCents::new(amount),
                TransactionKind::Income,
                "Misc",
                Utc::now(),
            ))
            .await
            .unwrap();
    }
    for amount in expenses {
        engine
            .create_transaction(CreateTransactionCmd::new(
                user_id,
                account_id,
                MoneyCents::new(amount),
                TransactionKind::Expense,
                "Misc",
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    let stored = engine
        .transactions(user_id, &TransactionListFilter::default())
        .await
        .unwrap();
    let signed_sum: i64 = stored
        .iter()
        .map(|tx| match tx.kind {
            TransactionKind::Income => tx.amount.cents(),
            TransactionKind::Expense => -tx.amount.cents(),
            TransactionKind::Transfer => 0,
        })
        .sum();

    assert_eq!(
        balance_of(&engine, account_id, user_id).await,
        opening + signed_sum
    );
}

#[tokio::test]
async fn transfer_moves_both_legs_atomically() {
    let (engine, user_id) = engine_with_user().await;
    let source = checking_account(&engine, user_id, 10_000).await;
    let target = engine
        .new_account(CreateAccountCmd::new(user_id, "Savings", AccountKind::Savings))
        .await
        .unwrap()
        .id;

    let tx = engine
        .create_transaction(
            CreateTransactionCmd::new(
                user_id,
                source,
                MoneyCents::new(2_500),
                TransactionKind::Transfer,
                "Transfers",
                Utc::now(),
            )
            .transfer_account_id(target),
        )
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, source, user_id).await, 7_500);
    assert_eq!(balance_of(&engine, target, user_id).await, 2_500);

    // Deleting the transfer restores both accounts.
    engine.delete_transaction(tx.id, user_id).await.unwrap();
    assert_eq!(balance_of(&engine, source, user_id).await, 10_000);
    assert_eq!(balance_of(&engine, target, user_id).await, 0);
}

#[tokio::test]
async fn transfer_requires_a_distinct_owned_target() {
    let (engine, user_id) = engine_with_user().await;
    let source = checking_account(&engine, user_id, 10_000).await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            source,
            MoneyCents::new(1_000),
            TransactionKind::Transfer,
            "Transfers",
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransfer(_)));

    let err = engine
        .create_transaction(
            CreateTransactionCmd::new(
                user_id,
                source,
                MoneyCents::new(1_000),
                TransactionKind::Transfer,
                "Transfers",
                Utc::now(),
            )
            .transfer_account_id(source),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransfer(_)));

    let err = engine
        .create_transaction(
            CreateTransactionCmd::new(
                user_id,
                source,
                MoneyCents::new(1_000),
                TransactionKind::Transfer,
                "Transfers",
                Utc::now(),
            )
            .transfer_account_id(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));

    // Nothing was written and the balance is untouched.
    assert_eq!(balance_of(&engine, source, user_id).await, 10_000);
    let stored = engine
        .transactions(user_id, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn update_can_move_a_transaction_to_another_account() {
    let (engine, user_id) = engine_with_user().await;
    let first = checking_account(&engine, user_id, 10_000).await;
    let second = engine
        .new_account(CreateAccountCmd::new(user_id, "Cash", AccountKind::Cash))
        .await
        .unwrap()
        .id;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            first,
            MoneyCents::new(2_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, first, user_id).await, 8_000);

    engine
        .update_transaction(UpdateTransactionCmd::new(tx.id, user_id).account_id(second))
        .await
        .unwrap();

    assert_eq!(balance_of(&engine, first, user_id).await, 10_000);
    assert_eq!(balance_of(&engine, second, user_id).await, -2_000);
}

#[tokio::test]
async fn update_can_flip_the_kind() {
    let (engine, user_id) = engine_with_user().await;
    let account_id = checking_account(&engine, user_id, 0).await;

    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            account_id,
            MoneyCents::new(1_500),
            TransactionKind::Expense,
            "Misc",
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id, user_id).await, -1_500);

    engine
        .update_transaction(
            UpdateTransactionCmd::new(tx.id, user_id).kind(TransactionKind::Income),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, account_id, user_id).await, 1_500);
}

#[tokio::test]
async fn missing_account_is_reported_as_not_found() {
    let (engine, user_id) = engine_with_user().await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            Uuid::new_v4(),
            MoneyCents::new(1_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
}

#[tokio::test]
async fn other_users_rows_are_invisible() {
    let (engine, alice) = engine_with_user().await;
    let bob = engine
        .create_user("Bob", "bob@example.com", "not-a-real-hash")
        .await
        .unwrap()
        .id;

    let account_id = checking_account(&engine, alice, 10_000).await;
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            alice,
            account_id,
            MoneyCents::new(1_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap();

    let err = engine.account(account_id, bob).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
    let err = engine.transaction(tx.id, bob).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
    assert!(
        engine
            .transactions(bob, &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn deleting_an_account_reverses_cross_account_legs() {
    let (engine, user_id) = engine_with_user().await;
    let doomed = checking_account(&engine, user_id, 10_000).await;
    let survivor = engine
        .new_account(CreateAccountCmd::new(user_id, "Savings", AccountKind::Savings))
        .await
        .unwrap()
        .id;

    // Transfer out of the doomed account credited the survivor.
    engine
        .create_transaction(
            CreateTransactionCmd::new(
                user_id,
                doomed,
                MoneyCents::new(4_000),
                TransactionKind::Transfer,
                "Transfers",
                Utc::now(),
            )
            .transfer_account_id(survivor),
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&engine, survivor, user_id).await, 4_000);

    engine.delete_account(doomed, user_id).await.unwrap();

    // The transfer row is gone and the survivor's balance matches its
    // remaining transaction set again.
    assert_eq!(balance_of(&engine, survivor, user_id).await, 0);
    let stored = engine
        .transactions(user_id, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(stored.is_empty());

    let err = engine.account(doomed, user_id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
}

#[tokio::test]
async fn deleting_a_user_cascades_to_owned_entities() {
    let (engine, user_id) = engine_with_user().await;
    let account_id = checking_account(&engine, user_id, 10_000).await;
    engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            account_id,
            MoneyCents::new(1_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap();

    engine.delete_user(user_id).await.unwrap();

    let err = engine.user_by_id(user_id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
    assert!(engine.accounts(user_id).await.unwrap().is_empty());
    assert!(
        engine
            .transactions(user_id, &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(engine.budgets(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_compose() {
    let (engine, user_id) = engine_with_user().await;
    let first = checking_account(&engine, user_id, 0).await;
    let second = engine
        .new_account(CreateAccountCmd::new(user_id, "Cash", AccountKind::Cash))
        .await
        .unwrap()
        .id;

    engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            first,
            MoneyCents::new(1_000),
            TransactionKind::Expense,
            "Food",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            user_id,
            second,
            MoneyCents::new(2_000),
            TransactionKind::Income,
            "Salary",
            Utc::now(),
        ))
        .await
        .unwrap();

    let filter = TransactionListFilter {
        account_id: Some(first),
        ..Default::default()
    };
    let by_account = engine.transactions(user_id, &filter).await.unwrap();
    assert_eq!(by_account.len(), 1);
    assert_eq!(by_account[0].category, "Food");

    let filter = TransactionListFilter {
        kind: Some(TransactionKind::Income),
        ..Default::default()
    };
    let by_kind = engine.transactions(user_id, &filter).await.unwrap();
    assert_eq!(by_kind.len(), 1);
    assert_eq!(by_kind[0].account_id, second);

    let filter = TransactionListFilter {
        category: Some("Food".to_string()),
        kind: Some(TransactionKind::Income),
        ..Default::default()
    };
    assert!(engine.transactions(user_id, &filter).await.unwrap().is_empty());
}
