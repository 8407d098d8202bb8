//! The single entry point the web layer uses to reach the database.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{PasswordHash, User, add_user, create_user, get_user_by_username, validate_user},
    csv_import::import_csv,
    db::initialize,
    record::{self, Domain, Entry, FormFields, Record, RecordId, get_records, insert_record},
};

/// Registers users, checks their credentials and stores their financial records.
///
/// Every operation takes the name of the user it acts for, and locks the
/// shared connection only while it runs SQL.
///
/// Cloning is cheap, clones share the same connection.
#[derive(Debug, Clone)]
pub struct FinanceStore {
    connection: Arc<Mutex<Connection>>,
    hash_cost: u32,
}

impl FinanceStore {
    /// Create a store over `connection`, creating the tables if needed.
    ///
    /// # Errors
    ///
    /// Returns an [Error::BadRequest] if the lock is poisoned or the schema
    /// could not be created.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Result<Self, Error> {
        let store = Self {
            connection,
            hash_cost: PasswordHash::DEFAULT_COST,
        };

        initialize(&*store.lock()?)?;

        Ok(store)
    }

    /// Set the bcrypt cost used when registering users.
    ///
    /// The default is [PasswordHash::DEFAULT_COST], tests use a lower cost to run faster.
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire the database lock: {error}");
            Error::bad_request("the database is unavailable")
        })
    }

    /// Register a new user.
    ///
    /// The password is hashed before the connection is locked, so a slow hash
    /// does not hold up other users' requests.
    ///
    /// # Errors
    ///
    /// Returns an [Error::UsernameAlreadyExists] if the name is taken, or an
    /// [Error::BadRequest] if either field is empty.
    pub fn register(&self, username: &str, password: &str) -> Result<User, Error> {
        let user = add_user(username, password, self.hash_cost, |username, password_hash| {
            create_user(username, password_hash, &*self.lock()?)
        })?;
        tracing::info!("Registered user {}", user.username);

        Ok(user)
    }

    /// Check whether `password` is correct for `username`.
    ///
    /// The connection is only locked to fetch the stored hash, not to check it.
    ///
    /// # Errors
    ///
    /// Returns an [Error::BadRequest] if either field is empty.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool, Error> {
        validate_user(username, password, |username| {
            get_user_by_username(username, &*self.lock()?)
        })
    }

    /// Validate `fields` as a `domain` record and store it for `username`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::BadRequest] naming the offending field if
    /// validation fails, or if the record could not be stored.
    pub fn add_record(
        &self,
        username: &str,
        domain: Domain,
        fields: &FormFields,
    ) -> Result<Record, Error> {
        let entry = Entry::validate(domain, fields)?;

        insert_record(username, entry, &*self.lock()?)
    }

    /// Get all of `username`'s records of type `domain`, oldest first.
    pub fn list_records(&self, username: &str, domain: Domain) -> Result<Vec<Record>, Error> {
        get_records(domain, username, &*self.lock()?)
    }

    /// Get one of `username`'s records.
    ///
    /// # Errors
    ///
    /// Returns an [Error::KeyNotFound] if `username` has no `domain` record with `id`.
    pub fn get_record(
        &self,
        username: &str,
        domain: Domain,
        id: RecordId,
    ) -> Result<Record, Error> {
        record::get_record(domain, username, id, &*self.lock()?)
    }

    /// Import `text` as CSV rows of `domain` records for `username`.
    ///
    /// Either every row is stored or, on the first bad row, none are.
    pub fn import_csv(&self, username: &str, domain: Domain, text: &str) -> Result<usize, Error> {
        import_csv(username, domain, text, &*self.lock()?)
    }
}

#[cfg(test)]
mod finance_store_tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        thread,
        time::{Duration, Instant},
    };

    use rusqlite::Connection;

    use crate::{
        Error,
        auth::PasswordHash,
        record::{Domain, Entry, Expense, FormFields},
    };

    use super::FinanceStore;

    fn get_store() -> FinanceStore {
        let connection = Connection::open_in_memory().unwrap();

        FinanceStore::new(Arc::new(Mutex::new(connection)))
            .unwrap()
            .with_hash_cost(4)
    }

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn expense(amount: f64, description: &str) -> Entry {
        Entry::Expense(Expense {
            amount,
            description: description.to_owned(),
            due_date: None,
        })
    }

    #[test]
    fn register_then_authenticate() {
        let store = get_store();

        store.register("alice", "pw1").unwrap();

        assert_eq!(store.authenticate("alice", "pw1"), Ok(true));
        assert_eq!(store.authenticate("alice", "wrong"), Ok(false));
    }

    #[test]
    fn second_registration_fails_and_keeps_first_password() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let result = store.register("alice", "pw2");

        assert_eq!(result, Err(Error::UsernameAlreadyExists("alice".to_owned())));
        assert_eq!(store.authenticate("alice", "pw1"), Ok(true));
        assert_eq!(store.authenticate("alice", "pw2"), Ok(false));
    }

    #[test]
    fn authenticate_with_empty_password_fails() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        assert!(matches!(
            store.authenticate("alice", ""),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn added_record_is_listed() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let record = store
            .add_record(
                "alice",
                Domain::Expense,
                &fields(&[("amount", "50"), ("description", "food")]),
            )
            .unwrap();

        let records = store.list_records("alice", Domain::Expense).unwrap();
        assert_eq!(records, vec![record]);
        assert_eq!(records[0].entry, expense(50.0, "food"));
    }

    #[test]
    fn invalid_amount_is_rejected_without_storing() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let result = store.add_record(
            "alice",
            Domain::Spending,
            &fields(&[("amount", "abc"), ("category", "food")]),
        );

        match result {
            Err(Error::BadRequest(message)) => assert!(message.contains("amount"), "{message}"),
            other => panic!("want bad request, got {other:?}"),
        }
        assert_eq!(store.list_records("alice", Domain::Spending), Ok(vec![]));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let result = store.add_record("alice", Domain::Income, &HashMap::new());

        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn users_only_see_their_own_records() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();
        store.register("bob", "pw2").unwrap();
        let record = store
            .add_record(
                "alice",
                Domain::Goal,
                &fields(&[("amount", "1000"), ("description", "holiday")]),
            )
            .unwrap();

        assert_eq!(store.list_records("bob", Domain::Goal), Ok(vec![]));
        assert!(matches!(
            store.get_record("bob", Domain::Goal, record.id),
            Err(Error::KeyNotFound(_))
        ));
        assert_eq!(store.get_record("alice", Domain::Goal, record.id), Ok(record));
    }

    #[test]
    fn record_for_unknown_user_is_rejected() {
        let store = get_store();

        let result = store.add_record(
            "mallory",
            Domain::Expense,
            &fields(&[("amount", "1"), ("description", "x")]),
        );

        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn import_csv_adds_every_row() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let count = store.import_csv("alice", Domain::Expense, "50,food\n20,transport");

        assert_eq!(count, Ok(2));
        let entries: Vec<Entry> = store
            .list_records("alice", Domain::Expense)
            .unwrap()
            .into_iter()
            .map(|record| record.entry)
            .collect();
        assert_eq!(entries, vec![expense(50.0, "food"), expense(20.0, "transport")]);
    }

    #[test]
    fn import_csv_with_bad_row_adds_nothing() {
        let store = get_store();
        store.register("alice", "pw1").unwrap();

        let result = store.import_csv("alice", Domain::Expense, "50,food\nabc,transport");

        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert_eq!(store.list_records("alice", Domain::Expense), Ok(vec![]));
    }

    #[test]
    fn lock_is_released_after_errors() {
        let store = get_store();

        assert!(store.register("", "pw").is_err());

        assert!(store.register("alice", "pw").is_ok());
    }

    #[test]
    fn poisoned_lock_becomes_bad_request() {
        let store = get_store();
        let connection = store.connection.clone();

        let _ = thread::spawn(move || {
            let _guard = connection.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            store.list_records("alice", Domain::Debt),
            Err(Error::BadRequest(_))
        ));
    }

    /// Time `list_records` while another thread runs `slow_call`.
    fn list_records_latency_during(
        store: &FinanceStore,
        slow_call: impl FnOnce(FinanceStore) + Send + 'static,
    ) -> Duration {
        let other = store.clone();
        let handle = thread::spawn(move || slow_call(other));
        // Give the other thread time to start hashing.
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        store.list_records("bob", Domain::Expense).unwrap();
        let elapsed = start.elapsed();

        handle.join().unwrap();

        elapsed
    }

    #[test]
    fn password_hashing_does_not_hold_the_connection() {
        let store = FinanceStore::new(Arc::new(Mutex::new(Connection::open_in_memory().unwrap())))
            .unwrap()
            .with_hash_cost(PasswordHash::DEFAULT_COST);

        let elapsed = list_records_latency_during(&store, |store| {
            store.register("alice", "hunter2").unwrap();
        });
        assert!(elapsed < Duration::from_millis(100), "register blocked for {elapsed:?}");

        let elapsed = list_records_latency_during(&store, |store| {
            assert_eq!(store.authenticate("alice", "hunter2"), Ok(true));
        });
        assert!(elapsed < Duration::from_millis(100), "authenticate blocked for {elapsed:?}");
    }

    #[test]
    fn clones_share_the_connection() {
        let store = get_store();
        let other = store.clone();

        store.register("alice", "pw1").unwrap();

        assert_eq!(other.authenticate("alice", "pw1"), Ok(true));
    }
}
