//! Ledger: contract registry and transaction entry point
//!
//! The ledger owns the committed store, the deployed contracts, and the
//! services contracts reach through their [`CallContext`]. Outer
//! transactions are serialized: one call stack is live at a time, and the
//! store only ever sees whole committed transactions.
//!
//! # Example
//!
//! ```text
//! let ledger = Ledger::new();
//! ledger.deploy("hello", Arc::new(Hello::new()?))?;
//! ledger.transact("alice", "hello", "hi", 0, CallArgs::encode(&(Name::new("alice"),))?)?;
//!
//! let visits = ledger.view("hello", |state| Ok(counter.get(state)?.visits))?;
//! ```

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tessera_concurrency::{CallStack, FrameState, Invocation};
use tessera_core::{CallArgs, Error, Name, Result, Storage};
use tessera_primitives::SchemaRegistry;
use tessera_storage::UnifiedStore;
use tracing::info;

use crate::balances::Balances;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::console::{Console, TracingConsole};
use crate::contract::Contract;
use crate::dispatcher;
use crate::metrics::{InvocationCounters, InvocationMetrics};

struct Deployed {
    contract: Arc<dyn Contract>,
    schema: Arc<SchemaRegistry>,
}

/// Deployed contracts plus their committed state
pub struct Ledger {
    /// Committed state of every namespace
    store: Arc<UnifiedStore>,

    /// Deployed contracts by name
    contracts: RwLock<BTreeMap<Name, Deployed>>,

    /// Serializes outer transactions
    ///
    /// Using parking_lot::Mutex to avoid lock poisoning on a panicking
    /// contract.
    transaction_lock: Mutex<()>,

    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    console: Arc<dyn Console>,
    balances: Balances,
    counters: InvocationCounters,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("contracts", &self.contracts())
            .field("config", &self.config)
            .field("version", &self.store.current_version())
            .finish()
    }
}

impl Ledger {
    /// Empty ledger with default configuration
    pub fn new() -> Self {
        Self::build(LedgerConfig::default())
    }

    /// Empty ledger with a validated configuration
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Empty ledger configured from a `tessera.toml` file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Self::with_config(LedgerConfig::from_file(path)?)
    }

    fn build(config: LedgerConfig) -> Self {
        Self {
            store: Arc::new(UnifiedStore::new()),
            contracts: RwLock::new(BTreeMap::new()),
            transaction_lock: Mutex::new(()),
            config,
            clock: Arc::new(SystemClock),
            console: Arc::new(TracingConsole),
            balances: Balances::new(),
            counters: InvocationCounters::new(),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the output sink
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    // ========== Accessors ==========

    /// Committed store
    pub fn store(&self) -> &UnifiedStore {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Output sink used by `print`
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    pub(crate) fn balances(&self) -> &Balances {
        &self.balances
    }

    pub(crate) fn counters(&self) -> &InvocationCounters {
        &self.counters
    }

    /// Invocation statistics since the ledger was created
    pub fn metrics(&self) -> InvocationMetrics {
        self.counters.snapshot()
    }

    // ========== Contracts ==========

    /// Deploy `contract` under `name`
    ///
    /// Fails with `ContractExists` if the name is taken and with
    /// `SchemaError` if the contract's declarations are invalid.
    pub fn deploy(&self, name: impl Into<Name>, contract: Arc<dyn Contract>) -> Result<()> {
        let name = name.into();
        if name.is_system() || name.as_str().is_empty() {
            return Err(Error::InvalidOperation(format!(
                "'{}' cannot be used as a contract name",
                name
            )));
        }
        let schema = contract.schema()?;

        let mut contracts = self.contracts.write();
        if contracts.contains_key(&name) {
            return Err(Error::ContractExists(name));
        }
        info!(
            target: "tessera::dispatch",
            contract = %name,
            methods = ?contract.methods(),
            tables = schema.len(),
            "Contract deployed"
        );
        contracts.insert(
            name,
            Deployed {
                contract,
                schema: Arc::new(schema),
            },
        );
        Ok(())
    }

    /// Names of deployed contracts in order
    pub fn contracts(&self) -> Vec<Name> {
        self.contracts.read().keys().cloned().collect()
    }

    /// Declarations of a deployed contract
    pub fn schema_of(&self, name: &Name) -> Option<SchemaRegistry> {
        self.contracts
            .read()
            .get(name)
            .map(|d| d.schema.as_ref().clone())
    }

    /// Contract and declarations behind `target`, if it has `method`
    pub(crate) fn resolve(
        &self,
        target: &Name,
        method: &str,
    ) -> Result<(Arc<dyn Contract>, Arc<SchemaRegistry>)> {
        let contracts = self.contracts.read();
        match contracts.get(target) {
            Some(deployed) if deployed.contract.has_method(method) => Ok((
                Arc::clone(&deployed.contract),
                Arc::clone(&deployed.schema),
            )),
            _ => Err(Error::MethodNotFound {
                contract: target.clone(),
                method: method.to_string(),
            }),
        }
    }

    // ========== Transactions ==========

    /// Run one outer transaction: `caller` invokes `method` on `target`
    ///
    /// Either every write of the call tree is committed at once, or none is.
    pub fn transact(
        &self,
        caller: impl Into<Name>,
        target: impl Into<Name>,
        method: &str,
        amount: u64,
        args: CallArgs,
    ) -> Result<()> {
        let _guard = self.transaction_lock.lock();
        let mut stack = CallStack::with_max_depth(self.config.max_call_depth);
        let now = self.clock.now();
        let invocation = Invocation::new(caller.into(), target.into(), method, amount, args);
        dispatcher::dispatch(self, &mut stack, now, invocation)
    }

    /// Run `f` against a namespace in a frame that always rolls back
    fn scratch<T, F>(&self, namespace: Name, f: F) -> Result<T>
    where
        F: FnOnce(&mut FrameState<'_>) -> Result<T>,
    {
        let mut stack = CallStack::with_max_depth(1);
        let mut frame = stack.new_frame(Invocation::new(
            Name::system(),
            namespace.clone(),
            "view",
            0,
            CallArgs::empty(),
        ))?;
        frame.mark_resolving()?;
        frame.mark_executing()?;
        stack.push(frame)?;

        let result = {
            let mut state = FrameState::new(self.store.as_ref(), &mut stack, namespace);
            f(&mut state)
        };
        stack.rollback_top("view finished")?;
        result
    }

    /// Inspect a contract's committed state
    ///
    /// Anything `f` writes is discarded.
    pub fn view<T, F>(&self, namespace: impl Into<Name>, f: F) -> Result<T>
    where
        F: FnOnce(&mut FrameState<'_>) -> Result<T>,
    {
        self.scratch(namespace.into(), f)
    }

    /// Committed balance of `account`
    pub fn balance(&self, account: impl Into<Name>) -> Result<u64> {
        let account = account.into();
        self.scratch(Name::system(), |state| self.balances.balance(state, &account))
    }

    /// Mint `amount` into `account` outside any contract call
    pub fn deposit(&self, account: impl Into<Name>, amount: u64) -> Result<u64> {
        let account = account.into();
        let _guard = self.transaction_lock.lock();

        let mut stack = CallStack::with_max_depth(1);
        let mut frame = stack.new_frame(Invocation::new(
            Name::system(),
            Name::system(),
            "deposit",
            amount,
            CallArgs::empty(),
        ))?;
        frame.mark_resolving()?;
        frame.mark_executing()?;
        stack.push(frame)?;

        let credited = {
            let mut state = FrameState::new(self.store.as_ref(), &mut stack, Name::system());
            self.balances.credit(&mut state, &account, amount)
        };
        match credited {
            Ok(balance) => {
                stack.commit_top(self.store.as_ref())?;
                Ok(balance)
            }
            Err(err) => {
                stack.rollback_top(err.to_string())?;
                Err(err)
            }
        }
    }
}
