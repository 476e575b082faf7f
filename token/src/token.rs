//! The `Token` facade: the public operation surface.
//!
//! Each operation stages its events in a local buffer while it runs. On
//! success the staged events are published to the [`EventBus`] and appended
//! to the journal; on failure they are dropped. Every check that can fail is
//! made before the first mutation, so a rejected call leaves the state
//! untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use levy_governance::{GovernanceEngine, Proposal};
use levy_ledger::{Allowances, EventBus, Ledger, LedgerEvent, TaxPolicy, TaxRouter, TaxSplit};
use levy_staking::{RewardSchedule, StakeRecord, StakingEngine};
use levy_types::{Address, Amount, LedgerParams, SupplyCapPolicy, Timestamp, DECIMALS};

use crate::config::TokenConfig;
use crate::dormant::{CommunityRewardPool, VestingSchedule};
use crate::error::TokenError;
use crate::guard::ReentrancyGuard;

/// Everything a snapshot persists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenState {
    name: String,
    symbol: String,
    params: LedgerParams,
    ledger: Ledger,
    router: TaxRouter,
    allowances: Allowances,
    staking: StakingEngine,
    governance: GovernanceEngine,
    vesting: BTreeMap<Address, VestingSchedule>,
    community_pool: CommunityRewardPool,
}

/// Point-in-time view of the token, suitable for JSON reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub name: String,
    pub symbol: String,
    pub total_supply: Amount,
    pub max_supply: Amount,
    pub total_staked: Amount,
    pub staking_pool_balance: Amount,
    pub proposal_count: u64,
    pub conserved: bool,
    pub balances: BTreeMap<Address, Amount>,
}

/// A taxed, stakeable, governable token.
pub struct Token {
    state: TokenState,
    guard: ReentrancyGuard,
    bus: EventBus,
    journal: Vec<LedgerEvent>,
}

impl Token {
    /// Validate `config`, then mint the initial distribution.
    ///
    /// The distribution mints always respect `max_supply`, whatever the
    /// reward cap policy says.
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;
        let params = config.params.clone();

        let mut state = TokenState {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            ledger: Ledger::new(params.max_supply),
            router: TaxRouter::new(TaxPolicy::from_params(&params), config.owner, config.treasury),
            allowances: Allowances::new(),
            staking: StakingEngine::new(RewardSchedule::from_params(&params)),
            governance: GovernanceEngine::from_params(&params),
            vesting: BTreeMap::new(),
            community_pool: CommunityRewardPool::default(),
            params,
        };

        let mut staged = Vec::new();
        let distribution = &config.distribution;
        if !distribution.owner_allocation.is_zero() {
            state
                .ledger
                .mint(config.owner, distribution.owner_allocation, &mut staged)?;
        }
        if !distribution.community_pool.is_zero() {
            state
                .ledger
                .mint(Address::SYSTEM, distribution.community_pool, &mut staged)?;
            state.community_pool.allocated = distribution.community_pool;
        }

        tracing::info!(
            name = %state.name,
            symbol = %state.symbol,
            owner = %config.owner,
            treasury = %config.treasury,
            supply = %state.ledger.total_supply(),
            "token created"
        );
        Ok(Self::from_parts(state, staged))
    }

    fn from_parts(state: TokenState, journal: Vec<LedgerEvent>) -> Self {
        Self {
            state,
            guard: ReentrancyGuard::new(),
            bus: EventBus::new(),
            journal,
        }
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Move `amount` from `caller` to `to` through the tax router.
    ///
    /// Returns the applied split, or `None` when the move was exempt.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Option<TaxSplit>, TokenError> {
        let mut staged = Vec::new();
        let result = self.state.transfer(caller, to, amount, &mut staged);
        self.commit("transfer", result, staged)
    }

    /// Set the amount `spender` may move out of `owner`'s balance.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let mut staged = Vec::new();
        let result = self.state.approve(owner, spender, amount, &mut staged);
        self.commit("approve", result, staged)
    }

    /// Move `amount` out of `from` on its behalf, consuming allowance.
    ///
    /// The move is taxed exactly like [`Token::transfer`]; the allowance is
    /// reduced by the gross amount.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Option<TaxSplit>, TokenError> {
        let mut staged = Vec::new();
        let result = self
            .state
            .transfer_from(spender, from, to, amount, &mut staged);
        self.commit("transfer_from", result, staged)
    }

    /// Lock `amount` of the caller's balance in the staking pool.
    ///
    /// Pending reward is settled first. The deposit is tax-routed, so a
    /// non-exempt staker pays tax on it while the stake record grows by the
    /// gross amount.
    pub fn stake(&mut self, caller: Address, amount: Amount, now: Timestamp) -> Result<(), TokenError> {
        self.guarded("stake", |state, staged| state.stake(caller, amount, now, staged))
    }

    /// Return `amount` of the caller's stake from the pool, untaxed.
    pub fn unstake(&mut self, caller: Address, amount: Amount, now: Timestamp) -> Result<(), TokenError> {
        self.guarded("unstake", |state, staged| {
            state.unstake(caller, amount, now, staged)
        })
    }

    /// Settle the caller's pending reward. Returns the amount minted.
    pub fn claim_reward(&mut self, caller: Address, now: Timestamp) -> Result<Amount, TokenError> {
        self.guarded("claim_reward", |state, staged| {
            state.ensure_caller(&caller)?;
            let reward = state.check_settle(&caller, now)?;
            state.settle(caller, reward, now, staged)?;
            Ok(reward)
        })
    }

    /// Open a governance proposal. Returns its id.
    pub fn create_proposal(
        &mut self,
        caller: Address,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Result<u64, TokenError> {
        let mut staged = Vec::new();
        let result = self
            .state
            .create_proposal(caller, description.into(), now, &mut staged);
        self.commit("create_proposal", result, staged)
    }

    /// Vote on a proposal with the caller's current balance as weight.
    ///
    /// Returns the weight. Only a supporting vote adds it to the tally.
    pub fn vote(
        &mut self,
        caller: Address,
        proposal_id: u64,
        support: bool,
        now: Timestamp,
    ) -> Result<Amount, TokenError> {
        let mut staged = Vec::new();
        let result = self
            .state
            .vote(caller, proposal_id, support, now, &mut staged);
        self.commit("vote", result, staged)
    }

    fn guarded<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut TokenState, &mut Vec<LedgerEvent>) -> Result<T, TokenError>,
    ) -> Result<T, TokenError> {
        if let Err(e) = self.guard.enter() {
            return self.commit(op, Err(e), Vec::new());
        }
        let mut staged = Vec::new();
        let result = f(&mut self.state, &mut staged);
        self.guard.exit();
        self.commit(op, result, staged)
    }

    fn commit<T>(
        &mut self,
        op: &'static str,
        result: Result<T, TokenError>,
        staged: Vec<LedgerEvent>,
    ) -> Result<T, TokenError> {
        match result {
            Ok(value) => {
                for event in &staged {
                    self.bus.emit(event);
                }
                tracing::debug!(op, events = staged.len(), "operation committed");
                self.journal.extend(staged);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(op, error = %e, "operation rejected");
                Err(e)
            }
        }
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Register a listener for events of every later successful operation.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Every event published since construction (or restore), in order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.journal
    }

    /// Drain the journal, leaving it empty.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.journal)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn symbol(&self) -> &str {
        &self.state.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn params(&self) -> &LedgerParams {
        &self.state.params
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.state.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.state.ledger.total_supply()
    }

    pub fn max_supply(&self) -> Amount {
        self.state.ledger.max_supply()
    }

    pub fn owner(&self) -> Address {
        self.state.router.owner()
    }

    pub fn treasury(&self) -> Address {
        self.state.router.treasury()
    }

    pub fn burn_sink(&self) -> Address {
        self.state.router.burn_sink()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.allowances.allowance(owner, spender)
    }

    pub fn stake_of(&self, account: &Address) -> StakeRecord {
        self.state.staking.stake_of(account)
    }

    pub fn total_staked(&self) -> Amount {
        self.state.staking.total_staked()
    }

    /// Balance of the system account: staked principal, net of deposit tax,
    /// plus the community pool allocation.
    pub fn staking_pool_balance(&self) -> Amount {
        self.state.ledger.balance_of(&Address::SYSTEM)
    }

    /// Reward `account` would receive if settled at `now`.
    pub fn pending_reward(&self, account: &Address, now: Timestamp) -> Result<Amount, TokenError> {
        Ok(self.state.staking.pending_reward(account, now)?)
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.state.governance.proposal(id)
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.governance.proposal_count()
    }

    pub fn has_voted(&self, proposal_id: u64, voter: &Address) -> bool {
        self.state.governance.has_voted(proposal_id, voter)
    }

    /// Always `None`: no operation creates vesting schedules.
    pub fn vesting_schedule(&self, beneficiary: &Address) -> Option<&VestingSchedule> {
        self.state.vesting.get(beneficiary)
    }

    pub fn community_pool(&self) -> CommunityRewardPool {
        self.state.community_pool
    }

    /// Whether the sum of every balance equals total supply.
    pub fn check_conservation(&self) -> bool {
        self.state.ledger.sum_of_balances() == Some(self.state.ledger.total_supply())
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            name: self.state.name.clone(),
            symbol: self.state.symbol.clone(),
            total_supply: self.total_supply(),
            max_supply: self.max_supply(),
            total_staked: self.total_staked(),
            staking_pool_balance: self.staking_pool_balance(),
            proposal_count: self.proposal_count(),
            conserved: self.check_conservation(),
            balances: self
                .state
                .ledger
                .accounts()
                .filter(|(_, b)| !b.is_zero())
                .map(|(a, b)| (*a, *b))
                .collect(),
        }
    }

    // ── Snapshots ──────────────────────────────────────────────────────

    /// Serialize the full persisted state with bincode.
    pub fn snapshot(&self) -> Result<Vec<u8>, TokenError> {
        Ok(bincode::serialize(&self.state)?)
    }

    /// Rebuild a token from [`Token::snapshot`] bytes.
    ///
    /// Subscribers and the event journal are not part of the snapshot.
    pub fn restore(bytes: &[u8]) -> Result<Self, TokenError> {
        let state: TokenState = bincode::deserialize(bytes)?;
        tracing::info!(
            name = %state.name,
            supply = %state.ledger.total_supply(),
            "token restored"
        );
        Ok(Self::from_parts(state, Vec::new()))
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.state.name)
            .field("total_supply", &self.state.ledger.total_supply())
            .field("guard", &self.guard)
            .field("journal_len", &self.journal.len())
            .finish()
    }
}

impl TokenState {
    /// Reject the sentinel and the system account as acting parties.
    fn ensure_caller(&self, caller: &Address) -> Result<(), TokenError> {
        if caller.is_zero() || *caller == Address::SYSTEM {
            return Err(TokenError::InvalidAccount(*caller));
        }
        Ok(())
    }

    /// Governance callers additionally exclude the burn sink: burned value
    /// carries no voting power.
    fn ensure_governor(&self, caller: &Address) -> Result<(), TokenError> {
        self.ensure_caller(caller)?;
        if *caller == Address::BURN_SINK {
            return Err(TokenError::InvalidAccount(*caller));
        }
        Ok(())
    }

    fn ensure_recipient(&self, to: &Address) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidAccount(*to));
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<Option<TaxSplit>, TokenError> {
        self.ensure_caller(&caller)?;
        self.ensure_recipient(&to)?;
        Ok(self
            .router
            .route(&mut self.ledger, caller, to, amount, staged)?)
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<(), TokenError> {
        self.ensure_caller(&owner)?;
        self.ensure_recipient(&spender)?;
        self.allowances.approve(owner, spender, amount, staged);
        tracing::debug!(%owner, %spender, %amount, "allowance set");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<Option<TaxSplit>, TokenError> {
        self.ensure_caller(&spender)?;
        self.ensure_caller(&from)?;
        self.ensure_recipient(&to)?;
        self.allowances.ensure(&from, &spender, amount)?;
        self.ledger.ensure_spendable(&from, amount)?;

        let split = self
            .router
            .route(&mut self.ledger, from, to, amount, staged)?;
        self.allowances.spend(from, spender, amount)?;
        Ok(split)
    }

    /// The reward a settlement at `now` would mint, after the cap check
    /// the configured policy asks for.
    fn check_settle(&self, account: &Address, now: Timestamp) -> Result<Amount, TokenError> {
        let reward = self.staking.pending_reward(account, now)?;
        if !reward.is_zero() && self.params.reward_cap_policy == SupplyCapPolicy::Enforce {
            self.ledger.ensure_mintable(reward)?;
        }
        Ok(reward)
    }

    /// Mint a reward computed by [`TokenState::check_settle`] and restart the
    /// accrual window. A zero reward changes nothing.
    fn settle(
        &mut self,
        account: Address,
        reward: Amount,
        now: Timestamp,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<(), TokenError> {
        if reward.is_zero() {
            return Ok(());
        }
        match self.params.reward_cap_policy {
            SupplyCapPolicy::Enforce => self.ledger.mint(account, reward, staged)?,
            SupplyCapPolicy::Unchecked => self.ledger.mint_uncapped(account, reward, staged)?,
        }
        self.staking.mark_settled(&account, now);
        staged.push(LedgerEvent::RewardClaimed { account, reward });
        tracing::debug!(%account, %reward, "reward settled");
        Ok(())
    }

    fn stake(
        &mut self,
        caller: Address,
        amount: Amount,
        now: Timestamp,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<(), TokenError> {
        self.ensure_caller(&caller)?;
        self.staking.check_stake(&caller, amount)?;
        let reward = self.check_settle(&caller, now)?;

        // The reward lands before the deposit moves, so it can fund it.
        let available = self
            .ledger
            .spendable(&caller)
            .checked_add(reward)
            .ok_or(TokenError::Overflow)?;
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: caller,
                needed: amount,
                available,
            });
        }
        self.router.preview(&caller, &Address::SYSTEM, amount)?;

        self.settle(caller, reward, now, staged)?;
        self.router
            .route(&mut self.ledger, caller, Address::SYSTEM, amount, staged)?;
        let record = self.staking.record_stake(caller, amount, now)?;
        staged.push(LedgerEvent::Staked {
            account: caller,
            amount,
        });
        tracing::debug!(account = %caller, %amount, staked = %record.amount, "staked");
        Ok(())
    }

    fn unstake(
        &mut self,
        caller: Address,
        amount: Amount,
        now: Timestamp,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<(), TokenError> {
        self.ensure_caller(&caller)?;
        self.staking.check_unstake(&caller, amount)?;
        // A reward too large to represent is forfeited so the principal
        // can still be withdrawn.
        let (reward, forfeited) = match self.check_settle(&caller, now) {
            Err(TokenError::Overflow) => (Amount::ZERO, true),
            other => (other?, false),
        };
        self.ledger.ensure_spendable(&Address::SYSTEM, amount)?;

        if forfeited {
            tracing::warn!(account = %caller, "unrepresentable reward forfeited on unstake");
            self.staking.mark_settled(&caller, now);
        }
        self.settle(caller, reward, now, staged)?;
        let record = self.staking.record_unstake(caller, amount)?;
        self.ledger
            .move_value(Address::SYSTEM, caller, amount, staged)?;
        staged.push(LedgerEvent::Unstaked {
            account: caller,
            amount,
        });
        tracing::debug!(account = %caller, %amount, staked = %record.amount, "unstaked");
        Ok(())
    }

    fn create_proposal(
        &mut self,
        caller: Address,
        description: String,
        now: Timestamp,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<u64, TokenError> {
        self.ensure_governor(&caller)?;
        let balance = self.ledger.balance_of(&caller);
        let proposal = self
            .governance
            .create_proposal(caller, description, balance, now)?;
        staged.push(LedgerEvent::ProposalCreated {
            id: proposal.id,
            proposer: caller,
            deadline: proposal.deadline,
        });
        Ok(proposal.id)
    }

    fn vote(
        &mut self,
        caller: Address,
        proposal_id: u64,
        support: bool,
        now: Timestamp,
        staged: &mut Vec<LedgerEvent>,
    ) -> Result<Amount, TokenError> {
        self.ensure_governor(&caller)?;
        let balance = self.ledger.balance_of(&caller);
        let weight = self
            .governance
            .vote(proposal_id, caller, support, balance, now)?;
        staged.push(LedgerEvent::Voted {
            proposal_id,
            voter: caller,
            support,
            weight,
        });
        Ok(weight)
    }
}
