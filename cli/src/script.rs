//! Operation scripts: a TOML list of `[[op]]` tables replayed against a token.
//!
//! ```toml
//! [[op]]
//! kind = "transfer"
//! from = "owner"
//! to = "alice"
//! amount = "50"
//!
//! [[op]]
//! kind = "advance"
//! secs = 86400
//! ```
//!
//! Accounts are `0x` hex addresses, the keywords `owner`/`treasury`/`burn`,
//! or any other label, which is hashed into an address.

use anyhow::Context;
use levy_token::{Address, Amount, LedgerEvent, Timestamp, Token, TokenSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "op")]
    pub ops: Vec<ScriptOp>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptOp {
    Transfer {
        from: String,
        to: String,
        amount: Amount,
    },
    TransferFrom {
        spender: String,
        from: String,
        to: String,
        amount: Amount,
    },
    Approve {
        owner: String,
        spender: String,
        amount: Amount,
    },
    Stake {
        account: String,
        amount: Amount,
    },
    Unstake {
        account: String,
        amount: Amount,
    },
    Claim {
        account: String,
    },
    Propose {
        account: String,
        description: String,
    },
    Vote {
        account: String,
        proposal: u64,
        support: bool,
    },
    Advance {
        secs: u64,
    },
}

impl ScriptOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Approve { .. } => "approve",
            Self::Stake { .. } => "stake",
            Self::Unstake { .. } => "unstake",
            Self::Claim { .. } => "claim",
            Self::Propose { .. } => "propose",
            Self::Vote { .. } => "vote",
            Self::Advance { .. } => "advance",
        }
    }
}

/// Result of one replayed op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpOutcome {
    pub index: usize,
    pub kind: &'static str,
    pub at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What `levy run` prints.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<OpOutcome>,
    pub events: Vec<LedgerEvent>,
    pub summary: TokenSummary,
    pub finished_at: Timestamp,
}

pub fn parse_script(text: &str) -> anyhow::Result<Script> {
    toml::from_str(text).context("invalid operation script")
}

/// Map a script account name to an address.
pub fn resolve_account(token: &Token, name: &str) -> anyhow::Result<Address> {
    match name {
        "owner" => Ok(token.owner()),
        "treasury" => Ok(token.treasury()),
        "burn" => Ok(token.burn_sink()),
        hex if hex.starts_with(Address::PREFIX) => hex
            .parse()
            .with_context(|| format!("bad address {hex:?}")),
        label => Ok(Address::derive(label)),
    }
}

/// Replay `script` starting at `start`, advancing time only on `advance`
/// ops. Failed ops are recorded and the replay continues.
pub fn replay(token: &mut Token, script: &Script, start: Timestamp) -> (Vec<OpOutcome>, Timestamp) {
    let mut now = start;
    let mut outcomes = Vec::with_capacity(script.ops.len());

    for (index, op) in script.ops.iter().enumerate() {
        let outcome = apply(token, op, &mut now);
        let (result, error) = match outcome {
            Ok(result) => {
                tracing::info!(index, op = op.kind(), %now, result = result.as_deref().unwrap_or("ok"), "op applied");
                (result, None)
            }
            Err(e) => {
                tracing::warn!(index, op = op.kind(), %now, error = %e, "op failed");
                (None, Some(format!("{e:#}")))
            }
        };
        outcomes.push(OpOutcome {
            index,
            kind: op.kind(),
            at: now,
            result,
            error,
        });
    }
    (outcomes, now)
}

fn apply(token: &mut Token, op: &ScriptOp, now: &mut Timestamp) -> anyhow::Result<Option<String>> {
    let at = *now;
    let result = match op {
        ScriptOp::Transfer { from, to, amount } => {
            let from = resolve_account(token, from)?;
            let to = resolve_account(token, to)?;
            token
                .transfer(from, to, *amount)?
                .map(|split| format!("net {} tax {}", split.net_amount, split.tax))
        }
        ScriptOp::TransferFrom {
            spender,
            from,
            to,
            amount,
        } => {
            let spender = resolve_account(token, spender)?;
            let from = resolve_account(token, from)?;
            let to = resolve_account(token, to)?;
            token
                .transfer_from(spender, from, to, *amount)?
                .map(|split| format!("net {} tax {}", split.net_amount, split.tax))
        }
        ScriptOp::Approve {
            owner,
            spender,
            amount,
        } => {
            let owner = resolve_account(token, owner)?;
            let spender = resolve_account(token, spender)?;
            token.approve(owner, spender, *amount)?;
            None
        }
        ScriptOp::Stake { account, amount } => {
            let account = resolve_account(token, account)?;
            token.stake(account, *amount, at)?;
            None
        }
        ScriptOp::Unstake { account, amount } => {
            let account = resolve_account(token, account)?;
            token.unstake(account, *amount, at)?;
            None
        }
        ScriptOp::Claim { account } => {
            let account = resolve_account(token, account)?;
            Some(format!("reward {}", token.claim_reward(account, at)?))
        }
        ScriptOp::Propose {
            account,
            description,
        } => {
            let account = resolve_account(token, account)?;
            let id = token.create_proposal(account, description.as_str(), at)?;
            let remaining = token
                .proposal(id)
                .map(|p| levy_utils::format_remaining(p.deadline, at))
                .unwrap_or_default();
            Some(format!("proposal {id}, voting closes in {remaining}"))
        }
        ScriptOp::Vote {
            account,
            proposal,
            support,
        } => {
            let account = resolve_account(token, account)?;
            Some(format!("weight {}", token.vote(account, *proposal, *support, at)?))
        }
        ScriptOp::Advance { secs } => {
            *now = at.plus_secs(*secs);
            Some(levy_utils::format_duration(*secs))
        }
    };
    Ok(result)
}
