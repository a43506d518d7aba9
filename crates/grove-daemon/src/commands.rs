// crates/grove-daemon/src/commands.rs
//
// Line-delimited JSON command protocol.
//
// Request:   {"op": "reward", "caller": "owner", "recipient": "alice", ...}
// Response:  {"ok": true, "result": {...}}
//            {"ok": false, "error": {"kind": "cap_exceeded", "message": "..."}}
//
// Principals are given as 64-char hex strings or as handles, which are
// hashed into principals (see `Principal::resolve`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use grove_core::error::GroveError;
use grove_core::event::ReasonCode;
use grove_core::identity::Principal;
use grove_core::traits::SnapshotStore;
use grove_ledger::{RewardEntry, SharedLedger};

use crate::persist;

/// One batch line as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRewardEntry {
    pub recipient: String,
    pub amount: u64,
    pub reason: ReasonCode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    // Authorization
    AddAuthorized {
        caller: String,
        principal: String,
    },
    RemoveAuthorized {
        caller: String,
        principal: String,
    },
    BatchAddAuthorized {
        caller: String,
        principals: Vec<String>,
    },
    BatchRemoveAuthorized {
        caller: String,
        principals: Vec<String>,
    },
    IsAuthorized { principal: String },
    AuthorizedPrincipals,

    // Reward ledger
    Reward {
        caller: String,
        recipient: String,
        amount: u64,
        reason: ReasonCode,
    },
    BatchReward {
        caller: String,
        entries: Vec<WireRewardEntry>,
    },
    Redeem {
        caller: String,
        amount: u64,
        reason: ReasonCode,
    },
    BalanceOf { account: String },
    Account { account: String },
    Supply,

    // Platform
    RewardUser {
        caller: String,
        recipient: String,
        fiat_amount_cents: u64,
    },
    ApprovePlatform { caller: String, amount: u64 },
    PlatformAllowance { account: String },
    RedeemCredits { caller: String, amount: u64 },
    GetExchangeRate { account: String },
    TotalRedeemed { account: String },
    Rate { cumulative_redeemed: i64 },
    RateTable,

    // Adoption
    Mint {
        caller: String,
        recipient: String,
        tree_id: u64,
        metadata_uri: String,
    },
    IsTreeAdopted { tree_id: u64 },
    GetTreeId { token_id: u64 },
    TokenUri { token_id: u64 },
    OwnerOf { token_id: u64 },
    ClaimsOf { owner: String },

    // Audit
    EventsSince { seq: u64 },
}

impl Command {
    /// Whether a successful run of this command changes ledger state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::AddAuthorized { .. }
                | Command::RemoveAuthorized { .. }
                | Command::BatchAddAuthorized { .. }
                | Command::BatchRemoveAuthorized { .. }
                | Command::Reward { .. }
                | Command::BatchReward { .. }
                | Command::Redeem { .. }
                | Command::RewardUser { .. }
                | Command::ApprovePlatform { .. }
                | Command::RedeemCredits { .. }
                | Command::Mint { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl From<Result<Value, GroveError>> for Response {
    fn from(result: Result<Value, GroveError>) -> Self {
        match result {
            Ok(value) => Response {
                ok: true,
                result: Some(value),
                error: None,
            },
            Err(e) => Response {
                ok: false,
                result: None,
                error: Some(ErrorBody {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

/// Parse one request line.
pub fn parse_line(line: &str) -> Result<Command, GroveError> {
    serde_json::from_str(line)
        .map_err(|e| GroveError::InvalidInput(format!("Malformed command: {}", e)))
}

fn principals(list: &[String]) -> Vec<Principal> {
    list.iter().map(|p| Principal::resolve(p)).collect()
}

/// Execute a command against the shared ledger. `archive` serves audit
/// history that has already been flushed out of memory.
pub async fn dispatch(
    ledger: &SharedLedger,
    archive: Option<&dyn SnapshotStore>,
    command: Command,
) -> Result<Value, GroveError> {
    match command {
        Command::AddAuthorized { caller, principal } => {
            let (caller, principal) = (Principal::resolve(&caller), Principal::resolve(&principal));
            ledger.write(|l| l.add_authorized(&caller, principal)).await?;
            Ok(json!({ "principal": principal }))
        }
        Command::RemoveAuthorized { caller, principal } => {
            let (caller, principal) = (Principal::resolve(&caller), Principal::resolve(&principal));
            ledger.write(|l| l.remove_authorized(&caller, principal)).await?;
            Ok(json!({ "principal": principal }))
        }
        Command::BatchAddAuthorized {
            caller,
            principals: list,
        } => {
            let caller = Principal::resolve(&caller);
            let list = principals(&list);
            ledger.write(|l| l.batch_add_authorized(&caller, &list)).await?;
            Ok(json!({ "principals": list }))
        }
        Command::BatchRemoveAuthorized {
            caller,
            principals: list,
        } => {
            let caller = Principal::resolve(&caller);
            let list = principals(&list);
            ledger.write(|l| l.batch_remove_authorized(&caller, &list)).await?;
            Ok(json!({ "principals": list }))
        }
        Command::IsAuthorized { principal } => {
            let principal = Principal::resolve(&principal);
            let authorized = ledger.read(|l| l.is_authorized(&principal)).await;
            Ok(json!({ "authorized": authorized }))
        }
        Command::AuthorizedPrincipals => {
            let list = ledger.read(|l| l.authorized_principals()).await;
            Ok(json!({ "principals": list }))
        }

        Command::Reward {
            caller,
            recipient,
            amount,
            reason,
        } => {
            let recipient = Principal::resolve(&recipient);
            let balance = ledger
                .reward(Principal::resolve(&caller), recipient, amount, reason)
                .await?;
            Ok(json!({ "recipient": recipient, "balance": balance }))
        }
        Command::BatchReward { caller, entries } => {
            let caller = Principal::resolve(&caller);
            let entries: Vec<RewardEntry> = entries
                .into_iter()
                .map(|e| RewardEntry {
                    recipient: Principal::resolve(&e.recipient),
                    amount: e.amount,
                    reason: e.reason,
                })
                .collect();
            let total = ledger.write(|l| l.batch_reward(&caller, &entries)).await?;
            Ok(json!({ "entries": entries.len(), "total": total }))
        }
        Command::Redeem {
            caller,
            amount,
            reason,
        } => {
            let balance = ledger.redeem(Principal::resolve(&caller), amount, reason).await?;
            Ok(json!({ "balance": balance }))
        }
        Command::BalanceOf { account } => {
            let balance = ledger.balance_of(Principal::resolve(&account)).await;
            Ok(json!({ "balance": balance }))
        }
        Command::Account { account } => {
            let account = Principal::resolve(&account);
            let record = ledger.read(|l| l.account(&account)).await;
            Ok(serde_json::to_value(record)?)
        }
        Command::Supply => {
            let supply = ledger
                .read(|l| {
                    json!({
                        "total_supply": l.total_supply(),
                        "max_supply": l.max_supply(),
                        "remaining_supply": l.remaining_supply(),
                        "pool_balance": l.pool_balance(),
                    })
                })
                .await;
            Ok(supply)
        }

        Command::RewardUser {
            caller,
            recipient,
            fiat_amount_cents,
        } => {
            let (caller, recipient) = (Principal::resolve(&caller), Principal::resolve(&recipient));
            let credited = ledger
                .write(|l| l.reward_user(&caller, recipient, fiat_amount_cents))
                .await?;
            Ok(json!({ "recipient": recipient, "credited": credited }))
        }
        Command::ApprovePlatform { caller, amount } => {
            let caller = Principal::resolve(&caller);
            ledger.write(|l| l.approve_platform(&caller, amount)).await?;
            Ok(json!({ "allowance": amount }))
        }
        Command::PlatformAllowance { account } => {
            let account = Principal::resolve(&account);
            let allowance = ledger.read(|l| l.platform_allowance(&account)).await;
            Ok(json!({ "allowance": allowance }))
        }
        Command::RedeemCredits { caller, amount } => {
            let receipt = ledger.redeem_credits(Principal::resolve(&caller), amount).await?;
            Ok(serde_json::to_value(receipt)?)
        }
        Command::GetExchangeRate { account } => {
            let account = Principal::resolve(&account);
            let multiplier = ledger.read(|l| l.exchange_rate(&account)).await;
            Ok(json!({ "multiplier": multiplier }))
        }
        Command::TotalRedeemed { account } => {
            let account = Principal::resolve(&account);
            let total = ledger.read(|l| l.total_redeemed(&account)).await;
            Ok(json!({ "total_redeemed": total }))
        }
        Command::Rate {
            cumulative_redeemed,
        } => {
            let multiplier = ledger.read(|l| l.rate(cumulative_redeemed)).await?;
            Ok(json!({ "multiplier": multiplier }))
        }
        Command::RateTable => {
            let bands = ledger.read(|l| l.rate_table().bands()).await;
            Ok(json!({ "bands": bands }))
        }

        Command::Mint {
            caller,
            recipient,
            tree_id,
            metadata_uri,
        } => {
            let (caller, recipient) = (Principal::resolve(&caller), Principal::resolve(&recipient));
            let token_id = ledger
                .write(|l| l.mint(&caller, recipient, tree_id, metadata_uri))
                .await?;
            Ok(json!({ "token_id": token_id, "tree_id": tree_id }))
        }
        Command::IsTreeAdopted { tree_id } => {
            let adopted = ledger.read(|l| l.is_tree_adopted(tree_id)).await;
            Ok(json!({ "adopted": adopted }))
        }
        Command::GetTreeId { token_id } => {
            let tree_id = ledger.read(|l| l.tree_id(token_id)).await?;
            Ok(json!({ "tree_id": tree_id }))
        }
        Command::TokenUri { token_id } => {
            let uri = ledger
                .read(|l| l.token_uri(token_id).map(str::to_string))
                .await?;
            Ok(json!({ "metadata_uri": uri }))
        }
        Command::OwnerOf { token_id } => {
            let owner = ledger.read(|l| l.owner_of(token_id)).await?;
            Ok(json!({ "owner": owner }))
        }
        Command::ClaimsOf { owner } => {
            let owner = Principal::resolve(&owner);
            let tokens = ledger.read(|l| l.claims_of(&owner)).await;
            Ok(json!({ "token_ids": tokens }))
        }

        Command::EventsSince { seq } => {
            let events = persist::events_since(ledger, archive, seq).await?;
            Ok(serde_json::to_value(events)?)
        }
    }
}
