use crate::error::DeciderError;
use core_types::TradeProposal;
use tracing::warn;

/// Parses a batch of trade proposals from an external provider's JSON.
///
/// The expected shape is a single structured form: a JSON array of proposal
/// objects with the required fields (`coin`, `signal`, `quantity`,
/// `leverage`, `entry_price`). An entry that fails to deserialize is dropped
/// with a warning so the rest of the batch still gets evaluated — one bad
/// symbol must not take down the others. Only a payload that is not a JSON
/// array at all is an error.
pub fn parse_proposals(payload: &str) -> Result<Vec<TradeProposal>, DeciderError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(payload)?;

    let mut proposals = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<TradeProposal>(entry) {
            Ok(proposal) => proposals.push(proposal),
            Err(error) => warn!(%error, "dropping malformed trade proposal"),
        }
    }
    Ok(proposals)
}
