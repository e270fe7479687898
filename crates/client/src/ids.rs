//! Shared `{aid}.{iid}` characteristic addressing used by both client
//! facades' `get_characteristics`/`set_characteristics` (spec §4.7).

use hap_core::{Aid, HapValue, Iid};
use serde::{Deserialize, Serialize};

/// One `aid.iid` pair, as it appears in the HTTP `?id=` query parameter
/// and in every JSON characteristics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicId {
    pub aid: Aid,
    pub iid: Iid,
}

impl CharacteristicId {
    pub fn new(aid: u64, iid: u64) -> Self {
        Self { aid: Aid(aid), iid: Iid(iid) }
    }
}

/// Which optional fields to request alongside `value` on a
/// `get_characteristics` call (spec §4.7: `meta=1&perms=1&type=1&ev=1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GetCharacteristicsOptions {
    pub meta: bool,
    pub perms: bool,
    pub type_: bool,
    pub ev: bool,
}

/// Builds the `id=1.10,1.11&meta=1&...` query string for `GET /characteristics`.
pub fn build_query(ids: &[CharacteristicId], options: GetCharacteristicsOptions) -> String {
    let id_list = ids
        .iter()
        .map(|id| format!("{}.{}", id.aid, id.iid))
        .collect::<Vec<_>>()
        .join(",");

    let mut query = format!("id={id_list}");
    if options.meta {
        query.push_str("&meta=1");
    }
    if options.perms {
        query.push_str("&perms=1");
    }
    if options.type_ {
        query.push_str("&type=1");
    }
    if options.ev {
        query.push_str("&ev=1");
    }
    query
}

/// One entry of a `get_characteristics` response body: the always-present
/// `aid`/`iid`, an error `status` on a per-characteristic failure within a
/// `207` response, and whichever optional fields the request asked for.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacteristicReadResult {
    pub aid: u64,
    pub iid: u64,
    #[serde(default)]
    pub value: Option<HapValue>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub perms: Option<Vec<String>>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "minValue", default)]
    pub min_value: Option<HapValue>,
    #[serde(rename = "maxValue", default)]
    pub max_value: Option<HapValue>,
    #[serde(rename = "minStep", default)]
    pub min_step: Option<HapValue>,
    #[serde(default)]
    pub ev: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CharacteristicsGetBody {
    pub characteristics: Vec<CharacteristicReadResult>,
}

/// One `aid`/`iid`/value to write in a `set_characteristics` request.
#[derive(Debug, Clone)]
pub struct CharacteristicWrite {
    pub id: CharacteristicId,
    pub value: HapValue,
}

#[derive(Serialize)]
pub(crate) struct SetCharacteristicsBody {
    pub characteristics: Vec<SetCharacteristicEntry>,
}

#[derive(Serialize)]
pub(crate) struct SetCharacteristicEntry {
    pub aid: u64,
    pub iid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<HapValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev: Option<bool>,
}

/// Outcome of one `aid`/`iid` within a `set_characteristics` call. `status`
/// is `0` on success; otherwise a HAP error status from a `207` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCharacteristicResult {
    pub id: CharacteristicId,
    pub status: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetCharacteristicsResponseBody {
    pub characteristics: Vec<SetCharacteristicStatusEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetCharacteristicStatusEntry {
    pub aid: u64,
    pub iid: u64,
    #[serde(default)]
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_query_with_all_options() {
        let ids = vec![CharacteristicId::new(1, 10), CharacteristicId::new(1, 11)];
        let query = build_query(
            &ids,
            GetCharacteristicsOptions { meta: true, perms: true, type_: true, ev: true },
        );
        assert_eq!(query, "id=1.10,1.11&meta=1&perms=1&type=1&ev=1");
    }

    #[test]
    fn builds_query_with_no_options() {
        let ids = vec![CharacteristicId::new(1, 10)];
        let query = build_query(&ids, GetCharacteristicsOptions::default());
        assert_eq!(query, "id=1.10");
    }
}
